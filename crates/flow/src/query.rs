/// Build the query that selects every ticket of one project.
///
/// Generates: `project = "INT" ORDER BY priority DESC`
pub fn project_query(project_id: &str) -> String {
    format!("project = {} ORDER BY priority DESC", quote_value(project_id))
}

/// Quote a query value, escaping backslashes and double quotes.
fn quote_value(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_project_id() {
        assert_eq!(project_query("INT"), "project = \"INT\" ORDER BY priority DESC");
    }

    #[test]
    fn hyphenated_project_id() {
        assert_eq!(
            project_query("MY-PROJ"),
            "project = \"MY-PROJ\" ORDER BY priority DESC"
        );
    }

    #[test]
    fn quotes_and_backslashes_are_escaped() {
        assert_eq!(quote_value(r#"a"b"#), r#""a\"b""#);
        assert_eq!(quote_value(r"a\b"), r#""a\\b""#);
    }
}
