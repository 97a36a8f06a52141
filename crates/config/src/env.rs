use std::env;
use std::path::PathBuf;

use flowmetrics_common::error::{MetricsError, MetricsResult};
use flowmetrics_common::types::{FetchLimit, DEFAULT_PROJECT_MAX_RESULTS, DEFAULT_QUERY_LABEL};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub snapshot_path: PathBuf,
    pub project_keys: Vec<String>,
    pub query: Option<String>,
    pub query_label: String,
    pub project_max_results: FetchLimit,
    pub query_max_results: FetchLimit,
    pub log_level: String,
}

impl AppConfig {
    /// Load configuration from environment variables.
    /// Loads `.env` file if present, then reads required vars.
    pub fn from_env() -> MetricsResult<Self> {
        // Best-effort .env load; ignore if missing
        let _ = dotenvy::dotenv();

        Ok(Self {
            snapshot_path: PathBuf::from(get_var("FLOW_SNAPSHOT_PATH")?),
            project_keys: parse_csv_project_keys(&get_var_or("FLOW_PROJECT_KEYS", "")),
            query: env::var("FLOW_JQL")
                .ok()
                .filter(|q| !q.trim().is_empty()),
            query_label: get_var_or("FLOW_JQL_LABEL", DEFAULT_QUERY_LABEL),
            project_max_results: get_limit("FLOW_PROJECT_MAX_RESULTS", DEFAULT_PROJECT_MAX_RESULTS)?,
            query_max_results: get_limit("FLOW_QUERY_MAX_RESULTS", FetchLimit::Unbounded)?,
            log_level: get_var_or("LOG_LEVEL", "info"),
        })
    }
}

/// Split a comma-separated list of project keys, trimming and upper-casing
/// each entry and dropping blanks.
pub fn parse_csv_project_keys(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn get_var(key: &str) -> MetricsResult<String> {
    env::var(key).map_err(|_| MetricsError::Config(format!("{key} is required but not set")))
}

fn get_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn get_limit(key: &str, default: FetchLimit) -> MetricsResult<FetchLimit> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| MetricsError::Config(format!("{key}: {e}"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const ALL_VARS: &[&str] = &[
        "FLOW_SNAPSHOT_PATH",
        "FLOW_PROJECT_KEYS",
        "FLOW_JQL",
        "FLOW_JQL_LABEL",
        "FLOW_PROJECT_MAX_RESULTS",
        "FLOW_QUERY_MAX_RESULTS",
        "LOG_LEVEL",
    ];

    fn clear_env() {
        for key in ALL_VARS {
            env::remove_var(key);
        }
    }

    #[test]
    fn config_from_env_succeeds_with_required_vars() {
        let _guard = ENV_LOCK.lock().expect("env lock poisoned");
        clear_env();

        env::set_var("FLOW_SNAPSHOT_PATH", "/tmp/snapshot.json");

        let cfg = AppConfig::from_env().expect("should parse config");
        assert_eq!(cfg.snapshot_path, PathBuf::from("/tmp/snapshot.json"));
        assert!(cfg.project_keys.is_empty());
        assert!(cfg.query.is_none());
        assert_eq!(cfg.query_label, "JQL");
        assert_eq!(cfg.project_max_results, FetchLimit::Bounded(10));
        assert_eq!(cfg.query_max_results, FetchLimit::Unbounded);
        assert_eq!(cfg.log_level, "info");

        clear_env();
    }

    #[test]
    fn config_from_env_fails_without_snapshot_path() {
        let _guard = ENV_LOCK.lock().expect("env lock poisoned");
        clear_env();

        let err = AppConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("FLOW_SNAPSHOT_PATH"), "got: {err}");
    }

    #[test]
    fn config_reads_query_and_limits() {
        let _guard = ENV_LOCK.lock().expect("env lock poisoned");
        clear_env();

        env::set_var("FLOW_SNAPSHOT_PATH", "snap.json");
        env::set_var("FLOW_PROJECT_KEYS", "int, oso ,");
        env::set_var("FLOW_JQL", "project = OSO ORDER BY Rank ASC");
        env::set_var("FLOW_JQL_LABEL", "oso-rank");
        env::set_var("FLOW_PROJECT_MAX_RESULTS", "unbounded");
        env::set_var("FLOW_QUERY_MAX_RESULTS", "50");

        let cfg = AppConfig::from_env().expect("should parse config");
        assert_eq!(cfg.project_keys, vec!["INT", "OSO"]);
        assert_eq!(cfg.query.as_deref(), Some("project = OSO ORDER BY Rank ASC"));
        assert_eq!(cfg.query_label, "oso-rank");
        assert_eq!(cfg.project_max_results, FetchLimit::Unbounded);
        assert_eq!(cfg.query_max_results, FetchLimit::Bounded(50));

        clear_env();
    }

    #[test]
    fn blank_query_is_treated_as_absent() {
        let _guard = ENV_LOCK.lock().expect("env lock poisoned");
        clear_env();

        env::set_var("FLOW_SNAPSHOT_PATH", "snap.json");
        env::set_var("FLOW_JQL", "   ");

        let cfg = AppConfig::from_env().expect("should parse config");
        assert!(cfg.query.is_none());

        clear_env();
    }

    #[test]
    fn invalid_limit_is_a_config_error() {
        let _guard = ENV_LOCK.lock().expect("env lock poisoned");
        clear_env();

        env::set_var("FLOW_SNAPSHOT_PATH", "snap.json");
        env::set_var("FLOW_QUERY_MAX_RESULTS", "lots");

        let err = AppConfig::from_env().unwrap_err();
        assert!(matches!(err, MetricsError::Config(_)));
        assert!(err.to_string().contains("FLOW_QUERY_MAX_RESULTS"), "got: {err}");

        clear_env();
    }

    #[test]
    fn parse_csv_trims_whitespace_and_uppercases() {
        let keys = parse_csv_project_keys("  alpha , Beta,GAMMA  ");
        assert_eq!(keys, vec!["ALPHA", "BETA", "GAMMA"]);
    }

    #[test]
    fn parse_csv_blank_entries_dropped() {
        assert!(parse_csv_project_keys("  , , ").is_empty());
        assert!(parse_csv_project_keys("").is_empty());
    }
}
