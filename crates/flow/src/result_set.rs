use serde::Serialize;

pub use flowmetrics_common::types::DEFAULT_QUERY_LABEL;

use crate::source::ProjectMetadata;
use crate::ticket::TicketRecord;

/// The tickets one query produced, in the order the source returned them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryResultSet {
    query: String,
    label: String,
    records: Vec<TicketRecord>,
}

impl QueryResultSet {
    pub fn new(query: impl Into<String>, label: impl Into<String>, records: Vec<TicketRecord>) -> Self {
        Self {
            query: query.into(),
            label: label.into(),
            records,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn records(&self) -> &[TicketRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records that carry a resolution date, in source order.
    pub fn resolved_records(&self) -> Vec<&TicketRecord> {
        self.records.iter().filter(|r| r.is_resolved()).collect()
    }
}

/// A [`QueryResultSet`] covering a single project, labelled with its name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectResultSet {
    project_key: String,
    project_name: String,
    #[serde(flatten)]
    results: QueryResultSet,
}

impl ProjectResultSet {
    pub fn new(project: ProjectMetadata, query: impl Into<String>) -> Self {
        let results = QueryResultSet::new(query, project.name.clone(), Vec::new());
        Self {
            project_key: project.key,
            project_name: project.name,
            results,
        }
    }

    /// Records are added one at a time while the project is populated.
    pub(crate) fn push(&mut self, record: TicketRecord) {
        self.results.records.push(record);
    }

    pub fn project_key(&self) -> &str {
        &self.project_key
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn results(&self) -> &QueryResultSet {
        &self.results
    }

    pub fn query(&self) -> &str {
        self.results.query()
    }

    pub fn label(&self) -> &str {
        self.results.label()
    }

    pub fn records(&self) -> &[TicketRecord] {
        self.results.records()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
