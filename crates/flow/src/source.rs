use serde::{Deserialize, Serialize};

use flowmetrics_common::error::SourceError;
use flowmetrics_common::types::FetchLimit;

/// Project metadata as reported by the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    pub key: String,
    pub name: String,
}

/// One field change in a ticket's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub timestamp: String,
    pub field_name: String,
    pub to_value: Option<String>,
}

impl ChangeEvent {
    pub fn is_status_change(&self) -> bool {
        self.field_name.eq_ignore_ascii_case("status")
    }
}

/// A ticket snapshot exactly as the source hands it over.
///
/// Timestamps stay as text; validation happens when a
/// [`TicketRecord`](crate::ticket::TicketRecord) is built from it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTicket {
    pub id: String,
    pub key: String,
    pub permalink: String,
    pub issue_type: Option<String>,
    pub summary: String,
    #[serde(default)]
    pub labels: Vec<String>,
    pub created: Option<String>,
    pub updated: Option<String>,
    pub resolution: Option<String>,
    pub resolution_date: Option<String>,
    pub assignee: Option<String>,
    pub description: Option<String>,
    /// Text form of the priority, often `"<name>: <description>"`.
    pub priority: Option<String>,
    pub status: String,
    #[serde(default)]
    pub fix_versions: Vec<String>,
    /// `None` when the source did not return a changelog.
    pub history: Option<Vec<ChangeEvent>>,
}

/// Where tickets come from.
///
/// Calls are blocking. Implementations own transport, authentication,
/// paging and retry policy; their failures are passed through untouched.
pub trait TicketSource {
    fn fetch_project(&self, project_id: &str) -> Result<ProjectMetadata, SourceError>;

    fn search(
        &self,
        query: &str,
        limit: FetchLimit,
        include_history: bool,
    ) -> Result<Vec<RawTicket>, SourceError>;
}

impl<S: TicketSource + ?Sized> TicketSource for &S {
    fn fetch_project(&self, project_id: &str) -> Result<ProjectMetadata, SourceError> {
        (**self).fetch_project(project_id)
    }

    fn search(
        &self,
        query: &str,
        limit: FetchLimit,
        include_history: bool,
    ) -> Result<Vec<RawTicket>, SourceError> {
        (**self).search(query, limit, include_history)
    }
}
