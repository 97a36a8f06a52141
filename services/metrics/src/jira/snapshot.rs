//! Ticket source that replays recorded tracker responses from a JSON file.
//!
//! ```json
//! {
//!   "baseUrl": "https://tracker.example.com",
//!   "projects": [{ "id": "10000", "key": "INT", "name": "Integrations" }],
//!   "searches": [{ "jql": "project = \"INT\" ORDER BY priority DESC", "response": { "issues": [] } }]
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use flowmetrics_common::error::SourceError;
use flowmetrics_common::types::FetchLimit;
use flowmetrics_flow::source::{ProjectMetadata, RawTicket, TicketSource};

use super::models::{JiraProject, JiraSearchResponse};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub base_url: String,
    #[serde(default)]
    pub projects: Vec<JiraProject>,
    #[serde(default)]
    pub searches: Vec<RecordedSearch>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedSearch {
    pub jql: String,
    pub response: JiraSearchResponse,
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid snapshot: {0}")]
    Json(#[from] serde_json::Error),

    #[error("project {0} is not in the snapshot")]
    UnknownProject(String),
}

#[derive(Debug, Clone)]
pub struct SnapshotSource {
    snapshot: Snapshot,
}

impl SnapshotSource {
    pub fn new(snapshot: Snapshot) -> Self {
        Self { snapshot }
    }

    pub fn from_path(path: &Path) -> Result<Self, SnapshotError> {
        let raw = fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let source = Self::from_json(&raw)?;
        tracing::info!(
            path = %path.display(),
            projects = source.snapshot.projects.len(),
            searches = source.snapshot.searches.len(),
            "snapshot loaded"
        );
        Ok(source)
    }

    pub fn from_json(raw: &str) -> Result<Self, SnapshotError> {
        Ok(Self::new(serde_json::from_str(raw)?))
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }
}

impl TicketSource for SnapshotSource {
    /// Match `project_id` against either the numeric id or the key.
    fn fetch_project(&self, project_id: &str) -> Result<ProjectMetadata, SourceError> {
        self.snapshot
            .projects
            .iter()
            .find(|p| p.id == project_id || p.key.eq_ignore_ascii_case(project_id))
            .map(ProjectMetadata::from)
            .ok_or_else(|| SnapshotError::UnknownProject(project_id.to_string()).into())
    }

    fn search(
        &self,
        query: &str,
        limit: FetchLimit,
        include_history: bool,
    ) -> Result<Vec<RawTicket>, SourceError> {
        let Some(recorded) = self.snapshot.searches.iter().find(|s| s.jql == query) else {
            tracing::warn!(query, "no recorded response for query, returning no issues");
            return Ok(Vec::new());
        };

        let issues = limit.apply(recorded.response.issues.clone());
        let tickets = issues
            .into_iter()
            .map(|issue| {
                let mut raw = issue.into_raw_ticket(&self.snapshot.base_url);
                if !include_history {
                    raw.history = None;
                }
                raw
            })
            .collect();
        Ok(tickets)
    }
}
