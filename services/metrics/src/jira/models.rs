use serde::{Deserialize, Serialize};

use flowmetrics_flow::source::{ChangeEvent, ProjectMetadata, RawTicket};

/// Paginated search response (`/rest/api/2/search?expand=changelog`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraSearchResponse {
    #[serde(default)]
    pub start_at: u32,
    #[serde(default)]
    pub max_results: u32,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub issues: Vec<JiraIssue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraIssue {
    pub id: String,
    pub key: String,
    pub fields: JiraIssueFields,
    /// Present only when the search was expanded with `changelog`.
    #[serde(default)]
    pub changelog: Option<JiraChangelog>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraIssueFields {
    #[serde(default)]
    pub summary: String,
    pub issuetype: Option<JiraNamed>,
    #[serde(default)]
    pub labels: Vec<String>,
    pub created: Option<String>,
    pub updated: Option<String>,
    pub resolution: Option<JiraNamed>,
    #[serde(rename = "resolutiondate")]
    pub resolution_date: Option<String>,
    pub assignee: Option<JiraUserRef>,
    pub description: Option<String>,
    pub priority: Option<JiraNamed>,
    pub status: JiraNamed,
    #[serde(default)]
    pub fix_versions: Vec<JiraNamed>,
}

/// Any `{ "name": ... }` object: status, issue type, priority, version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraNamed {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraUserRef {
    pub account_id: Option<String>,
    pub display_name: Option<String>,
}

impl JiraUserRef {
    pub fn label(&self) -> Option<String> {
        self.display_name.clone().or_else(|| self.account_id.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraChangelog {
    #[serde(default)]
    pub histories: Vec<JiraHistory>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraHistory {
    pub created: String,
    #[serde(default)]
    pub items: Vec<JiraHistoryItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraHistoryItem {
    pub field: String,
    pub from_string: Option<String>,
    pub to_string: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraProject {
    pub id: String,
    pub key: String,
    pub name: String,
}

impl From<&JiraProject> for ProjectMetadata {
    fn from(project: &JiraProject) -> Self {
        Self {
            key: project.key.clone(),
            name: project.name.clone(),
        }
    }
}

impl JiraIssue {
    /// Flatten an API issue into the shape the flow core consumes.
    ///
    /// Every history item is carried over in native order; the core picks
    /// out the status changes itself.
    pub fn into_raw_ticket(self, base_url: &str) -> RawTicket {
        let f = self.fields;
        let history = self.changelog.map(|changelog| {
            changelog
                .histories
                .into_iter()
                .flat_map(|history| {
                    let created = history.created;
                    history.items.into_iter().map(move |item| ChangeEvent {
                        timestamp: created.clone(),
                        field_name: item.field,
                        to_value: item.to_string,
                    })
                })
                .collect()
        });

        RawTicket {
            permalink: format!("{}/browse/{}", base_url.trim_end_matches('/'), self.key),
            id: self.id,
            key: self.key,
            issue_type: f.issuetype.map(|t| t.name),
            summary: f.summary,
            labels: f.labels,
            created: f.created,
            updated: f.updated,
            resolution: f.resolution.map(|r| r.name),
            resolution_date: f.resolution_date,
            assignee: f.assignee.as_ref().and_then(JiraUserRef::label),
            description: f.description,
            priority: f.priority.map(|p| p.name),
            status: f.status.name,
            fix_versions: f.fix_versions.into_iter().map(|v| v.name).collect(),
            history,
        }
    }
}
