use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use flowmetrics_common::error::{MetricsError, MetricsResult};
use flowmetrics_common::types::{FetchLimit, DEFAULT_PROJECT_MAX_RESULTS};

use crate::query::project_query;
use crate::result_set::{ProjectResultSet, QueryResultSet, DEFAULT_QUERY_LABEL};
use crate::source::TicketSource;
use crate::ticket::TicketRecord;

/// Fetch caps for the two population paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreLimits {
    pub project: FetchLimit,
    pub query: FetchLimit,
}

impl Default for StoreLimits {
    fn default() -> Self {
        Self {
            project: DEFAULT_PROJECT_MAX_RESULTS,
            query: FetchLimit::Unbounded,
        }
    }
}

/// Fetches tickets through a [`TicketSource`] and caches the result sets.
///
/// Projects are keyed by the id they were requested with, query results by
/// label. Nothing is evicted; re-populating a key replaces its entry. The
/// store expects a single writer.
pub struct MetricsStore<S> {
    source: S,
    limits: StoreLimits,
    reference_date: Option<NaiveDate>,
    projects: HashMap<String, Arc<ProjectResultSet>>,
    queries: HashMap<String, Arc<QueryResultSet>>,
}

impl<S: TicketSource> MetricsStore<S> {
    pub fn new(source: S) -> Self {
        Self::with_limits(source, StoreLimits::default())
    }

    pub fn with_limits(source: S, limits: StoreLimits) -> Self {
        Self {
            source,
            limits,
            reference_date: None,
            projects: HashMap::new(),
            queries: HashMap::new(),
        }
    }

    /// Close open flow intervals at `date` instead of the current UTC date.
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    /// Fetch each project and its tickets, cache the non-empty ones and
    /// return just those.
    pub fn populate_projects<I, P>(
        &mut self,
        project_ids: I,
    ) -> MetricsResult<HashMap<String, Arc<ProjectResultSet>>>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        let mut fetched = HashMap::new();

        for pid in project_ids {
            let pid = pid.as_ref();

            tracing::info!(project_id = %pid, "requesting project metadata");
            let metadata = self.source.fetch_project(pid).map_err(MetricsError::Source)?;
            tracing::info!(project_id = %pid, key = %metadata.key, "project metadata received");

            let query = project_query(pid);
            let mut project = ProjectResultSet::new(metadata, query.clone());

            tracing::info!(project_id = %pid, limit = %self.limits.project, "requesting project issues");
            let tickets = self
                .source
                .search(&query, self.limits.project, true)
                .map_err(MetricsError::Source)?;
            tracing::info!(project_id = %pid, count = tickets.len(), "project issues received");

            let today = self.today();
            for raw in tickets {
                project.push(TicketRecord::from_raw(raw, today)?);
            }

            if project.is_empty() {
                tracing::debug!(project_id = %pid, "no issues returned, project not cached");
                continue;
            }
            fetched.insert(pid.to_string(), Arc::new(project));
        }

        self.projects
            .extend(fetched.iter().map(|(k, v)| (k.clone(), Arc::clone(v))));
        Ok(fetched)
    }

    /// Run `query` and cache the result under `label` (or
    /// [`DEFAULT_QUERY_LABEL`]), replacing whatever was stored there.
    pub fn populate_from_jql(
        &mut self,
        query: &str,
        label: Option<&str>,
    ) -> MetricsResult<Arc<QueryResultSet>> {
        if query.trim().is_empty() {
            return Err(MetricsError::InvalidQuery(
                "query string is required to get issues".to_string(),
            ));
        }
        let label = label.unwrap_or(DEFAULT_QUERY_LABEL);

        tracing::info!(label, limit = %self.limits.query, "searching issues");
        let tickets = self
            .source
            .search(query, self.limits.query, true)
            .map_err(MetricsError::Source)?;
        tracing::info!(label, count = tickets.len(), "issues received");

        let today = self.today();
        let records = tickets
            .into_iter()
            .map(|raw| TicketRecord::from_raw(raw, today))
            .collect::<MetricsResult<Vec<_>>>()?;

        let result = Arc::new(QueryResultSet::new(query, label, records));
        if self.queries.insert(label.to_string(), Arc::clone(&result)).is_some() {
            tracing::debug!(label, "replaced cached query result");
        }
        Ok(result)
    }

    pub fn get_query_result(&self, label: &str) -> MetricsResult<Arc<QueryResultSet>> {
        self.queries.get(label).cloned().ok_or_else(|| {
            MetricsError::not_found(
                label,
                format!("No query result labelled {label:?} in the cache. Have you called populate_from_jql with this label?"),
            )
        })
    }

    pub fn get_project(&self, project_id: &str) -> MetricsResult<Arc<ProjectResultSet>> {
        self.projects.get(project_id).cloned().ok_or_else(|| {
            MetricsError::not_found(
                project_id,
                format!("No project with key {project_id} in the cache. Have you called populate_projects([\"{project_id}\"])?"),
            )
        })
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn limits(&self) -> StoreLimits {
        self.limits
    }

    pub fn projects(&self) -> &HashMap<String, Arc<ProjectResultSet>> {
        &self.projects
    }

    pub fn query_results(&self) -> &HashMap<String, Arc<QueryResultSet>> {
        &self.queries
    }

    fn today(&self) -> NaiveDate {
        self.reference_date
            .unwrap_or_else(|| Utc::now().date_naive())
    }
}
