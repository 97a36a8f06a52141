use std::collections::BTreeSet;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Serialize;

use flowmetrics_common::error::{MetricsError, MetricsResult};

use crate::calendar::{business_days_between_timestamps, parse_timestamp};
use crate::source::RawTicket;
use crate::timeline::{FlowTimeline, RawFlowEntry, TimelineBuilder};

/// Type label used when the source carries no issue-type classification.
pub const DEFAULT_TICKET_TYPE: &str = "Ticket";

/// A normalized ticket with its derived flow timeline and cycle time.
///
/// Built once from a raw snapshot; it is never re-synchronized with the
/// source, so callers re-fetch to see fresh state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketRecord {
    id: String,
    key: String,
    url: String,
    ticket_type: String,
    summary: String,
    description: Option<String>,
    labels: BTreeSet<String>,
    priority: Option<String>,
    status: String,
    resolution: Option<String>,
    resolution_date: Option<DateTime<FixedOffset>>,
    assignee: Option<String>,
    fix_version: Option<String>,
    created_at: DateTime<FixedOffset>,
    updated_at: Option<DateTime<FixedOffset>>,
    flow_timeline: FlowTimeline,
    cycle_time: i64,
}

impl TicketRecord {
    /// Normalize `raw`, closing its latest flow interval at `today`.
    pub fn from_raw(raw: RawTicket, today: NaiveDate) -> MetricsResult<Self> {
        let created_at = required_timestamp(&raw.key, "created", raw.created.as_deref())?;
        let updated_at = optional_timestamp(&raw.key, "updated", raw.updated.as_deref())?;
        let resolution_date =
            optional_timestamp(&raw.key, "resolution date", raw.resolution_date.as_deref())?;

        let mut builder = TimelineBuilder::new(created_at);
        // No changelog means the ticket never left Created.
        for event in raw.history.iter().flatten().filter(|e| e.is_status_change()) {
            builder.transition(RawFlowEntry {
                entered_at: Some(event.timestamp.clone()),
                state: event.to_value.clone(),
                duration: None,
            })?;
        }
        let flow_timeline = builder.finish_at(today);

        let cycle_time = resolution_date
            .map(|resolved| business_days_between_timestamps(&created_at, &resolved))
            .unwrap_or(0);

        Ok(Self {
            id: raw.id,
            key: raw.key,
            url: raw.permalink,
            ticket_type: raw
                .issue_type
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TICKET_TYPE.to_string()),
            summary: raw.summary,
            description: raw.description,
            labels: raw.labels.into_iter().collect(),
            priority: raw.priority.as_deref().map(priority_name),
            status: raw.status,
            resolution: raw.resolution,
            resolution_date,
            assignee: raw.assignee,
            fix_version: raw.fix_versions.into_iter().next(),
            created_at,
            updated_at,
            flow_timeline,
            cycle_time,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn ticket_type(&self) -> &str {
        &self.ticket_type
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn labels(&self) -> &BTreeSet<String> {
        &self.labels
    }

    pub fn priority(&self) -> Option<&str> {
        self.priority.as_deref()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn resolution(&self) -> Option<&str> {
        self.resolution.as_deref()
    }

    pub fn resolution_date(&self) -> Option<DateTime<FixedOffset>> {
        self.resolution_date
    }

    pub fn assignee(&self) -> Option<&str> {
        self.assignee.as_deref()
    }

    pub fn fix_version(&self) -> Option<&str> {
        self.fix_version.as_deref()
    }

    pub fn created_at(&self) -> DateTime<FixedOffset> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<FixedOffset>> {
        self.updated_at
    }

    pub fn flow_timeline(&self) -> &FlowTimeline {
        &self.flow_timeline
    }

    /// Business days from creation to resolution, 0 while unresolved.
    pub fn cycle_time(&self) -> i64 {
        self.cycle_time
    }

    pub fn is_resolved(&self) -> bool {
        self.resolution_date.is_some()
    }

    /// Business days from creation until the ticket last entered `status`.
    ///
    /// Independent of [`cycle_time`](Self::cycle_time), which only looks at
    /// the resolution date. `None` if the timeline never reached `status`.
    pub fn cycle_time_until_status(&self, status: &str) -> Option<i64> {
        self.flow_timeline
            .last_entered(status)
            .map(|entry| business_days_between_timestamps(&self.created_at, &entry.entered_at()))
    }
}

/// Keep the priority name, dropping any `": description"` suffix.
pub fn priority_name(descriptor: &str) -> String {
    descriptor
        .split(':')
        .next()
        .unwrap_or_default()
        .to_string()
}

fn required_timestamp(
    key: &str,
    field: &str,
    raw: Option<&str>,
) -> MetricsResult<DateTime<FixedOffset>> {
    optional_timestamp(key, field, raw)?
        .ok_or_else(|| MetricsError::invalid_ticket(key, format!("missing {field} timestamp")))
}

fn optional_timestamp(
    key: &str,
    field: &str,
    raw: Option<&str>,
) -> MetricsResult<Option<DateTime<FixedOffset>>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(value) => parse_timestamp(value).map(Some).ok_or_else(|| {
            MetricsError::invalid_ticket(key, format!("{field} is not a timestamp: {value:?}"))
        }),
    }
}
