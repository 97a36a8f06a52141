//! Chronological record of the states a ticket passed through.
//!
//! A [`FlowTimeline`] only grows through [`FlowTimeline::append`], which
//! validates the candidate before touching the collection and keeps entries
//! sorted by `entered_at`. [`TimelineBuilder`] reconstructs a timeline from a
//! ticket's creation time and its status-change history, closing each
//! interval with a business-day duration as the next state is entered.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use flowmetrics_common::error::{MetricsError, MetricsResult};

use crate::calendar::{business_days_between, parse_timestamp};

/// State name seeded at the ticket's creation time.
pub const CREATED_STATE: &str = "Created";

/// One interval a ticket spent in `state`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowEntry {
    entered_at: DateTime<FixedOffset>,
    state: String,
    duration: Option<i64>,
}

impl FlowEntry {
    pub fn new(entered_at: DateTime<FixedOffset>, state: impl Into<String>) -> MetricsResult<Self> {
        let state = state.into();
        if state.trim().is_empty() {
            return Err(MetricsError::InvalidFlowEntry(format!(
                "entry at {entered_at} has an empty state name"
            )));
        }
        Ok(Self {
            entered_at,
            state,
            duration: None,
        })
    }

    pub fn entered_at(&self) -> DateTime<FixedOffset> {
        self.entered_at
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    /// Business days spent in this state, `None` while the interval is open.
    pub fn duration(&self) -> Option<i64> {
        self.duration
    }

    pub fn is_open(&self) -> bool {
        self.duration.is_none()
    }

    fn close_at(&mut self, until: NaiveDate) {
        self.duration = Some(business_days_between(self.entered_at.date_naive(), until));
    }
}

/// A state entry as it arrives from a source, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFlowEntry {
    pub entered_at: Option<String>,
    pub state: Option<String>,
    pub duration: Option<i64>,
}

impl RawFlowEntry {
    pub fn new(entered_at: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            entered_at: Some(entered_at.into()),
            state: Some(state.into()),
            duration: None,
        }
    }

    pub fn with_duration(mut self, duration: i64) -> Self {
        self.duration = Some(duration);
        self
    }
}

impl TryFrom<RawFlowEntry> for FlowEntry {
    type Error = MetricsError;

    fn try_from(raw: RawFlowEntry) -> MetricsResult<Self> {
        let stamp = raw.entered_at.ok_or_else(|| {
            MetricsError::InvalidFlowEntry("entry is missing 'entered_at'".to_string())
        })?;
        let entered_at = parse_timestamp(&stamp).ok_or_else(|| {
            MetricsError::InvalidFlowEntry(format!("'entered_at' is not a timestamp: {stamp:?}"))
        })?;
        let state = raw.state.ok_or_else(|| {
            MetricsError::InvalidFlowEntry(format!("entry at {stamp} is missing 'state'"))
        })?;

        let mut entry = FlowEntry::new(entered_at, state)?;
        entry.duration = raw.duration;
        Ok(entry)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FlowTimeline {
    entries: Vec<FlowEntry>,
}

impl FlowTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `raw` and insert it in `entered_at` order.
    ///
    /// On error the timeline is left untouched.
    pub fn append(&mut self, raw: RawFlowEntry) -> MetricsResult<()> {
        let entry = FlowEntry::try_from(raw)?;
        self.insert(entry);
        Ok(())
    }

    fn insert(&mut self, entry: FlowEntry) {
        self.entries.push(entry);
        self.entries.sort_by_key(|e| e.entered_at);
    }

    pub fn entries(&self) -> &[FlowEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FlowEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn first(&self) -> Option<&FlowEntry> {
        self.entries.first()
    }

    pub fn last(&self) -> Option<&FlowEntry> {
        self.entries.last()
    }

    /// Most recent entry whose state is `state`.
    pub fn last_entered(&self, state: &str) -> Option<&FlowEntry> {
        self.entries.iter().rev().find(|e| e.state == state)
    }

    /// Total business days recorded against `state` across all its visits.
    pub fn total_duration_in(&self, state: &str) -> i64 {
        self.entries
            .iter()
            .filter(|e| e.state == state)
            .filter_map(|e| e.duration)
            .sum()
    }
}

impl<'a> IntoIterator for &'a FlowTimeline {
    type Item = &'a FlowEntry;
    type IntoIter = std::slice::Iter<'a, FlowEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Rebuilds a ticket's timeline from its creation time and status changes.
///
/// Every transition closes the previous interval (starting with the seeded
/// `Created` entry) at the date the new state was entered. The latest
/// interval stays open until [`finish_at`](Self::finish_at) closes it
/// against a reference date, and only if at least one transition was seen.
#[derive(Debug)]
pub struct TimelineBuilder {
    timeline: FlowTimeline,
    open: FlowEntry,
    transitions: usize,
}

impl TimelineBuilder {
    pub fn new(created_at: DateTime<FixedOffset>) -> Self {
        Self {
            timeline: FlowTimeline::new(),
            open: FlowEntry {
                entered_at: created_at,
                state: CREATED_STATE.to_string(),
                duration: None,
            },
            transitions: 0,
        }
    }

    /// Record that the ticket entered a new state.
    ///
    /// The candidate is validated before the previous interval is closed, so
    /// a rejected transition leaves the builder as it was.
    pub fn transition(&mut self, raw: RawFlowEntry) -> MetricsResult<()> {
        let next = FlowEntry::try_from(raw)?;
        let mut previous = std::mem::replace(&mut self.open, next);
        previous.close_at(self.open.entered_at.date_naive());
        self.timeline.insert(previous);
        self.transitions += 1;
        Ok(())
    }

    pub fn transitions(&self) -> usize {
        self.transitions
    }

    /// The timeline with its latest interval left open.
    pub fn finish(mut self) -> FlowTimeline {
        self.timeline.insert(self.open);
        self.timeline
    }

    /// The timeline with its latest interval closed at `today`.
    ///
    /// A ticket that never changed status keeps an open `Created` entry.
    pub fn finish_at(mut self, today: NaiveDate) -> FlowTimeline {
        if self.transitions > 0 {
            self.open.close_at(today);
        }
        self.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(raw: &str) -> DateTime<FixedOffset> {
        parse_timestamp(raw).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn states(timeline: &FlowTimeline) -> Vec<&str> {
        timeline.iter().map(FlowEntry::state).collect()
    }

    #[test]
    fn append_keeps_entries_sorted() {
        let mut timeline = FlowTimeline::new();
        timeline
            .append(RawFlowEntry::new("2024-01-10T09:00:00Z", "Done"))
            .unwrap();
        timeline
            .append(RawFlowEntry::new("2024-01-01T09:00:00Z", "Created"))
            .unwrap();
        timeline
            .append(RawFlowEntry::new("2024-01-03T09:00:00.000+0000", "In Progress"))
            .unwrap();

        assert_eq!(states(&timeline), vec!["Created", "In Progress", "Done"]);
        let stamps: Vec<_> = timeline.iter().map(FlowEntry::entered_at).collect();
        assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn append_orders_by_instant_across_offsets() {
        let mut timeline = FlowTimeline::new();
        // 10:00+02:00 is 08:00Z, earlier than 09:00Z.
        timeline
            .append(RawFlowEntry::new("2024-01-01T09:00:00Z", "B"))
            .unwrap();
        timeline
            .append(RawFlowEntry::new("2024-01-01T10:00:00+02:00", "A"))
            .unwrap();
        assert_eq!(states(&timeline), vec!["A", "B"]);
    }

    #[test]
    fn equal_timestamps_do_not_fail() {
        let mut timeline = FlowTimeline::new();
        timeline
            .append(RawFlowEntry::new("2024-01-01T09:00:00Z", "A"))
            .unwrap();
        timeline
            .append(RawFlowEntry::new("2024-01-01T09:00:00Z", "B"))
            .unwrap();
        assert_eq!(timeline.len(), 2);
    }

    #[test]
    fn append_rejects_non_timestamp_without_mutating() {
        let mut timeline = FlowTimeline::new();
        timeline
            .append(RawFlowEntry::new("2024-01-01T09:00:00Z", "Created"))
            .unwrap();
        let before = timeline.clone();

        let err = timeline
            .append(RawFlowEntry::new("not a date", "In Progress"))
            .unwrap_err();

        assert!(matches!(err, MetricsError::InvalidFlowEntry(_)));
        assert_eq!(timeline, before);
    }

    #[test]
    fn append_rejects_missing_fields_and_blank_state() {
        let mut timeline = FlowTimeline::new();

        let missing_stamp = RawFlowEntry {
            state: Some("Open".to_string()),
            ..Default::default()
        };
        let missing_state = RawFlowEntry {
            entered_at: Some("2024-01-01T09:00:00Z".to_string()),
            ..Default::default()
        };
        let blank_state = RawFlowEntry::new("2024-01-01T09:00:00Z", "   ");

        for raw in [missing_stamp, missing_state, blank_state] {
            let err = timeline.append(raw).unwrap_err();
            assert!(matches!(err, MetricsError::InvalidFlowEntry(_)), "got: {err}");
        }
        assert!(timeline.is_empty());
    }

    #[test]
    fn append_keeps_supplied_duration() {
        let mut timeline = FlowTimeline::new();
        timeline
            .append(RawFlowEntry::new("2024-01-01T09:00:00Z", "Open").with_duration(3))
            .unwrap();
        assert_eq!(timeline.first().unwrap().duration(), Some(3));
    }

    #[test]
    fn builder_without_transitions_leaves_created_open() {
        let timeline = TimelineBuilder::new(ts("2024-01-01T09:00:00Z")).finish_at(date(2024, 2, 1));

        assert_eq!(timeline.len(), 1);
        let only = timeline.first().unwrap();
        assert_eq!(only.state(), CREATED_STATE);
        assert!(only.is_open());
    }

    #[test]
    fn builder_closes_each_interval_at_next_transition() {
        let mut builder = TimelineBuilder::new(ts("2024-01-01T09:00:00Z"));
        builder
            .transition(RawFlowEntry::new("2024-01-03T10:00:00Z", "In Progress"))
            .unwrap();
        builder
            .transition(RawFlowEntry::new("2024-01-08T16:00:00Z", "Done"))
            .unwrap();
        assert_eq!(builder.transitions(), 2);

        let timeline = builder.finish();
        assert_eq!(states(&timeline), vec!["Created", "In Progress", "Done"]);

        let durations: Vec<_> = timeline.iter().map(FlowEntry::duration).collect();
        // Mon -> Wed = 2, Wed -> next Mon = 3, Done still open.
        assert_eq!(durations, vec![Some(2), Some(3), None]);
    }

    #[test]
    fn builder_finish_at_closes_latest_interval() {
        let mut builder = TimelineBuilder::new(ts("2024-01-01T09:00:00Z"));
        builder
            .transition(RawFlowEntry::new("2024-01-02T09:00:00Z", "In Progress"))
            .unwrap();

        let timeline = builder.finish_at(date(2024, 1, 9));
        assert!(timeline.iter().all(|e| !e.is_open()));
        // Tue 2nd -> Tue 9th = 5 business days.
        assert_eq!(timeline.last().unwrap().duration(), Some(5));
    }

    #[test]
    fn builder_rejects_bad_transition_and_keeps_state() {
        let mut builder = TimelineBuilder::new(ts("2024-01-01T09:00:00Z"));
        builder
            .transition(RawFlowEntry::new("2024-01-02T09:00:00Z", "In Progress"))
            .unwrap();

        let bad = RawFlowEntry {
            entered_at: Some("2024-01-04T09:00:00Z".to_string()),
            state: None,
            duration: None,
        };
        assert!(builder.transition(bad).is_err());
        assert_eq!(builder.transitions(), 1);

        let timeline = builder.finish();
        assert_eq!(states(&timeline), vec!["Created", "In Progress"]);
        assert!(timeline.last().unwrap().is_open());
    }

    #[test]
    fn lookups_by_state() {
        let mut builder = TimelineBuilder::new(ts("2024-01-01T09:00:00Z"));
        for (stamp, state) in [
            ("2024-01-02T09:00:00Z", "In Progress"),
            ("2024-01-04T09:00:00Z", "Review"),
            ("2024-01-05T09:00:00Z", "In Progress"),
            ("2024-01-10T09:00:00Z", "Done"),
        ] {
            builder.transition(RawFlowEntry::new(stamp, state)).unwrap();
        }
        let timeline = builder.finish();

        let last_in_progress = timeline.last_entered("In Progress").unwrap();
        assert_eq!(last_in_progress.entered_at(), ts("2024-01-05T09:00:00Z"));
        // 2 (Tue->Thu) + 3 (Fri->Wed)
        assert_eq!(timeline.total_duration_in("In Progress"), 5);
        assert!(timeline.last_entered("Blocked").is_none());
    }
}
