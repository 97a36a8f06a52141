use std::collections::BTreeMap;

use serde::Serialize;

use flowmetrics_flow::ticket::TicketRecord;

/// Aggregate flow figures for one result set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowSummary {
    pub tickets: usize,
    pub resolved: usize,
    pub mean_cycle_time: Option<f64>,
    pub p50_cycle_time: Option<f64>,
    pub p90_cycle_time: Option<f64>,
    /// Closed business days spent per state, summed across tickets.
    pub time_in_state: BTreeMap<String, i64>,
}

impl FlowSummary {
    pub fn from_records(records: &[TicketRecord]) -> Self {
        let mut cycle_times: Vec<f64> = records
            .iter()
            .filter(|r| r.is_resolved())
            .map(|r| r.cycle_time() as f64)
            .collect();
        cycle_times.sort_by(|a, b| a.total_cmp(b));

        let mean_cycle_time = if cycle_times.is_empty() {
            None
        } else {
            Some(cycle_times.iter().sum::<f64>() / cycle_times.len() as f64)
        };

        let mut time_in_state = BTreeMap::new();
        for entry in records.iter().flat_map(|r| r.flow_timeline()) {
            if let Some(days) = entry.duration() {
                *time_in_state.entry(entry.state().to_string()).or_insert(0) += days;
            }
        }

        Self {
            tickets: records.len(),
            resolved: cycle_times.len(),
            mean_cycle_time,
            p50_cycle_time: percentile(&cycle_times, 50.0),
            p90_cycle_time: percentile(&cycle_times, 90.0),
            time_in_state,
        }
    }
}

/// Linear-interpolated percentile over an ascending slice.
fn percentile(sorted: &[f64], pct: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let k = (pct / 100.0) * (sorted.len() as f64 - 1.0);
    let floor = k.floor() as usize;
    let ceil = k.ceil() as usize;
    if floor == ceil {
        Some(sorted[floor])
    } else {
        let d = k - floor as f64;
        Some(sorted[floor] * (1.0 - d) + sorted[ceil] * d)
    }
}
