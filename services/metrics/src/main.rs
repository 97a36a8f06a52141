mod jira;
mod summary;

use std::error::Error;
use std::process::ExitCode;

use flowmetrics_config::{init_tracing, AppConfig};
use flowmetrics_flow::store::{MetricsStore, StoreLimits};
use flowmetrics_flow::ticket::TicketRecord;

use crate::jira::snapshot::SnapshotSource;
use crate::summary::FlowSummary;

fn main() -> ExitCode {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing("info");
            tracing::error!(error = %e, "failed to load config");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config.log_level);
    tracing::info!(service = "flowmetrics", "starting");

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "flow metrics run failed");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &AppConfig) -> Result<(), Box<dyn Error>> {
    let source = SnapshotSource::from_path(&config.snapshot_path)?;
    tracing::debug!(base_url = %source.snapshot().base_url, "replaying snapshot");
    let mut store = MetricsStore::with_limits(
        source,
        StoreLimits {
            project: config.project_max_results,
            query: config.query_max_results,
        },
    );

    if !config.project_keys.is_empty() {
        let fetched = store.populate_projects(&config.project_keys)?;
        for key in &config.project_keys {
            match fetched.get(key) {
                Some(project) => report(project.label(), project.records()),
                None => tracing::warn!(project = %key, "project returned no issues, skipped"),
            }
        }
    }

    if let Some(query) = &config.query {
        let result = store.populate_from_jql(query, Some(&config.query_label))?;
        report(result.label(), result.records());
    }

    if store.projects().is_empty() && store.query_results().is_empty() {
        tracing::warn!("nothing to report; set FLOW_PROJECT_KEYS or FLOW_JQL");
    }

    tracing::info!("done");
    Ok(())
}

fn report(label: &str, records: &[TicketRecord]) {
    let summary = FlowSummary::from_records(records);
    tracing::info!(
        label,
        tickets = summary.tickets,
        resolved = summary.resolved,
        mean_cycle_time = ?summary.mean_cycle_time,
        p50_cycle_time = ?summary.p50_cycle_time,
        p90_cycle_time = ?summary.p90_cycle_time,
        "flow summary"
    );
    for (state, days) in &summary.time_in_state {
        tracing::info!(label, state = %state, days, "time in state");
    }

    for record in records {
        tracing::debug!(
            label,
            key = record.key(),
            status = record.status(),
            ticket_type = record.ticket_type(),
            cycle_time = record.cycle_time(),
            transitions = record.flow_timeline().len().saturating_sub(1),
            "ticket"
        );
        for entry in record.flow_timeline() {
            tracing::debug!(
                key = record.key(),
                state = entry.state(),
                entered_at = %entry.entered_at(),
                duration = ?entry.duration(),
                "flow entry"
            );
        }
    }
}
