//! Result reporter: renders a run summary for machines or operators.

use comfy_table::{presets, Cell, CellAlignment, ContentArrangement, Table};

use crate::domain::models::{OutputFormat, RunSummary};

/// Render `summary` in the requested format.
///
/// Pure: no I/O beyond the returned string, and deterministic for a given
/// summary in either format.
pub fn render(summary: &RunSummary, format: OutputFormat) -> String {
    match format {
        OutputFormat::Structured => render_structured(summary),
        OutputFormat::Narrative => render_narrative(summary),
    }
}

fn render_structured(summary: &RunSummary) -> String {
    serde_json::to_string_pretty(summary)
        .unwrap_or_else(|err| format!("{{\"error\":\"summary serialization failed: {err}\"}}"))
}

fn render_narrative(summary: &RunSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Remediation run ({}): {} event{}\n",
        summary.mode,
        summary.outcomes.len(),
        if summary.outcomes.len() == 1 { "" } else { "s" },
    ));
    out.push_str(&format!(
        "  executed: {}  succeeded: {}  failed: {}  skipped: {}\n",
        summary.total_executed, summary.succeeded, summary.failed, summary.skipped
    ));

    if summary.outcomes.is_empty() {
        out.push_str("\nNothing to do: the report contained no failure events.\n");
        return out;
    }

    let mut table = Table::new();
    table
        .load_preset(presets::NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            ["#", "TYPE", "RESOURCE", "STATUS", "HANDLER", "REASON"]
                .iter()
                .map(|h| Cell::new(h).set_alignment(CellAlignment::Left)),
        );
    for (index, outcome) in summary.outcomes.iter().enumerate() {
        table.add_row(vec![
            Cell::new(index + 1),
            Cell::new(&outcome.event.failure_type),
            Cell::new(&outcome.event.resource),
            Cell::new(outcome.status),
            Cell::new(outcome.handler_id.as_deref().unwrap_or("-")),
            Cell::new(outcome.reason.as_deref().unwrap_or("-")),
        ]);
    }
    out.push('\n');
    out.push_str(&table.to_string());
    out.push('\n');

    // Every skip gets spelled out so an operator can tell a safety guard
    // from a genuinely idle run.
    let skips: Vec<_> = summary
        .outcomes
        .iter()
        .filter(|o| o.status == crate::domain::models::OutcomeStatus::Skipped)
        .collect();
    if !skips.is_empty() {
        out.push_str("\nSkipped:\n");
        for outcome in skips {
            out.push_str(&format!(
                "  - {} on {}: {}\n",
                outcome.event.failure_type,
                outcome.event.resource,
                outcome.reason.as_deref().unwrap_or("unspecified"),
            ));
        }
    }

    let failures: Vec<_> = summary
        .outcomes
        .iter()
        .filter(|o| o.status == crate::domain::models::OutcomeStatus::Failed)
        .collect();
    if !failures.is_empty() {
        out.push_str("\nFailed:\n");
        for outcome in failures {
            out.push_str(&format!(
                "  - {} via {}: {}\n",
                outcome.event.failure_type,
                outcome.handler_id.as_deref().unwrap_or("-"),
                outcome
                    .reason
                    .as_deref()
                    .or_else(|| outcome.output.as_deref())
                    .unwrap_or("nonzero exit"),
            ));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{
        ExecutionOutcome, FailureEvent, OutcomeStatus, RunMode, SkipReason,
    };

    fn sample_summary() -> RunSummary {
        let outcomes = vec![
            ExecutionOutcome {
                event: FailureEvent::new("network_error", "build-job-7", "connection reset"),
                handler_id: Some("clear_cache_handler".to_string()),
                mode: RunMode::Apply,
                status: OutcomeStatus::Succeeded,
                reason: None,
                output: Some("cache cleared".to_string()),
            },
            ExecutionOutcome::skipped(
                FailureEvent::new("test_timeout", "production-deploy", "tests hung"),
                Some("rerun_tests_handler".to_string()),
                RunMode::Apply,
                SkipReason::ProtectedWorkflow,
            ),
            ExecutionOutcome {
                event: FailureEvent::new("worker_oom", "build-job-9", "oom killed"),
                handler_id: Some("restart_worker_handler".to_string()),
                mode: RunMode::Apply,
                status: OutcomeStatus::Failed,
                reason: Some("timeout".to_string()),
                output: Some("".to_string()),
            },
        ];
        RunSummary::from_outcomes(RunMode::Apply, 2, outcomes)
    }

    #[test]
    fn test_structured_roundtrips() {
        let summary = sample_summary();
        let rendered = render(&summary, OutputFormat::Structured);
        let parsed: RunSummary = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed.total_executed, 2);
        assert_eq!(parsed.outcomes.len(), 3);
    }

    #[test]
    fn test_render_is_deterministic() {
        let summary = sample_summary();
        assert_eq!(
            render(&summary, OutputFormat::Narrative),
            render(&summary, OutputFormat::Narrative)
        );
        assert_eq!(
            render(&summary, OutputFormat::Structured),
            render(&summary, OutputFormat::Structured)
        );
    }

    #[test]
    fn test_narrative_lists_every_skip_with_reason() {
        let summary = sample_summary();
        let rendered = render(&summary, OutputFormat::Narrative);
        assert!(rendered.contains("protected_workflow"));
        assert!(rendered.contains("test_timeout on production-deploy"));
        assert!(rendered.contains("executed: 2"));
        assert!(rendered.contains("timeout"));
    }

    #[test]
    fn test_narrative_empty_report() {
        let summary = RunSummary::from_outcomes(RunMode::DryRun, 0, vec![]);
        let rendered = render(&summary, OutputFormat::Narrative);
        assert!(rendered.contains("no failure events"));
    }
}
