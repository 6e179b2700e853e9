//! Human-readable TaskReport rendering.

use easel_types::TaskReport;

/// Formats a report the way every Task Protocol tool presents it.
#[must_use]
pub fn format_task_report(report: &TaskReport, task_name: &str) -> String {
    let status = if report.ok { "✓" } else { "✗" };
    let mut lines = vec![format!("{status} Task: {task_name}")];

    let t = &report.timing;
    lines.push(format!(
        "  Timing: collect={:.0}ms, compute={:.0}ms, apply={:.0}ms",
        t.collect_ms, t.compute_ms, t.apply_ms
    ));

    let s = &report.stats;
    lines.push(format!(
        "  Stats: {} processed, {} modified, {} skipped",
        s.items_processed, s.items_modified, s.items_skipped
    ));

    if !report.warnings.is_empty() {
        lines.push(format!("  ⚠ Warnings ({}):", report.warnings.len()));
        for w in &report.warnings {
            lines.push(format!("    [{}] {}", w.stage.as_str(), w.message));
        }
    }

    if !report.errors.is_empty() {
        lines.push(format!("  ✗ Errors ({}):", report.errors.len()));
        for e in &report.errors {
            let location = e
                .item_ref
                .as_ref()
                .map(|r| format!(" at {}", r.location()))
                .unwrap_or_default();
            lines.push(format!(
                "    [{}] {}: {}{location}",
                e.stage.as_str(),
                e.code,
                e.message
            ));
        }
    }

    if let Some(retry) = &report.retry_info {
        lines.push(format!(
            "  Retry: {} attempt(s), retried [{}]",
            retry.attempts,
            retry.retried_stages.join(", ")
        ));
    }

    if let Some(trace) = &report.trace {
        lines.push("  Trace:".to_string());
        for line in trace {
            lines.push(format!("    {line}"));
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_types::{ErrorCode, ItemLocator, ItemRef, Stage, TaskError, TaskWarning};

    #[test]
    fn success_report_shows_glyph_and_stats() {
        let mut report = TaskReport::success();
        report.stats.items_processed = 3;
        report.stats.items_modified = 2;
        let text = format_task_report(&report, "arrange_grid");
        assert!(text.starts_with("✓ Task: arrange_grid"));
        assert!(text.contains("3 processed, 2 modified, 0 skipped"));
    }

    #[test]
    fn errors_include_code_and_item_location() {
        let mut report = TaskReport::success();
        report.push_warning(TaskWarning::new(Stage::Apply, "dry run"));
        report.push_error(
            TaskError::new(Stage::Apply, ErrorCode::ItemOperationFailed, "locked").with_item(
                ItemRef {
                    locator: ItemLocator {
                        layer_path: "L1".into(),
                        index_path: vec![2],
                    },
                    item_type: "PathItem".into(),
                    ..Default::default()
                },
            ),
        );
        let text = format_task_report(&report, "apply_styles");
        assert!(text.starts_with("✗ Task: apply_styles"));
        assert!(text.contains("[apply] R004: locked at L1[2]"));
        assert!(text.contains("⚠ Warnings (1):"));
    }

    #[test]
    fn trace_lines_are_indented() {
        let mut report = TaskReport::success();
        report.trace = Some(vec!["collect: 2 item(s)".into()]);
        let text = format_task_report(&report, "t");
        assert!(text.contains("  Trace:\n    collect: 2 item(s)"));
    }
}
