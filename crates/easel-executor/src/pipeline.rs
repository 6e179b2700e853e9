//! The four-stage pipeline and the safe retry wrapper.

use crate::collect::validate_target;
use crate::failure::StageFailure;
use crate::history::TaskHistory;
use crate::ids::assign_ids;
use crate::ordering::{apply_exclude, sort_items};
use crate::refs::item_ref;
use easel_doc::{Document, GeometryPolicy, ItemId};
use easel_types::{
    ErrorCode, IdPolicy, Idempotency, RetryInfo, RetryableStage, Stage, Target, TargetSelector,
    TaskError, TaskPayload, TaskReport, TaskWarning,
};
use serde_json::{json, Map, Value};
use std::collections::BTreeSet;
use std::time::Instant;

/// Runs task payloads against documents.
///
/// Owns the only cross-invocation state the system keeps: the geometry
/// policy and the in-session history ring. Everything else is computed
/// fresh per call.
#[derive(Debug, Default)]
pub struct Executor {
    policy: GeometryPolicy,
    history: TaskHistory,
}

impl Executor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an executor with a non-default geometry policy.
    #[must_use]
    pub fn with_policy(policy: GeometryPolicy) -> Self {
        Self {
            policy,
            history: TaskHistory::new(),
        }
    }

    #[must_use]
    pub fn policy(&self) -> &GeometryPolicy {
        &self.policy
    }

    /// Recent invocations, oldest first.
    #[must_use]
    pub fn history(&self) -> &TaskHistory {
        &self.history
    }

    /// Runs one payload through validate → collect → compute → apply.
    ///
    /// `doc` is `None` when the host has no active document; that
    /// short-circuits with `V001`. The three callables follow the
    /// crate-level contract; `collect` receives the selector's inner
    /// target, with global exclusion and ordering applied here,
    /// afterwards, exactly once.
    pub fn execute_task<A, C, P, F>(
        &mut self,
        doc: Option<&mut Document>,
        payload: &TaskPayload,
        mut collect: C,
        mut compute: P,
        mut apply: F,
    ) -> TaskReport
    where
        C: FnMut(&Document, &Target) -> Result<Vec<ItemId>, StageFailure>,
        P: FnMut(&Document, &[ItemId], &Map<String, Value>, &mut TaskReport) -> Result<Vec<A>, StageFailure>,
        F: FnMut(&mut Document, Vec<A>, &mut TaskReport) -> Result<(), StageFailure>,
    {
        let started = Instant::now();
        let mut report = TaskReport::success();
        if payload.options.trace {
            report.trace = Some(Vec::new());
        }

        // Stage: validate. Failures return with zeroed timings.
        if let Err(error) = validate_payload(payload) {
            tracing::debug!(task = %payload.task, code = %error.code, "payload rejected");
            report.push_error(error);
            return self.finish(payload, report, None);
        }

        // Stage: bind document.
        let Some(doc) = doc else {
            report.push_error(TaskError::new(
                Stage::Collect,
                ErrorCode::NoDocument,
                "no active document",
            ));
            return self.finish(payload, report, None);
        };

        // Stage: collect.
        let collect_started = Instant::now();
        let selector = payload
            .selector()
            .unwrap_or_else(|| TargetSelector::new(Target::Selection));
        let items = match collect(doc, &selector.target) {
            Ok(items) => items,
            Err(failure) => {
                report.timing.collect_ms = ms_since(collect_started);
                let error = stage_error(Some(doc), Stage::Collect, ErrorCode::CollectFailed, failure);
                report.push_error(error);
                return self.finish(payload, report, Some(started));
            }
        };

        // Global exclusion and ordering, exactly once.
        let items = match &selector.exclude {
            Some(filter) => apply_exclude(doc, &items, filter),
            None => items,
        };
        let items = sort_items(doc, &items, selector.order_by, &self.policy);

        if payload.options.id_policy != IdPolicy::None {
            let assignments = assign_ids(doc, &items, payload.options.id_policy);
            if !assignments.is_empty() {
                let entries: Vec<Value> = assignments
                    .iter()
                    .map(|a| {
                        json!({
                            "location": item_ref(doc, a.item).location(),
                            "itemId": a.item_id,
                            "assigned": a.assigned,
                            "conflict": a.conflict,
                        })
                    })
                    .collect();
                report
                    .artifacts
                    .get_or_insert_with(Default::default)
                    .insert("idAssignments".into(), Value::Array(entries));
            }
        }

        report.stats.items_processed = items.len();
        report.timing.collect_ms = ms_since(collect_started);
        report.push_trace(format!("collect: {} item(s)", items.len()));

        if items.is_empty() {
            report.push_warning(TaskWarning::new(
                Stage::Collect,
                "no items matched the targets",
            ));
            return self.finish(payload, report, Some(started));
        }

        // Stage: compute.
        let compute_started = Instant::now();
        let actions = match compute(doc, &items, &payload.params, &mut report) {
            Ok(actions) => actions,
            Err(failure) => {
                report.timing.compute_ms = ms_since(compute_started);
                let error = stage_error(Some(doc), Stage::Compute, ErrorCode::ComputeFailed, failure);
                report.push_error(error);
                return self.finish(payload, report, Some(started));
            }
        };
        report.timing.compute_ms = ms_since(compute_started);
        report.push_trace(format!("compute: {} action(s)", actions.len()));

        // Stage: apply.
        if payload.options.dry_run {
            report.push_warning(TaskWarning::new(Stage::Apply, "dry run: apply skipped"));
            report.push_trace("apply: skipped (dry run)".to_string());
            return self.finish(payload, report, Some(started));
        }
        let apply_started = Instant::now();
        if let Err(failure) = apply(doc, actions, &mut report) {
            report.timing.apply_ms = ms_since(apply_started);
            let error = stage_error(Some(doc), Stage::Apply, ErrorCode::ApplyFailed, failure);
            report.push_error(error);
            return self.finish(payload, report, Some(started));
        }
        report.timing.apply_ms = ms_since(apply_started);
        report.push_trace(format!(
            "apply: {} item(s) modified",
            report.stats.items_modified
        ));

        self.finish(payload, report, Some(started))
    }

    /// Stage-aware safe retry.
    ///
    /// Re-invokes the pipeline while the last report is not ok, at least
    /// one error sits on a stage listed in `retryableStages`, and the
    /// attempt limit is not reached. `apply` is honored as retryable
    /// only when the caller asserted `idempotency = safe`; otherwise a
    /// failed apply ends the loop with the apply callable having run at
    /// most once.
    pub fn execute_task_with_retry_safe<A, C, P, F>(
        &mut self,
        mut doc: Option<&mut Document>,
        payload: &TaskPayload,
        mut collect: C,
        mut compute: P,
        mut apply: F,
    ) -> TaskReport
    where
        C: FnMut(&Document, &Target) -> Result<Vec<ItemId>, StageFailure>,
        P: FnMut(&Document, &[ItemId], &Map<String, Value>, &mut TaskReport) -> Result<Vec<A>, StageFailure>,
        F: FnMut(&mut Document, Vec<A>, &mut TaskReport) -> Result<(), StageFailure>,
    {
        let policy = payload.options.retry.clone().unwrap_or_default();
        let max_attempts = policy.max_attempts.max(1);
        let allow_apply = payload.options.idempotency == Idempotency::Safe;
        let eligible: Vec<Stage> = policy
            .retryable_stages
            .iter()
            .filter_map(|stage| match stage {
                RetryableStage::Collect => Some(Stage::Collect),
                RetryableStage::Compute => Some(Stage::Compute),
                RetryableStage::Apply => allow_apply.then_some(Stage::Apply),
            })
            .collect();

        let mut attempts = 0u32;
        let mut retried: BTreeSet<&'static str> = BTreeSet::new();
        loop {
            attempts += 1;
            let mut report = self.execute_task(
                doc.as_deref_mut(),
                payload,
                &mut collect,
                &mut compute,
                &mut apply,
            );

            let failed_stages: Vec<Stage> = report
                .errors
                .iter()
                .filter(|e| e.code.is_retryable() || e.code == ErrorCode::ApplyFailed)
                .map(|e| e.stage)
                .filter(|stage| eligible.contains(stage))
                .collect();

            if report.ok || attempts >= max_attempts || failed_stages.is_empty() {
                if attempts > 1 {
                    report.retry_info = Some(RetryInfo {
                        attempts,
                        succeeded: report.ok,
                        retried_stages: retried.iter().map(|s| (*s).to_string()).collect(),
                        idempotency: payload.options.idempotency,
                    });
                }
                return report;
            }

            for stage in failed_stages {
                retried.insert(stage.as_str());
            }
            tracing::debug!(
                task = %payload.task,
                attempt = attempts,
                "retrying failed stages"
            );
        }
    }

    fn finish(
        &mut self,
        payload: &TaskPayload,
        mut report: TaskReport,
        started: Option<Instant>,
    ) -> TaskReport {
        // Validation and bind failures keep all timings zeroed.
        if let Some(started) = started {
            report.timing.total_ms = ms_since(started);
        }
        self.history.push(&payload.task, report.clone());
        report
    }
}

/// Runs a per-item operation, recording failures without aborting.
///
/// On failure the offending item's reference is captured, an `R004` is
/// appended (or the failure's own code), `itemsSkipped` is incremented,
/// and `None` is returned so the stage can continue with the next item.
pub fn safe_execute<T>(
    doc: &Document,
    item: ItemId,
    stage: Stage,
    report: &mut TaskReport,
    op: impl FnOnce() -> Result<T, StageFailure>,
) -> Option<T> {
    match op() {
        Ok(value) => Some(value),
        Err(failure) => {
            let code = failure.code.unwrap_or(ErrorCode::ItemOperationFailed);
            report.push_error(
                TaskError::new(stage, code, failure.message).with_item(item_ref(doc, item)),
            );
            report.stats.items_skipped += 1;
            None
        }
    }
}

fn validate_payload(payload: &TaskPayload) -> Result<(), TaskError> {
    if payload.task.trim().is_empty() {
        return Err(TaskError::new(
            Stage::Validate,
            ErrorCode::InvalidPayload,
            "task must be a non-empty string",
        ));
    }
    if !payload.version_supported() {
        return Err(TaskError::new(
            Stage::Validate,
            ErrorCode::SchemaMismatch,
            format!(
                "unsupported protocol version {:?} (major 2 required)",
                payload.version.as_deref().unwrap_or_default()
            ),
        ));
    }
    if let Some(spec) = &payload.targets {
        validate_target(spec.target()).map_err(|message| {
            TaskError::new(Stage::Validate, ErrorCode::MissingRequiredParam, message)
        })?;
    }
    Ok(())
}

fn stage_error(
    doc: Option<&Document>,
    stage: Stage,
    default_code: ErrorCode,
    failure: StageFailure,
) -> TaskError {
    let code = failure.code.unwrap_or(default_code);
    let mut error = TaskError::new(stage, code, failure.message);
    if let (Some(doc), Some(item)) = (doc, failure.item) {
        error = error.with_item(item_ref(doc, item));
    }
    error
}

fn ms_since(instant: Instant) -> f64 {
    instant.elapsed().as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect::collect_targets;
    use easel_doc::{Bounds, ItemKind};

    fn no_op_compute(
        _doc: &Document,
        items: &[ItemId],
        _params: &Map<String, Value>,
        _report: &mut TaskReport,
    ) -> Result<Vec<ItemId>, StageFailure> {
        Ok(items.to_vec())
    }

    fn no_op_apply(
        _doc: &mut Document,
        _actions: Vec<ItemId>,
        _report: &mut TaskReport,
    ) -> Result<(), StageFailure> {
        Ok(())
    }

    #[test]
    fn empty_task_name_is_v003() {
        let mut executor = Executor::new();
        let mut doc = Document::new("t");
        let payload = TaskPayload::new("  ");
        let report =
            executor.execute_task(Some(&mut doc), &payload, collect_targets, no_op_compute, no_op_apply);
        assert!(!report.ok);
        assert_eq!(report.errors[0].code, ErrorCode::InvalidPayload);
        assert_eq!(report.errors[0].stage, Stage::Validate);
    }

    #[test]
    fn wrong_major_version_is_v008() {
        let mut executor = Executor::new();
        let mut doc = Document::new("t");
        let mut payload = TaskPayload::new("ping");
        payload.version = Some("3.1.0".into());
        let report =
            executor.execute_task(Some(&mut doc), &payload, collect_targets, no_op_compute, no_op_apply);
        assert_eq!(report.errors[0].code, ErrorCode::SchemaMismatch);
        assert_eq!(report.timing.total_ms, 0.0);
    }

    #[test]
    fn history_records_every_invocation() {
        let mut executor = Executor::new();
        let mut doc = Document::new("t");
        let payload = TaskPayload::new("ping");
        for _ in 0..3 {
            let _ = executor.execute_task(
                Some(&mut doc),
                &payload,
                collect_targets,
                no_op_compute,
                no_op_apply,
            );
        }
        assert_eq!(executor.history().len(), 3);
        assert_eq!(executor.history().latest().unwrap().task, "ping");
    }

    #[test]
    fn safe_execute_records_r004_and_continues() {
        let mut doc = Document::new("t");
        let layer = doc.add_layer("L1");
        let item = doc.add_item(
            layer,
            ItemKind::Path { stroke_width: 0.0 },
            "bad",
            Bounds::default(),
        );
        let mut report = TaskReport::success();

        let out: Option<()> = safe_execute(&doc, item, Stage::Apply, &mut report, || {
            Err(StageFailure::new("item refused"))
        });
        assert!(out.is_none());
        assert!(!report.ok);
        assert_eq!(report.errors[0].code, ErrorCode::ItemOperationFailed);
        assert_eq!(report.stats.items_skipped, 1);
        assert_eq!(
            report.errors[0].item_ref.as_ref().unwrap().locator.layer_path,
            "L1"
        );

        let ok = safe_execute(&doc, item, Stage::Apply, &mut report, || Ok(42));
        assert_eq!(ok, Some(42));
        assert_eq!(report.stats.items_skipped, 1);
    }
}
