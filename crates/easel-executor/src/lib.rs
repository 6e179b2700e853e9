//! Task pipeline: validate → collect → compute → apply.
//!
//! The [`Executor`] turns a declarative [`TaskPayload`](easel_types::TaskPayload)
//! and three callables into exactly one
//! [`TaskReport`](easel_types::TaskReport):
//!
//! ```text
//! payload ──► validate ──► bind document ──► collect ──► compute ──► apply
//!                │               │              │           │          │
//!                ▼               ▼              ▼           ▼          ▼
//!             V003/V008        V001        R001 + order   R002       R003
//!                                          exclude, ids
//! ```
//!
//! The contract of the callables:
//!
//! - **collect** `(doc, target) -> Vec<ItemId>`; read-only enumeration
//!   for a single (already unwrapped) target; [`collect_targets`] is the
//!   standard implementation.
//! - **compute** `(doc, items, params, report) -> Vec<A>`; pure with
//!   respect to the document; may append warnings.
//! - **apply** `(doc, actions, report)`; the only stage allowed to
//!   mutate; raises so the executor can record an `R003`.
//!
//! Exclusion filters and ordering are applied exactly once, by the
//! executor, after the target resolves. Retry goes through
//! [`Executor::execute_task_with_retry_safe`]; there is no variant that
//! retries the apply stage without the caller asserting idempotency.

pub mod collect;
pub mod failure;
pub mod history;
pub mod ids;
pub mod ordering;
pub mod pipeline;
pub mod refs;
pub mod support;

pub use collect::{collect_targets, wildcard_match};
pub use failure::StageFailure;
pub use history::{HistoryEntry, TaskHistory};
pub use ids::{assign_ids, mint_id, IdAssignment};
pub use ordering::{apply_exclude, sort_items};
pub use pipeline::{safe_execute, Executor};
pub use refs::item_ref;
