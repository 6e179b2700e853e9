//! Task Protocol data model for the Easel bridge.
//!
//! This crate is the shared vocabulary of the system: the payloads a
//! caller hands to the task pipeline, the reports that come back, and
//! the wire envelopes exchanged with the Illustrator panel.
//!
//! # Crate Architecture
//!
//! `easel-types` sits at the bottom of the workspace and is safe for
//! every other crate to depend on:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │  easel-cli / easel-mcp        (frontends)            │
//! ├──────────────────────────────────────────────────────┤
//! │  easel-bridge / easel-executor / easel-scripts       │
//! ├──────────────────────────────────────────────────────┤
//! │  easel-doc                    (document tree)        │
//! ├──────────────────────────────────────────────────────┤
//! │  easel-types                  ◄── HERE               │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! # Protocol overview
//!
//! A tool invocation becomes a [`TaskPayload`]: a task name, a
//! [`TargetSelector`] describing which document items to operate on,
//! free-form parameters, and [`TaskOptions`]. The executor answers with
//! exactly one [`TaskReport`] carrying ok/stats/timing/warnings/errors.
//!
//! Everything serializes with camelCase field names because the peer
//! side of the wire is an ExtendScript interpreter.

pub mod envelope;
pub mod error;
pub mod options;
pub mod payload;
pub mod refs;
pub mod report;
pub mod tags;
pub mod target;

pub use envelope::{CommandMetadata, ScriptOutcome, ScriptRequest, ScriptResponse};
pub use error::{ErrorCategory, ErrorCode};
pub use options::{IdPolicy, Idempotency, RetryPolicy, RetryableStage, TaskOptions};
pub use payload::{TaskPayload, TargetsSpec, PROTOCOL_VERSION};
pub use refs::{IdSource, ItemIdentity, ItemLocator, ItemRef, ItemTags};
pub use report::{RetryInfo, Stage, TaskError, TaskReport, TaskStats, TaskWarning, TimingInfo};
pub use target::{ExcludeFilter, OrderBy, Target, TargetSelector};
