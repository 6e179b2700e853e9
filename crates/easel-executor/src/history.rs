//! In-session task history ring buffer.

use easel_types::TaskReport;
use std::collections::VecDeque;

/// Capacity of the in-session history.
pub const HISTORY_CAPACITY: usize = 50;

/// One remembered invocation.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub task: String,
    /// Wall-clock time of completion, UTC milliseconds.
    pub completed_at_ms: i64,
    pub report: TaskReport,
}

/// Fixed-capacity FIFO of recent task reports.
///
/// Session-scoped only: dropped on shutdown, never persisted.
#[derive(Debug, Default)]
pub struct TaskHistory {
    entries: VecDeque<HistoryEntry>,
}

impl TaskHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a run, evicting the oldest entry at capacity.
    pub fn push(&mut self, task: impl Into<String>, report: TaskReport) {
        if self.entries.len() == HISTORY_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(HistoryEntry {
            task: task.into(),
            completed_at_ms: chrono::Utc::now().timestamp_millis(),
            report,
        });
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recent entry.
    #[must_use]
    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.back()
    }

    /// Oldest-first iteration.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }
}
