//! Registry of in-flight requests keyed by correlation id.

use easel_types::ScriptResponse;
use parking_lot::Mutex;
use std::collections::HashMap;
use tokio::sync::oneshot;
use tracing::debug;

struct Pending {
    tx: oneshot::Sender<ScriptResponse>,
    trace_id: String,
}

#[derive(Default)]
struct Inner {
    next_id: u64,
    pending: HashMap<u64, Pending>,
}

/// Thread-safe map from correlation id to completion handle.
///
/// Registration happens on the tool side; completion happens on the
/// transport side. The entry is removed before either outcome is
/// released, so at most one completion can ever occur per id.
#[derive(Default)]
pub struct RequestRegistry {
    inner: Mutex<Inner>,
}

impl RequestRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the next correlation id and its completion handle.
    pub fn register(&self, trace_id: String) -> (u64, oneshot::Receiver<ScriptResponse>) {
        let (tx, rx) = oneshot::channel();
        let mut inner = self.inner.lock();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.pending.insert(id, Pending { tx, trace_id });
        (id, rx)
    }

    /// Completes a request with the panel's response.
    ///
    /// Returns `false` when the id is unknown; already completed,
    /// timed out, or never issued. The caller logs that as a protocol
    /// error; this is a no-op otherwise.
    pub fn complete(&self, id: u64, response: ScriptResponse) -> bool {
        let pending = self.inner.lock().pending.remove(&id);
        match pending {
            Some(pending) => {
                debug!(id, trace = %pending.trace_id, "request completed");
                // Receiver may have been dropped by a racing timeout.
                let _ = pending.tx.send(response);
                true
            }
            None => false,
        }
    }

    /// Forgets a request (timeout path). Returns `false` when already
    /// gone.
    pub fn remove(&self, id: u64) -> bool {
        self.inner.lock().pending.remove(&id).is_some()
    }

    /// Rejects every outstanding request (disconnect or shutdown).
    ///
    /// Dropping the senders wakes every awaiter with a closed-channel
    /// error, which the broker maps to `DISCONNECTED`.
    pub fn reject_all(&self, reason: &str) -> usize {
        let drained: Vec<(u64, Pending)> = self.inner.lock().pending.drain().collect();
        for (id, pending) in &drained {
            debug!(id, trace = %pending.trace_id, reason, "request rejected");
        }
        drained.len()
    }

    /// Number of in-flight requests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
