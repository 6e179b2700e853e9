//! Bridge failure taxonomy.

use thiserror::Error;

/// Errors surfaced to broker callers.
///
/// | Variant | Code | Meaning |
/// |---------|------|---------|
/// | [`Disconnected`](Self::Disconnected) | `DISCONNECTED` | No panel, or the panel dropped mid-flight |
/// | [`Timeout`](Self::Timeout) | `TIMEOUT` | No response within the per-call deadline |
/// | [`Transport`](Self::Transport) | `TRANSPORT_ERROR` | Frame encode/send failure |
/// | [`Protocol`](Self::Protocol) | `PROTOCOL_ERROR` | Malformed or uncorrelated inbound frame |
/// | [`Config`](Self::Config) | `CONFIG_ERROR` | Invalid bridge configuration |
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The panel is not connected. Carries actionable guidance.
    #[error(
        "DISCONNECTED: Illustrator panel is not connected.\n\n\
         Quick fixes:\n\
         1. Open Adobe Illustrator\n\
         2. Window > Extensions > Easel Control\n\
         3. Click 'Connect' in the panel\n\n\
         (WebSocket server listening on port {port})"
    )]
    Disconnected { port: u16 },

    /// The per-call deadline elapsed. The remote script is not aborted;
    /// its late response will be dropped with a logged protocol error.
    #[error("TIMEOUT: no response within {timeout_secs}s (trace {trace_id})")]
    Timeout { trace_id: String, timeout_secs: f64 },

    /// Sending or encoding a frame failed.
    #[error("TRANSPORT_ERROR: {0}")]
    Transport(String),

    /// An inbound frame violated the protocol.
    #[error("PROTOCOL_ERROR: {0}")]
    Protocol(String),

    /// Invalid configuration.
    #[error("CONFIG_ERROR: {0}")]
    Config(String),
}

impl BridgeError {
    /// Stable machine-readable code for callers that match on kind.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Disconnected { .. } => "DISCONNECTED",
            Self::Timeout { .. } => "TIMEOUT",
            Self::Transport(_) => "TRANSPORT_ERROR",
            Self::Protocol(_) => "PROTOCOL_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
        }
    }
}
