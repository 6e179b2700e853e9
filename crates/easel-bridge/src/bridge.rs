//! The broker facade: send a script, await its correlated response.

use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::registry::RequestRegistry;
use crate::transport::PanelTransport;
use easel_types::{CommandMetadata, ScriptRequest, ScriptResponse};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Per-call options for [`PanelBridge::execute_script`].
#[derive(Debug, Clone, Default)]
pub struct ExecuteOptions {
    /// Overrides the configured per-call timeout.
    pub timeout: Option<Duration>,
    /// Human-facing command metadata, logged panel-side.
    pub command: Option<CommandMetadata>,
    /// Trace id for cross-loop log correlation; generated when absent.
    pub trace_id: Option<String>,
}

impl ExecuteOptions {
    /// Options carrying only command metadata.
    #[must_use]
    pub fn for_command(command: CommandMetadata) -> Self {
        Self {
            command: Some(command),
            ..Default::default()
        }
    }
}

/// Coordinator for panel communication.
///
/// Owns the request registry and the transport; exposes exactly one
/// operation to tools: ship a script, await the correlated response.
pub struct PanelBridge {
    config: BridgeConfig,
    registry: Arc<RequestRegistry>,
    transport: PanelTransport,
}

impl PanelBridge {
    /// Validates the configuration, binds the transport, and starts
    /// accepting panel connections.
    ///
    /// # Errors
    ///
    /// Configuration or bind failures.
    pub async fn start(config: BridgeConfig) -> Result<Self, BridgeError> {
        config.validate()?;
        let registry = Arc::new(RequestRegistry::new());
        let transport = PanelTransport::bind(config.ws_port, Arc::clone(&registry)).await?;
        Ok(Self {
            config,
            registry,
            transport,
        })
    }

    /// The actually bound WebSocket port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.transport.port()
    }

    /// Whether a panel is connected right now.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// Number of requests currently awaiting a response.
    #[must_use]
    pub fn pending_requests(&self) -> usize {
        self.registry.len()
    }

    /// Ships one script and awaits its correlated response.
    ///
    /// Fails immediately with [`BridgeError::Disconnected`] when no
    /// panel is connected; nothing is ever queued. On timeout the
    /// correlation id is forgotten first, so a late response is dropped
    /// as a protocol error rather than delivered to a stale awaiter.
    ///
    /// # Errors
    ///
    /// See the [`BridgeError`] taxonomy.
    pub async fn execute_script(
        &self,
        script: &str,
        opts: ExecuteOptions,
    ) -> Result<ScriptResponse, BridgeError> {
        if !self.is_connected() {
            return Err(BridgeError::Disconnected { port: self.port() });
        }

        let trace_id = opts
            .trace_id
            .unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string());
        if let Some(command) = &opts.command {
            info!(trace = %trace_id, command = %command.command_type, "executing");
        }

        let (id, rx) = self.registry.register(trace_id.clone());
        let request = ScriptRequest {
            id,
            script: script.to_string(),
            command: opts.command,
            trace_id: Some(trace_id.clone()),
        };
        let frame = serde_json::to_string(&request)
            .map_err(|e| BridgeError::Transport(format!("cannot encode request: {e}")))?;

        if let Err(err) = self.transport.send(frame).await {
            self.registry.remove(id);
            return Err(err);
        }
        debug!(id, trace = %trace_id, "request sent");

        let timeout = opts.timeout.unwrap_or_else(|| self.config.timeout());
        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(_)) => Err(BridgeError::Disconnected { port: self.port() }),
            Err(_) => {
                self.registry.remove(id);
                Err(BridgeError::Timeout {
                    trace_id,
                    timeout_secs: timeout.as_secs_f64(),
                })
            }
        }
    }

    /// Deterministic shutdown: stop accepting, reject outstanding
    /// requests, drop the connection.
    pub async fn shutdown(&self) {
        info!("stopping WebSocket bridge");
        self.transport.shutdown().await;
    }
}
