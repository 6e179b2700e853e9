//! Single-client WebSocket transport.
//!
//! Listens on loopback only. One panel at a time: a new connection
//! replaces the previous one (last writer wins), and requests tied to
//! the replaced connection are rejected with disconnect.

use crate::error::BridgeError;
use crate::registry::RequestRegistry;
use easel_types::ScriptResponse;
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;
use tracing::{debug, info, warn};

/// Inbound frames above this size are dropped with a protocol error.
pub const MAX_FRAME_BYTES: usize = 10 * 1024 * 1024;

struct Shared {
    registry: Arc<RequestRegistry>,
    outbound: Mutex<Option<mpsc::Sender<Message>>>,
    current_conn: Mutex<Option<JoinHandle<()>>>,
    conn_generation: AtomicU64,
}

/// The WebSocket listener and its single active connection.
pub struct PanelTransport {
    shared: Arc<Shared>,
    accept_task: Mutex<Option<JoinHandle<()>>>,
    shutdown_tx: watch::Sender<bool>,
    local_port: u16,
}

impl PanelTransport {
    /// Binds the loopback listener and starts accepting.
    ///
    /// Port `0` binds an ephemeral port; [`port`](Self::port) reports
    /// the actual one.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Transport`] when the port cannot be
    /// bound (typically: already in use).
    pub async fn bind(port: u16, registry: Arc<RequestRegistry>) -> Result<Self, BridgeError> {
        let listener = TcpListener::bind(("127.0.0.1", port))
            .await
            .map_err(|e| BridgeError::Transport(format!("cannot bind port {port}: {e}")))?;
        let local_port = listener
            .local_addr()
            .map_err(|e| BridgeError::Transport(e.to_string()))?
            .port();

        let shared = Arc::new(Shared {
            registry,
            outbound: Mutex::new(None),
            current_conn: Mutex::new(None),
            conn_generation: AtomicU64::new(0),
        });
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        info!(port = local_port, "WebSocket bridge listening on ws://127.0.0.1:{local_port}");
        let accept_task = tokio::spawn(accept_loop(listener, Arc::clone(&shared), shutdown_rx));

        Ok(Self {
            shared,
            accept_task: Mutex::new(Some(accept_task)),
            shutdown_tx,
            local_port,
        })
    }

    /// The bound port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.local_port
    }

    /// Whether a panel is currently connected.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.shared.outbound.lock().is_some()
    }

    /// Sends one frame to the connected panel.
    ///
    /// # Errors
    ///
    /// [`BridgeError::Disconnected`] when no panel is connected;
    /// [`BridgeError::Transport`] when the connection drops mid-send.
    pub async fn send(&self, frame: String) -> Result<(), BridgeError> {
        let sender = self
            .shared
            .outbound
            .lock()
            .clone()
            .ok_or(BridgeError::Disconnected {
                port: self.local_port,
            })?;
        sender
            .send(Message::text(frame))
            .await
            .map_err(|_| BridgeError::Transport("connection closed while sending".into()))
    }

    /// Stops accepting, drops the active connection, and rejects all
    /// outstanding requests.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(task) = self.accept_task.lock().take() {
            task.abort();
        }
        if let Some(conn) = self.shared.current_conn.lock().take() {
            conn.abort();
        }
        *self.shared.outbound.lock() = None;
        let rejected = self.shared.registry.reject_all("bridge shutting down");
        if rejected > 0 {
            info!(rejected, "rejected outstanding requests on shutdown");
        }
    }
}

async fn accept_loop(
    listener: TcpListener,
    shared: Arc<Shared>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        let accepted = tokio::select! {
            _ = shutdown_rx.changed() => break,
            accepted = listener.accept() => accepted,
        };
        let (stream, peer) = match accepted {
            Ok(pair) => pair,
            Err(e) => {
                warn!(error = %e, "accept failed");
                continue;
            }
        };
        let ws = match tokio_tungstenite::accept_async(stream).await {
            Ok(ws) => ws,
            Err(e) => {
                warn!(%peer, error = %e, "WebSocket handshake failed");
                continue;
            }
        };

        let generation = shared.conn_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let (tx, rx) = mpsc::channel::<Message>(64);

        let replaced = {
            let mut outbound = shared.outbound.lock();
            let replaced = outbound.is_some();
            *outbound = Some(tx);
            replaced
        };
        if replaced {
            info!(%peer, "new panel connection replaces the previous one");
            let rejected = shared.registry.reject_all("connection replaced");
            if rejected > 0 {
                debug!(rejected, "rejected requests tied to replaced connection");
            }
        } else {
            info!(%peer, "panel connected");
        }

        let conn_task = tokio::spawn(run_connection(ws, rx, Arc::clone(&shared), generation));
        if let Some(old) = shared.current_conn.lock().replace(conn_task) {
            old.abort();
        }
    }
}

async fn run_connection(
    ws: WebSocketStream<TcpStream>,
    mut outbound_rx: mpsc::Receiver<Message>,
    shared: Arc<Shared>,
    generation: u64,
) {
    let (mut sink, mut stream) = ws.split();

    let writer = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if sink.send(message).await.is_err() {
                break;
            }
        }
    });

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => handle_frame(&shared, text.as_str()),
            Ok(Message::Binary(bytes)) => {
                warn!(len = bytes.len(), "PROTOCOL_ERROR: unexpected binary frame dropped");
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {} // ping/pong are handled by the protocol layer
            Err(e) => {
                debug!(error = %e, "connection read error");
                break;
            }
        }
    }
    writer.abort();

    // Only the still-current connection clears shared state; a replaced
    // connection's teardown must not disturb its successor.
    if shared.conn_generation.load(Ordering::SeqCst) == generation {
        *shared.outbound.lock() = None;
        let rejected = shared.registry.reject_all("panel disconnected");
        info!(rejected, "panel disconnected");
    }
}

fn handle_frame(shared: &Shared, text: &str) {
    if text.len() > MAX_FRAME_BYTES {
        warn!(
            len = text.len(),
            "PROTOCOL_ERROR: frame exceeds {} bytes, dropped", MAX_FRAME_BYTES
        );
        return;
    }
    let response: ScriptResponse = match serde_json::from_str(text) {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "PROTOCOL_ERROR: malformed frame dropped");
            return;
        }
    };
    let id = response.id;
    if !shared.registry.complete(id, response) {
        warn!(id, "PROTOCOL_ERROR: response for unknown correlation id, dropped");
    }
}
