//! Request broker and WebSocket transport to the Illustrator panel.
//!
//! One [`PanelBridge`] turns "send this script and wait for its result"
//! into a single awaitable:
//!
//! ```text
//! execute_script() ──► RequestRegistry ──► PanelTransport ──► panel
//!        ▲                (correlation)       (WebSocket)       │
//!        └──────── oneshot completion ◄── inbound frame ◄───────┘
//! ```
//!
//! Properties the rest of the system relies on:
//!
//! - Correlation ids are monotonic per process; exactly one of
//!   {response, timeout, disconnect} completes each id, and the id is
//!   removed from the registry before the caller observes the outcome.
//! - A send with no connected panel fails immediately with
//!   [`BridgeError::Disconnected`]; nothing is queued.
//! - One panel connection at a time; a new connection replaces the old
//!   (last writer wins) and outstanding requests are rejected.
//! - Inbound frames over 10 MiB are dropped with a logged protocol
//!   error; responses with unknown correlation ids likewise.

pub mod bridge;
pub mod config;
pub mod error;
pub mod registry;
pub mod transport;

pub use bridge::{ExecuteOptions, PanelBridge};
pub use config::{BridgeConfig, ConfigLoader};
pub use error::BridgeError;
pub use registry::RequestRegistry;
pub use transport::{PanelTransport, MAX_FRAME_BYTES};
