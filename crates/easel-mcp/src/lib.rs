//! MCP tool surface for the Easel bridge.
//!
//! Every tool follows the same discipline: validate arguments, compose
//! a script (optionally pulling libraries through the resolver), make
//! exactly one broker call, and render the result. Tools never bypass
//! the broker and never make a second call per invocation.

pub mod report;
pub mod result;
pub mod server;

pub use report::format_task_report;
pub use result::{parse_task_report, render_response};
pub use server::EaselServer;
