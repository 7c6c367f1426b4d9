//! Script Bridge Module
//!
//! The surface script callers talk to: newline-delimited JSON over a local
//! socket. Three request methods (`getGyroData`, `start`, `stop`) map onto
//! the integrator's operations, and every integrated sample is pushed to all
//! connected peers as a `change` event.
//!
//! ## Modules
//!
//! - [`protocol`] - request/reply/event wire types and the dispatch table
//! - [`server`] - listener, per-connection request loop, event broadcast
//! - [`client`] - blocking client for scripts, tools, and tests

pub mod client;
pub mod protocol;
pub mod server;

pub use client::BridgeClient;
pub use protocol::{dispatch, BridgeReply, BridgeRequest, ChangeEvent, CHANGE_EVENT};
pub use server::run_bridge_server;
