//! Typed payloads for the frames the client itself interprets.
//!
//! Contract and dashboard payloads stay opaque [`serde_json::Value`]s —
//! feature code refetches over REST rather than reading pushed bodies.
//! Only the channel's own control and lifecycle frames get typed shapes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Payload of `connection_established` / `connection_closed` and of the
/// greeting notification sent to a client right after it joins.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    /// The client the announcement is about.
    pub client_id: String,
    /// Channel population after the change.
    pub active_connections: u64,
}

/// Payload of an `error` frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Short error description.
    pub error: String,
    /// Optional structured context (e.g. the offending message).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Payload of a `ping` frame (and echoed back in `pong`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingData {
    /// Client-side send time, echoed by the server.
    pub timestamp: String,
}

/// Payload of `subscribe` / `unsubscribe` acknowledgements.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelList {
    /// The channels affected by the request.
    pub channels: Vec<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
