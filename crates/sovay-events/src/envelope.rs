//! The wire [`Envelope`] carried over the channel for every message.
//!
//! Shape in both directions:
//! ```json
//! { "type": "tin_chap_updated", "data": {...}, "message": "...",
//!   "timestamp": "2026-08-06T09:00:00", "client_id": "client-..." }
//! ```
//! `type` is always present; `data` is opaque to the transport and its
//! shape is determined solely by the type. The optional fields are omitted
//! when absent, but inbound `null`s are accepted (the backend serializes
//! unset fields as `null`).

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::kind::EventKind;

/// A single message on the realtime channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Event type discriminator.
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// Payload; shape depends on [`Self::kind`].
    #[serde(default)]
    pub data: Value,
    /// Optional human-readable message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// ISO 8601 timestamp, set by whichever side produced the frame.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Client that triggered the event, when attributable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
}

impl Envelope {
    /// Create an envelope with just a kind and payload.
    #[must_use]
    pub fn new(kind: EventKind, data: Value) -> Self {
        Self {
            kind,
            data,
            message: None,
            timestamp: None,
            client_id: None,
        }
    }

    /// Attach a human-readable message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attach the originating client ID.
    #[must_use]
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Stamp the envelope with the current UTC time (RFC 3339).
    #[must_use]
    pub fn stamped(mut self) -> Self {
        self.timestamp = Some(chrono::Utc::now().to_rfc3339());
        self
    }

    /// Build the outbound heartbeat frame: `{type: "ping", data: {timestamp}}`.
    #[must_use]
    pub fn ping_now() -> Self {
        Self::new(
            EventKind::Ping,
            json!({ "timestamp": chrono::Utc::now().to_rfc3339() }),
        )
    }

    /// Build a channel subscription request.
    #[must_use]
    pub fn subscribe_channels(channels: &[&str]) -> Self {
        Self::new(EventKind::Subscribe, json!({ "channels": channels }))
    }

    /// Build a channel unsubscription request.
    #[must_use]
    pub fn unsubscribe_channels(channels: &[&str]) -> Self {
        Self::new(EventKind::Unsubscribe, json!({ "channels": channels }))
    }

    /// Build a connection status query.
    #[must_use]
    pub fn get_status() -> Self {
        Self::new(EventKind::GetStatus, json!({}))
    }

    /// Deserialize the payload into a typed shape.
    pub fn data_as<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.data.clone())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
