//! Settings structures with compiled defaults.
//!
//! Field names use camelCase in JSON to match the frontend configuration
//! the backend team ships (`wsUrl`, `reconnectIntervalMs`, ...).

use serde::{Deserialize, Serialize};

/// Root settings document (`~/.sovay/settings.json`).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SovaySettings {
    /// Realtime channel configuration.
    pub realtime: RealtimeSettings,
    /// REST collaborator endpoints (consumed by views, not implemented here).
    pub api: ApiSettings,
    /// Logging configuration.
    pub logging: LoggingSettings,
}

/// Realtime channel configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RealtimeSettings {
    /// Base WebSocket URL including the endpoint path; the client ID is
    /// appended as the final path segment.
    pub ws_url: String,
    /// Fixed delay between reconnection attempts, in milliseconds.
    pub reconnect_interval_ms: u64,
    /// Automatic reconnection budget before giving up.
    pub max_reconnect_attempts: u32,
    /// Heartbeat ping cadence while connected, in milliseconds.
    pub heartbeat_interval_ms: u64,
    /// How long to wait for a pong before presuming the link dead.
    pub pong_timeout_ms: u64,
    /// Dial as soon as the client is constructed.
    pub auto_connect: bool,
    /// Bounded queue between the socket read loop and listener dispatch.
    pub dispatch_buffer: usize,
}

impl Default for RealtimeSettings {
    fn default() -> Self {
        Self {
            ws_url: "ws://localhost:8000/ws".to_owned(),
            reconnect_interval_ms: 3_000,
            max_reconnect_attempts: 10,
            heartbeat_interval_ms: 30_000,
            pong_timeout_ms: 5_000,
            auto_connect: true,
            dispatch_buffer: 256,
        }
    }
}

/// REST collaborator configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiSettings {
    /// Base URL of the loan-servicing REST API.
    pub base_url: String,
    /// Request timeout, in milliseconds.
    pub timeout_ms: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_owned(),
            timeout_ms: 10_000,
        }
    }
}

/// Logging configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Minimum level for the tracing subscriber (`trace` .. `error`).
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
