//! Realtime client configuration.

use std::time::Duration;

use sovay_core::ClientId;
use sovay_settings::RealtimeSettings;

/// Configuration for one [`RealtimeClient`](crate::RealtimeClient).
#[derive(Clone, Debug)]
pub struct RealtimeConfig {
    /// Base WebSocket URL including the endpoint path; the client ID is
    /// appended as the final path segment when dialing.
    pub url: String,
    /// This session's client token.
    pub client_id: ClientId,
    /// Fixed delay between reconnection attempts.
    pub reconnect_interval: Duration,
    /// Automatic reconnection budget before giving up.
    pub max_reconnect_attempts: u32,
    /// Heartbeat ping cadence while connected.
    pub heartbeat_interval: Duration,
    /// How long to wait for a pong before presuming the link dead.
    pub pong_timeout: Duration,
    /// Dial as soon as the client is constructed.
    pub auto_connect: bool,
    /// Bounded queue between the socket read loop and listener dispatch.
    pub dispatch_buffer: usize,
}

impl RealtimeConfig {
    /// Configuration with channel-contract defaults and a generated
    /// client token.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client_id: ClientId::generate(),
            reconnect_interval: Duration::from_millis(3_000),
            max_reconnect_attempts: 10,
            heartbeat_interval: Duration::from_millis(30_000),
            pong_timeout: Duration::from_millis(5_000),
            auto_connect: true,
            dispatch_buffer: 256,
        }
    }

    /// Build from loaded settings, supplying the session's client token.
    #[must_use]
    pub fn from_settings(settings: &RealtimeSettings, client_id: ClientId) -> Self {
        Self {
            url: settings.ws_url.clone(),
            client_id,
            reconnect_interval: Duration::from_millis(settings.reconnect_interval_ms),
            max_reconnect_attempts: settings.max_reconnect_attempts,
            heartbeat_interval: Duration::from_millis(settings.heartbeat_interval_ms),
            pong_timeout: Duration::from_millis(settings.pong_timeout_ms),
            auto_connect: settings.auto_connect,
            dispatch_buffer: settings.dispatch_buffer,
        }
    }

    /// Use a fixed client token instead of a generated one.
    #[must_use]
    pub fn with_client_id(mut self, client_id: impl Into<ClientId>) -> Self {
        self.client_id = client_id.into();
        self
    }

    /// Override the reconnect delay.
    #[must_use]
    pub fn with_reconnect_interval(mut self, interval: Duration) -> Self {
        self.reconnect_interval = interval;
        self
    }

    /// Override the reconnection budget.
    #[must_use]
    pub fn with_max_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.max_reconnect_attempts = attempts;
        self
    }

    /// Override the heartbeat cadence.
    #[must_use]
    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    /// Override the pong liveness timeout.
    #[must_use]
    pub fn with_pong_timeout(mut self, timeout: Duration) -> Self {
        self.pong_timeout = timeout;
        self
    }

    /// Enable or disable dialing on construction.
    #[must_use]
    pub fn with_auto_connect(mut self, auto_connect: bool) -> Self {
        self.auto_connect = auto_connect;
        self
    }

    /// The full URL dialed for this session: `{url}/{client_id}`.
    #[must_use]
    pub fn socket_url(&self) -> String {
        format!("{}/{}", self.url.trim_end_matches('/'), self.client_id)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
