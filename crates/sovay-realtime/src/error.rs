//! Realtime transport error types.
//!
//! These never cross the public client API — failures are logged and
//! absorbed inside the connection task. They exist for the [`Connector`]
//! seam and for tests.
//!
//! [`Connector`]: crate::connector::Connector

use thiserror::Error;

/// Errors internal to the realtime transport.
#[derive(Debug, Error)]
pub enum RealtimeError {
    /// Opening the socket failed (DNS, TCP, or WebSocket handshake).
    #[error("failed to open socket to {url}: {reason}")]
    Connect {
        /// The URL that was dialed.
        url: String,
        /// Human-readable failure cause.
        reason: String,
    },
}
