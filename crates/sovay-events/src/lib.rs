//! # sovay-events
//!
//! Event taxonomy and wire envelope for the loan-office realtime channel.
//!
//! Every frame on the push channel, in either direction, is a JSON
//! [`Envelope`] discriminated by an [`EventKind`]. The kinds the backend
//! emits are a closed set (contract CRUD per product, dashboard refresh,
//! system notifications, connection lifecycle) plus the client-originated
//! control messages (ping, subscribe, status queries). Unknown type strings
//! are preserved as [`EventKind::Custom`] for forward compatibility —
//! payload shapes are opaque to the transport and interpreted only by
//! feature code.

#![deny(unsafe_code)]

pub mod envelope;
pub mod kind;
pub mod payloads;

pub use envelope::Envelope;
pub use kind::{EventKind, NAMED_EVENT_KINDS};
pub use payloads::{ChannelList, ConnectionInfo, ErrorInfo, PingData};
