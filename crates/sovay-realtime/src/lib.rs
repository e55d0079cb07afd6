//! # sovay-realtime
//!
//! Client for the loan-office realtime push channel.
//!
//! One [`RealtimeClient`] owns one logical socket per session. It is
//! constructed once at application start and handed to consumers
//! explicitly — there is no global instance. Internally a single task
//! owns the socket, the heartbeat and reconnect timers, and the attempt
//! counter; the public handle is cheap to clone and every method returns
//! immediately.
//!
//! Inbound envelopes fan out through the [`EventRouter`] to per-kind
//! listeners; connection state transitions flow through the
//! [`StatusBroadcaster`]. The [`facade`] module bundles the per-feature
//! subscription sets the views use. All transport failures are absorbed
//! and logged — callers observe status transitions and event data, never
//! transport errors.

#![deny(unsafe_code)]

pub mod client;
pub mod config;
pub mod connector;
pub mod error;
pub mod facade;
pub mod router;
pub mod status;

pub use client::RealtimeClient;
pub use config::RealtimeConfig;
pub use connector::{Connection, Connector, TransportEvent, WsConnector};
pub use error::RealtimeError;
pub use facade::{
    SubscriptionSet, subscribe_dashboard, subscribe_kinds, subscribe_lich_su_tra_lai,
    subscribe_tin_chap, subscribe_tra_gop,
};
pub use router::{EventRouter, Subscription};
pub use status::{ConnectionStatus, StatusBroadcaster, StatusSubscription};
