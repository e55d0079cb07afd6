//! # sovay-core
//!
//! Shared foundations for the sovay realtime stack: branded ID newtypes
//! and the `tracing` subscriber bootstrap.

#![deny(unsafe_code)]

pub mod ids;
pub mod logging;

pub use ids::{ClientId, SubscriptionId};
