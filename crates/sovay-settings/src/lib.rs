//! # sovay-settings
//!
//! Layered configuration for the realtime stack.
//!
//! Loading order: compiled defaults → `~/.sovay/settings.json` (deep
//! merge) → environment variable overrides. Invalid env values are
//! ignored with a warning rather than failing startup.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{load_settings, load_settings_from_path, settings_path};
pub use types::{ApiSettings, LoggingSettings, RealtimeSettings, SovaySettings};
