//! The [`EventKind`] enum — every event type discriminator on the channel.
//!
//! Each named variant maps to the exact snake_case string the backend
//! emits (e.g. `"tin_chap_created"`). The [`EventKind::Custom`] variant
//! carries any string outside the closed set, so parsing never fails and
//! newer servers can ship event types this client has not heard of.
//!
//! Domain predicates like [`EventKind::is_tin_chap()`] replace scattered
//! string comparisons with compile-time exhaustiveness.

use serde::de::{Deserializer, Error as _};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// All event types carried on the realtime channel.
///
/// The named variants are the recognized taxonomy; [`Self::Custom`] is the
/// forward-compatibility escape for any other type string.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    // -- Connection lifecycle --
    /// A client joined the channel.
    ConnectionEstablished,
    /// A client left the channel.
    ConnectionClosed,

    // -- Tín chấp (unsecured loan) contracts --
    /// Unsecured contract created.
    TinChapCreated,
    /// Unsecured contract updated.
    TinChapUpdated,
    /// Unsecured contract deleted.
    TinChapDeleted,

    // -- Trả góp (installment loan) contracts --
    /// Installment contract created.
    TraGopCreated,
    /// Installment contract updated.
    TraGopUpdated,
    /// Installment contract deleted.
    TraGopDeleted,

    // -- Lịch sử trả lãi (interest payment history) --
    /// Payment history entry created.
    LichSuTraLaiCreated,
    /// Payment history entry updated.
    LichSuTraLaiUpdated,
    /// Payment history entry deleted.
    LichSuTraLaiDeleted,

    // -- Dashboard --
    /// Aggregated dashboard figures changed.
    DashboardUpdated,
    /// Receivables (nợ phải thu) figures changed.
    NoPhaiThuUpdated,

    // -- System --
    /// Human-readable notice from the server.
    SystemNotification,
    /// Server-side error report.
    Error,

    // -- Client control messages --
    /// Client liveness probe.
    Ping,
    /// Server liveness reply.
    Pong,
    /// Channel subscription request.
    Subscribe,
    /// Channel unsubscription request.
    Unsubscribe,
    /// Connection status query.
    GetStatus,

    /// Any event type outside the closed taxonomy.
    Custom(String),
}

/// All named (non-custom) event kinds, in definition order.
///
/// Useful for iteration in tests and for subscribe-to-everything tooling.
pub const NAMED_EVENT_KINDS: [EventKind; 20] = [
    EventKind::ConnectionEstablished,
    EventKind::ConnectionClosed,
    EventKind::TinChapCreated,
    EventKind::TinChapUpdated,
    EventKind::TinChapDeleted,
    EventKind::TraGopCreated,
    EventKind::TraGopUpdated,
    EventKind::TraGopDeleted,
    EventKind::LichSuTraLaiCreated,
    EventKind::LichSuTraLaiUpdated,
    EventKind::LichSuTraLaiDeleted,
    EventKind::DashboardUpdated,
    EventKind::NoPhaiThuUpdated,
    EventKind::SystemNotification,
    EventKind::Error,
    EventKind::Ping,
    EventKind::Pong,
    EventKind::Subscribe,
    EventKind::Unsubscribe,
    EventKind::GetStatus,
];

impl EventKind {
    /// Return the wire string (e.g. `"tin_chap_created"`).
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::ConnectionEstablished => "connection_established",
            Self::ConnectionClosed => "connection_closed",
            Self::TinChapCreated => "tin_chap_created",
            Self::TinChapUpdated => "tin_chap_updated",
            Self::TinChapDeleted => "tin_chap_deleted",
            Self::TraGopCreated => "tra_gop_created",
            Self::TraGopUpdated => "tra_gop_updated",
            Self::TraGopDeleted => "tra_gop_deleted",
            Self::LichSuTraLaiCreated => "lich_su_tra_lai_created",
            Self::LichSuTraLaiUpdated => "lich_su_tra_lai_updated",
            Self::LichSuTraLaiDeleted => "lich_su_tra_lai_deleted",
            Self::DashboardUpdated => "dashboard_updated",
            Self::NoPhaiThuUpdated => "no_phai_thu_updated",
            Self::SystemNotification => "system_notification",
            Self::Error => "error",
            Self::Ping => "ping",
            Self::Pong => "pong",
            Self::Subscribe => "subscribe",
            Self::Unsubscribe => "unsubscribe",
            Self::GetStatus => "get_status",
            Self::Custom(s) => s,
        }
    }

    /// Whether this is an unsecured-contract event (`tin_chap_*`).
    #[must_use]
    pub fn is_tin_chap(&self) -> bool {
        matches!(
            self,
            Self::TinChapCreated | Self::TinChapUpdated | Self::TinChapDeleted
        )
    }

    /// Whether this is an installment-contract event (`tra_gop_*`).
    #[must_use]
    pub fn is_tra_gop(&self) -> bool {
        matches!(
            self,
            Self::TraGopCreated | Self::TraGopUpdated | Self::TraGopDeleted
        )
    }

    /// Whether this is a payment-history event (`lich_su_tra_lai_*`).
    #[must_use]
    pub fn is_lich_su_tra_lai(&self) -> bool {
        matches!(
            self,
            Self::LichSuTraLaiCreated | Self::LichSuTraLaiUpdated | Self::LichSuTraLaiDeleted
        )
    }

    /// Whether this event should trigger a dashboard refetch.
    ///
    /// Matches the set the dashboard views listen on: both contract
    /// product families plus the two aggregate-update events.
    #[must_use]
    pub fn is_dashboard_feed(&self) -> bool {
        matches!(self, Self::DashboardUpdated | Self::NoPhaiThuUpdated)
            || self.is_tin_chap()
            || self.is_tra_gop()
    }

    /// Whether this is a connection lifecycle announcement.
    #[must_use]
    pub fn is_connection_lifecycle(&self) -> bool {
        matches!(self, Self::ConnectionEstablished | Self::ConnectionClosed)
    }

    /// Whether this is a client-originated control message.
    #[must_use]
    pub fn is_control(&self) -> bool {
        matches!(
            self,
            Self::Ping | Self::Pong | Self::Subscribe | Self::Unsubscribe | Self::GetStatus
        )
    }

    /// Whether this kind is outside the closed taxonomy.
    #[must_use]
    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for EventKind {
    fn from(s: &str) -> Self {
        match s {
            "connection_established" => Self::ConnectionEstablished,
            "connection_closed" => Self::ConnectionClosed,
            "tin_chap_created" => Self::TinChapCreated,
            "tin_chap_updated" => Self::TinChapUpdated,
            "tin_chap_deleted" => Self::TinChapDeleted,
            "tra_gop_created" => Self::TraGopCreated,
            "tra_gop_updated" => Self::TraGopUpdated,
            "tra_gop_deleted" => Self::TraGopDeleted,
            "lich_su_tra_lai_created" => Self::LichSuTraLaiCreated,
            "lich_su_tra_lai_updated" => Self::LichSuTraLaiUpdated,
            "lich_su_tra_lai_deleted" => Self::LichSuTraLaiDeleted,
            "dashboard_updated" => Self::DashboardUpdated,
            "no_phai_thu_updated" => Self::NoPhaiThuUpdated,
            "system_notification" => Self::SystemNotification,
            "error" => Self::Error,
            "ping" => Self::Ping,
            "pong" => Self::Pong,
            "subscribe" => Self::Subscribe,
            "unsubscribe" => Self::Unsubscribe,
            "get_status" => Self::GetStatus,
            other => Self::Custom(other.to_owned()),
        }
    }
}

impl From<String> for EventKind {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl FromStr for EventKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl Serialize for EventKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        if s.is_empty() {
            return Err(D::Error::custom("event type must not be empty"));
        }
        Ok(Self::from(s))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
