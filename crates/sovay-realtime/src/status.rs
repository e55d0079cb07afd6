//! Connection status tracking and change broadcasting.
//!
//! Exactly one [`ConnectionStatus`] value holds at any instant. The
//! [`StatusBroadcaster`] notifies observers synchronously on every actual
//! change — repeated identical states are not re-broadcast — and calls a
//! freshly registered observer once with the current value so late
//! subscribers are never stale.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sovay_core::SubscriptionId;
use tracing::warn;

/// Lifecycle state of the realtime connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    /// Dial in progress.
    Connecting,
    /// Socket open, heartbeat running.
    Connected,
    /// No socket and no pending retry.
    Disconnected,
    /// A retry is scheduled.
    Reconnecting,
    /// The socket reported an error; cleanup has not yet run.
    Error,
}

/// All status values, for exhaustive testing.
pub const ALL_STATUSES: [ConnectionStatus; 5] = [
    ConnectionStatus::Connecting,
    ConnectionStatus::Connected,
    ConnectionStatus::Disconnected,
    ConnectionStatus::Reconnecting,
    ConnectionStatus::Error,
];

impl ConnectionStatus {
    /// Return the lowercase wire string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
            Self::Reconnecting => "reconnecting",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

type StatusObserver = Arc<dyn Fn(ConnectionStatus) + Send + Sync>;

struct Registration {
    id: SubscriptionId,
    observer: StatusObserver,
}

/// Tracks the current status and fans out transitions to observers.
pub struct StatusBroadcaster {
    current: Mutex<ConnectionStatus>,
    observers: Mutex<Vec<Registration>>,
}

impl StatusBroadcaster {
    /// New broadcaster, starting [`ConnectionStatus::Disconnected`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: Mutex::new(ConnectionStatus::Disconnected),
            observers: Mutex::new(Vec::new()),
        }
    }

    /// The status holding right now.
    #[must_use]
    pub fn current(&self) -> ConnectionStatus {
        *self.current.lock()
    }

    /// Register an observer.
    ///
    /// The observer is invoked immediately with the current status, then
    /// again on every future transition. Cancel via the returned guard
    /// (explicitly or by dropping it).
    pub fn on_status_change(
        self: &Arc<Self>,
        observer: impl Fn(ConnectionStatus) + Send + Sync + 'static,
    ) -> StatusSubscription {
        let id = SubscriptionId::new();
        let observer: StatusObserver = Arc::new(observer);
        self.observers.lock().push(Registration {
            id: id.clone(),
            observer: Arc::clone(&observer),
        });
        let current = *self.current.lock();
        invoke(&observer, current);
        StatusSubscription {
            broadcaster: Arc::downgrade(self),
            id,
            active: AtomicBool::new(true),
        }
    }

    /// Move to a new status, notifying observers on actual change only.
    pub fn set(&self, status: ConnectionStatus) {
        {
            let mut current = self.current.lock();
            if *current == status {
                return;
            }
            *current = status;
        }
        let observers: Vec<StatusObserver> = self
            .observers
            .lock()
            .iter()
            .map(|r| Arc::clone(&r.observer))
            .collect();
        for observer in observers {
            invoke(&observer, status);
        }
    }

    /// Number of registered observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.lock().len()
    }

    fn remove(&self, id: &SubscriptionId) {
        self.observers.lock().retain(|r| r.id != *id);
    }
}

impl Default for StatusBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

fn invoke(observer: &StatusObserver, status: ConnectionStatus) {
    if catch_unwind(AssertUnwindSafe(|| observer(status))).is_err() {
        warn!(status = %status, "status observer panicked");
    }
}

/// Guard for one status observer registration.
///
/// Cancelling (or dropping) removes exactly this registration; repeated
/// cancellation is a no-op.
pub struct StatusSubscription {
    broadcaster: Weak<StatusBroadcaster>,
    id: SubscriptionId,
    active: AtomicBool,
}

impl StatusSubscription {
    /// Remove the registration. Idempotent.
    pub fn cancel(&self) {
        if !self.active.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(broadcaster) = self.broadcaster.upgrade() {
            broadcaster.remove(&self.id);
        }
    }
}

impl Drop for StatusSubscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
