//! Per-kind listener registry and envelope fan-out.
//!
//! The registry maps each [`EventKind`] to the listeners registered for
//! it, in registration order. Entries are created on first subscribe and
//! garbage-collected when the last listener for a kind cancels. Dispatch
//! is an exact-kind lookup — no wildcard or prefix matching — and a
//! panicking listener never prevents delivery to the listeners after it.

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde_json::Value;
use sovay_core::SubscriptionId;
use sovay_events::{Envelope, EventKind};
use tracing::{debug, warn};

type EventListener = Arc<dyn Fn(&Value, &Envelope) + Send + Sync>;

struct Registration {
    id: SubscriptionId,
    listener: EventListener,
}

/// Routes inbound envelopes to the listeners registered for their kind.
pub struct EventRouter {
    listeners: Mutex<HashMap<EventKind, Vec<Registration>>>,
}

impl EventRouter {
    /// Create an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(HashMap::new()),
        }
    }

    /// Register `listener` for envelopes of `kind`.
    ///
    /// The returned guard removes exactly this registration when
    /// cancelled (or dropped); repeated cancellation is a no-op.
    pub fn subscribe(
        self: &Arc<Self>,
        kind: EventKind,
        listener: impl Fn(&Value, &Envelope) + Send + Sync + 'static,
    ) -> Subscription {
        let id = SubscriptionId::new();
        {
            let mut listeners = self.listeners.lock();
            listeners.entry(kind.clone()).or_default().push(Registration {
                id: id.clone(),
                listener: Arc::new(listener),
            });
        }
        Subscription {
            router: Arc::downgrade(self),
            kind,
            id,
            active: AtomicBool::new(true),
        }
    }

    /// Deliver an envelope to every listener registered for its kind.
    ///
    /// Listeners run in registration order; one panicking listener is
    /// caught and logged without affecting the rest or the transport.
    /// No listeners for the kind is a no-op.
    pub fn dispatch(&self, envelope: &Envelope) {
        let snapshot: Vec<EventListener> = {
            let listeners = self.listeners.lock();
            match listeners.get(&envelope.kind) {
                Some(registrations) => {
                    registrations.iter().map(|r| Arc::clone(&r.listener)).collect()
                }
                None => return,
            }
        };
        debug!(event_type = %envelope.kind, listeners = snapshot.len(), "dispatching event");
        for listener in snapshot {
            if catch_unwind(AssertUnwindSafe(|| listener(&envelope.data, envelope))).is_err() {
                warn!(event_type = %envelope.kind, "event listener panicked");
            }
        }
    }

    /// Listeners currently registered for `kind`.
    #[must_use]
    pub fn listener_count(&self, kind: &EventKind) -> usize {
        self.listeners.lock().get(kind).map_or(0, Vec::len)
    }

    /// Number of kinds with at least one listener.
    #[must_use]
    pub fn kind_count(&self) -> usize {
        self.listeners.lock().len()
    }

    fn remove(&self, kind: &EventKind, id: &SubscriptionId) {
        let mut listeners = self.listeners.lock();
        if let Some(registrations) = listeners.get_mut(kind) {
            registrations.retain(|r| r.id != *id);
            if registrations.is_empty() {
                let _ = listeners.remove(kind);
            }
        }
    }
}

impl Default for EventRouter {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard for one listener registration.
pub struct Subscription {
    router: Weak<EventRouter>,
    kind: EventKind,
    id: SubscriptionId,
    active: AtomicBool,
}

impl Subscription {
    /// The kind this registration listens on.
    #[must_use]
    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    /// Remove the registration. Idempotent.
    pub fn cancel(&self) {
        if !self.active.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(router) = self.router.upgrade() {
            router.remove(&self.kind, &self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
