//! Per-feature subscription bundles.
//!
//! View code rarely listens on a single event kind: the contract tables
//! refetch on any of their product's CRUD events, and the dashboard on
//! everything that moves its aggregates. Each bundle registers one
//! logical listener across its kinds and returns a single combined
//! guard. Pure delegation to the [`EventRouter`] — no state of its own.
//!
//! [`EventRouter`]: crate::router::EventRouter

use std::sync::Arc;

use serde_json::Value;
use sovay_events::{Envelope, EventKind};

use crate::client::RealtimeClient;
use crate::router::Subscription;

/// Combined guard over several registrations.
///
/// Cancelling (or dropping) removes every underlying registration.
pub struct SubscriptionSet {
    subscriptions: Vec<Subscription>,
}

impl SubscriptionSet {
    /// Remove every underlying registration. Idempotent.
    pub fn cancel(&self) {
        for subscription in &self.subscriptions {
            subscription.cancel();
        }
    }

    /// Number of kinds this set listens on.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}

/// Subscribe one logical listener to several event kinds.
pub fn subscribe_kinds(
    client: &RealtimeClient,
    kinds: &[EventKind],
    listener: impl Fn(&Value, &Envelope) + Send + Sync + 'static,
) -> SubscriptionSet {
    let listener: Arc<dyn Fn(&Value, &Envelope) + Send + Sync> = Arc::new(listener);
    let subscriptions = kinds
        .iter()
        .map(|kind| {
            let listener = Arc::clone(&listener);
            client.subscribe(kind.clone(), move |data, envelope| listener(data, envelope))
        })
        .collect();
    SubscriptionSet { subscriptions }
}

/// All unsecured-contract events (created / updated / deleted).
pub fn subscribe_tin_chap(
    client: &RealtimeClient,
    listener: impl Fn(&Value, &Envelope) + Send + Sync + 'static,
) -> SubscriptionSet {
    subscribe_kinds(
        client,
        &[
            EventKind::TinChapCreated,
            EventKind::TinChapUpdated,
            EventKind::TinChapDeleted,
        ],
        listener,
    )
}

/// All installment-contract events (created / updated / deleted).
pub fn subscribe_tra_gop(
    client: &RealtimeClient,
    listener: impl Fn(&Value, &Envelope) + Send + Sync + 'static,
) -> SubscriptionSet {
    subscribe_kinds(
        client,
        &[
            EventKind::TraGopCreated,
            EventKind::TraGopUpdated,
            EventKind::TraGopDeleted,
        ],
        listener,
    )
}

/// All payment-history events (created / updated / deleted).
pub fn subscribe_lich_su_tra_lai(
    client: &RealtimeClient,
    listener: impl Fn(&Value, &Envelope) + Send + Sync + 'static,
) -> SubscriptionSet {
    subscribe_kinds(
        client,
        &[
            EventKind::LichSuTraLaiCreated,
            EventKind::LichSuTraLaiUpdated,
            EventKind::LichSuTraLaiDeleted,
        ],
        listener,
    )
}

/// Everything that should refresh the dashboard: both contract product
/// families plus the aggregate-update events.
pub fn subscribe_dashboard(
    client: &RealtimeClient,
    listener: impl Fn(&Value, &Envelope) + Send + Sync + 'static,
) -> SubscriptionSet {
    subscribe_kinds(
        client,
        &[
            EventKind::DashboardUpdated,
            EventKind::NoPhaiThuUpdated,
            EventKind::TinChapCreated,
            EventKind::TinChapUpdated,
            EventKind::TinChapDeleted,
            EventKind::TraGopCreated,
            EventKind::TraGopUpdated,
            EventKind::TraGopDeleted,
        ],
        listener,
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
