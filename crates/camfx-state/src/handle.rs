//! Effect handle - the observable, read-only view a track exposes to its
//! application.
//!
//! A handle is owned by its track and dies with it. The store only keeps a
//! weak reference, and subscribers only ever receive a borrow.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};

use camfx_core::{EffectInfo, EffectKind, EffectState, OriginId, SubscriptionId, TrackId};

use crate::notifier::SubscriberList;
use crate::{ChangeNotifier, EffectChange, EffectStateStore, Subscriber, Transition};

pub(crate) struct HandleShared {
    track: TrackId,
    origin: OriginId,
    store: Arc<EffectStateStore>,
    notifier: Mutex<ChangeNotifier>,
    subscribers: Mutex<SubscriberList>,
}

impl HandleShared {
    /// Run one delivery round for a store transition
    pub(crate) fn deliver(self: &Arc<Self>, transition: &Transition) -> usize {
        let Some(state) = self.notifier.lock().observe(transition.to) else {
            return 0;
        };

        let change = EffectChange {
            track: self.track,
            origin: self.origin,
            kind: self.store.kind().clone(),
            state,
            generation: transition.generation,
        };

        // Subscribers added or removed by callbacks only affect later rounds.
        let round = self.subscribers.lock().snapshot();
        let view = EffectHandle {
            shared: Arc::clone(self),
        };
        for subscriber in &round {
            subscriber(&view, &change);
        }
        trace!(track = %self.track, kind = %change.kind, delivered = round.len(), "notification round complete");
        round.len()
    }
}

/// Per-track observable effect state
pub struct EffectHandle {
    shared: Arc<HandleShared>,
}

impl EffectHandle {
    /// Create a handle for `track` over `store`, primed with its current state
    pub fn attach(store: &Arc<EffectStateStore>, track: TrackId, origin: OriginId) -> Self {
        let shared = store.attach(|state| {
            Arc::new(HandleShared {
                track,
                origin,
                store: Arc::clone(store),
                notifier: Mutex::new(ChangeNotifier::primed(state)),
                subscribers: Mutex::new(SubscriberList::default()),
            })
        });
        debug!(track = %track, origin = %origin, kind = %store.kind(), "effect handle created");
        EffectHandle { shared }
    }

    /// Current effect state, read from the shared store
    #[inline]
    pub fn state(&self) -> EffectState {
        self.shared.store.get()
    }

    pub fn info(&self) -> EffectInfo {
        EffectInfo::new(self.state())
    }

    pub fn kind(&self) -> &EffectKind {
        self.shared.store.kind()
    }

    pub fn track(&self) -> TrackId {
        self.shared.track
    }

    pub fn origin(&self) -> OriginId {
        self.shared.origin
    }

    /// The store this handle views
    pub fn store(&self) -> &Arc<EffectStateStore> {
        &self.shared.store
    }

    /// Register a callback for future transitions
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&EffectHandle, &EffectChange) + Send + Sync + 'static,
    {
        self.subscribe_shared(Arc::new(callback))
    }

    pub fn subscribe_shared(&self, subscriber: Subscriber) -> SubscriptionId {
        let id = self.shared.subscribers.lock().add(subscriber);
        debug!(track = %self.shared.track, subscription = ?id, "subscribed");
        id
    }

    /// Remove a subscription. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self.shared.subscribers.lock().remove(id);
        if removed {
            debug!(track = %self.shared.track, subscription = ?id, "unsubscribed");
        }
        removed
    }

    pub fn subscriber_count(&self) -> usize {
        self.shared.subscribers.lock().len()
    }

    /// Number of transitions delivered to this handle
    pub fn transitions_seen(&self) -> u64 {
        self.shared.notifier.lock().fired()
    }
}

impl fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectHandle")
            .field("track", &self.shared.track)
            .field("origin", &self.shared.origin)
            .field("kind", self.kind())
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use camfx_core::DeviceId;
    use parking_lot::Mutex as PlMutex;

    use crate::EffectWriter;

    fn setup(initial: EffectState) -> (Arc<EffectStateStore>, EffectWriter, EffectHandle) {
        let (store, writer) = EffectStateStore::create(DeviceId::new(1), EffectKind::BackgroundBlur, initial);
        let handle = EffectHandle::attach(&store, TrackId::new(1), OriginId::new(1));
        (store, writer, handle)
    }

    #[test]
    fn test_handle_reads_store() {
        let (_store, mut writer, handle) = setup(EffectState::Disabled);
        assert_eq!(handle.state(), EffectState::Disabled);
        writer.set(EffectState::Enabled);
        assert_eq!(handle.state(), EffectState::Enabled);
        assert!(handle.info().is_enabled());
    }

    #[test]
    fn test_idempotent_set_does_not_notify() {
        let (_store, mut writer, handle) = setup(EffectState::Disabled);
        let calls = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&calls);
        handle.subscribe(move |_, _| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        writer.set(EffectState::Disabled);
        writer.set(EffectState::Disabled);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_exactly_once_in_registration_order() {
        let (_store, mut writer, handle) = setup(EffectState::Disabled);
        let log = Arc::new(PlMutex::new(Vec::new()));

        for i in 0..4 {
            let log = Arc::clone(&log);
            handle.subscribe(move |h, change| {
                assert_eq!(change.state, EffectState::Enabled);
                assert_eq!(h.state(), EffectState::Enabled);
                log.lock().push(i);
            });
        }

        writer.set(EffectState::Enabled);
        assert_eq!(*log.lock(), vec![0, 1, 2, 3]);
        assert_eq!(handle.transitions_seen(), 1);
    }

    #[test]
    fn test_self_unsubscribe_during_round() {
        let (_store, mut writer, handle) = setup(EffectState::Disabled);
        let calls = Arc::new(AtomicUsize::new(0));
        let own_id = Arc::new(PlMutex::new(None::<SubscriptionId>));

        let own = Arc::clone(&own_id);
        let c = Arc::clone(&calls);
        let id = handle.subscribe(move |h, _| {
            c.fetch_add(1, Ordering::SeqCst);
            if let Some(id) = *own.lock() {
                assert!(h.unsubscribe(id));
            }
        });
        *own_id.lock() = Some(id);

        let c = Arc::clone(&calls);
        handle.subscribe(move |_, _| {
            c.fetch_add(10, Ordering::SeqCst);
        });

        writer.set(EffectState::Enabled);
        assert_eq!(calls.load(Ordering::SeqCst), 11);
        assert_eq!(handle.subscriber_count(), 1);

        writer.set(EffectState::Disabled);
        assert_eq!(calls.load(Ordering::SeqCst), 21);
    }

    #[test]
    fn test_unsubscribing_a_later_subscriber_mid_round_still_delivers() {
        let (_store, mut writer, handle) = setup(EffectState::Disabled);
        let second_calls = Arc::new(AtomicUsize::new(0));
        let second_id = Arc::new(PlMutex::new(None::<SubscriptionId>));

        let target = Arc::clone(&second_id);
        handle.subscribe(move |h, _| {
            if let Some(id) = target.lock().take() {
                h.unsubscribe(id);
            }
        });
        let c = Arc::clone(&second_calls);
        let id = handle.subscribe(move |_, _| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        *second_id.lock() = Some(id);

        writer.set(EffectState::Enabled);
        assert_eq!(second_calls.load(Ordering::SeqCst), 1);

        writer.set(EffectState::Disabled);
        assert_eq!(second_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_subscriber_added_during_round_waits_for_next_transition() {
        let (_store, mut writer, handle) = setup(EffectState::Disabled);
        let late_calls = Arc::new(AtomicUsize::new(0));
        let added = Arc::new(AtomicUsize::new(0));

        let late = Arc::clone(&late_calls);
        let added_flag = Arc::clone(&added);
        handle.subscribe(move |h, _| {
            if added_flag.fetch_add(1, Ordering::SeqCst) == 0 {
                let late = Arc::clone(&late);
                h.subscribe(move |_, change| {
                    assert_eq!(change.state, EffectState::Disabled);
                    late.fetch_add(1, Ordering::SeqCst);
                });
            }
        });

        writer.set(EffectState::Enabled);
        assert_eq!(late_calls.load(Ordering::SeqCst), 0);
        assert_eq!(handle.subscriber_count(), 2);

        writer.set(EffectState::Disabled);
        assert_eq!(late_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_change_payload() {
        let (_store, mut writer, handle) = setup(EffectState::Enabled);
        let seen = Arc::new(PlMutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        handle.subscribe(move |_, change| s.lock().push(change.clone()));

        writer.set(EffectState::Disabled);
        let seen = seen.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].track, TrackId::new(1));
        assert_eq!(seen[0].kind, EffectKind::BackgroundBlur);
        assert_eq!(seen[0].state, EffectState::Disabled);
        assert_eq!(seen[0].generation, 1);
    }

    #[test]
    fn test_dropped_handle_is_pruned() {
        let (store, mut writer, handle) = setup(EffectState::Disabled);
        let calls = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&calls);
        handle.subscribe(move |_, _| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(store.attached_handles(), 1);

        drop(handle);
        assert_eq!(store.attached_handles(), 0);
        writer.set(EffectState::Enabled);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_handles_on_shared_store_are_independent() {
        let (store, mut writer, first) = setup(EffectState::Disabled);
        let second = EffectHandle::attach(&store, TrackId::new(2), OriginId::new(2));

        let first_calls = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&first_calls);
        first.subscribe(move |_, _| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        writer.set(EffectState::Enabled);
        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second.state(), EffectState::Enabled);
        assert_eq!(second.transitions_seen(), 1);
        assert_eq!(second.subscriber_count(), 0);
    }

    #[test]
    fn test_handles_notified_in_attach_order() {
        let (store, mut writer) = EffectStateStore::create(DeviceId::new(1), EffectKind::BackgroundBlur, EffectState::Disabled);
        let log = Arc::new(PlMutex::new(Vec::new()));
        let late: Arc<PlMutex<Option<EffectHandle>>> = Arc::new(PlMutex::new(None));

        let handles: Vec<EffectHandle> = (1..=3)
            .map(|i| EffectHandle::attach(&store, TrackId::new(i), OriginId::new(i)))
            .collect();
        for handle in &handles {
            let log = Arc::clone(&log);
            let late = Arc::clone(&late);
            let store = Arc::clone(&store);
            handle.subscribe(move |h, change| {
                log.lock().push((h.track(), change.generation));
                // The first handle attaches a fourth one during the first round
                let mut slot = late.lock();
                if h.track() == TrackId::new(1) && slot.is_none() {
                    let fourth = EffectHandle::attach(&store, TrackId::new(4), OriginId::new(4));
                    let log = Arc::clone(&log);
                    fourth.subscribe(move |h, change| {
                        log.lock().push((h.track(), change.generation));
                    });
                    *slot = Some(fourth);
                }
            });
        }

        writer.set(EffectState::Enabled);
        assert_eq!(
            *log.lock(),
            vec![(TrackId::new(1), 1), (TrackId::new(2), 1), (TrackId::new(3), 1)]
        );
        assert_eq!(store.attached_handles(), 4);

        log.lock().clear();
        writer.set(EffectState::Disabled);
        assert_eq!(
            *log.lock(),
            vec![
                (TrackId::new(1), 2),
                (TrackId::new(2), 2),
                (TrackId::new(3), 2),
                (TrackId::new(4), 2),
            ]
        );
    }
}
