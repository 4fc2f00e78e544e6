//! Effect state store - the single authoritative value for one
//! (camera device, effect) pair.
//!
//! Reads are open to everyone. Writes go through the [`EffectWriter`] created
//! together with the store, which is handed to the platform-effects
//! collaborator and cannot be cloned.

use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};

use camfx_core::{DeviceId, EffectKind, EffectState};

use crate::handle::HandleShared;

/// A state change accepted by a store
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    pub from: EffectState,
    pub to: EffectState,
    pub generation: u64,
}

#[derive(Debug)]
struct StoreCell {
    state: EffectState,
    generation: u64,
}

/// Authoritative effect state for one device
pub struct EffectStateStore {
    device: DeviceId,
    kind: EffectKind,
    cell: RwLock<StoreCell>,
    /// Handles viewing this store, in attach order. Non-owning.
    listeners: Mutex<Vec<Weak<HandleShared>>>,
}

impl EffectStateStore {
    /// Create a store and the only writer allowed to change it
    pub fn create(device: DeviceId, kind: EffectKind, initial: EffectState) -> (Arc<Self>, EffectWriter) {
        let store = Arc::new(EffectStateStore {
            device,
            kind,
            cell: RwLock::new(StoreCell {
                state: initial,
                generation: 0,
            }),
            listeners: Mutex::new(Vec::new()),
        });
        debug!(device = %device, kind = %store.kind, state = %initial, "effect store created");
        let writer = EffectWriter {
            store: Arc::clone(&store),
        };
        (store, writer)
    }

    pub fn device(&self) -> DeviceId {
        self.device
    }

    pub fn kind(&self) -> &EffectKind {
        &self.kind
    }

    /// Current state
    #[inline]
    pub fn get(&self) -> EffectState {
        self.cell.read().state
    }

    /// Number of transitions applied so far
    pub fn generation(&self) -> u64 {
        self.cell.read().generation
    }

    /// State and generation read together
    pub fn snapshot(&self) -> (EffectState, u64) {
        let cell = self.cell.read();
        (cell.state, cell.generation)
    }

    /// Number of live handles attached to this store
    pub fn attached_handles(&self) -> usize {
        self.listeners
            .lock()
            .iter()
            .filter(|w| w.strong_count() > 0)
            .count()
    }

    /// Attach a handle built from the current state.
    ///
    /// The read lock is held across building and attaching so a concurrent
    /// transition is either seen by the new handle or already reflected in
    /// the state it was primed with.
    pub(crate) fn attach<F>(&self, build: F) -> Arc<HandleShared>
    where
        F: FnOnce(EffectState) -> Arc<HandleShared>,
    {
        let cell = self.cell.read();
        let shared = build(cell.state);
        let mut listeners = self.listeners.lock();
        listeners.retain(|w| w.strong_count() > 0);
        listeners.push(Arc::downgrade(&shared));
        debug!(device = %self.device, kind = %self.kind, handles = listeners.len(), "handle attached");
        shared
    }

    fn apply(&self, new_state: EffectState) -> Option<Transition> {
        let (transition, targets) = {
            let mut cell = self.cell.write();
            if cell.state == new_state {
                debug!(device = %self.device, kind = %self.kind, state = %new_state, "set ignored, state unchanged");
                return None;
            }
            let transition = Transition {
                from: cell.state,
                to: new_state,
                generation: cell.generation + 1,
            };
            cell.state = new_state;
            cell.generation = transition.generation;

            // Taken under the write lock so the update and the set of
            // handles to notify form one unit.
            let mut listeners = self.listeners.lock();
            let before = listeners.len();
            listeners.retain(|w| w.strong_count() > 0);
            if listeners.len() != before {
                debug!(device = %self.device, kind = %self.kind, pruned = before - listeners.len(), "dropped handles pruned");
            }
            let targets: Vec<Arc<HandleShared>> = listeners.iter().filter_map(Weak::upgrade).collect();
            (transition, targets)
        };

        info!(
            device = %self.device,
            kind = %self.kind,
            from = %transition.from,
            to = %transition.to,
            generation = transition.generation,
            handles = targets.len(),
            "effect state transition"
        );

        for handle in &targets {
            handle.deliver(&transition);
        }
        Some(transition)
    }
}

impl std::fmt::Debug for EffectStateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (state, generation) = self.snapshot();
        f.debug_struct("EffectStateStore")
            .field("device", &self.device)
            .field("kind", &self.kind)
            .field("state", &state)
            .field("generation", &generation)
            .finish()
    }
}

/// Exclusive write access to one store.
///
/// Owned by the platform-effects collaborator. `set` takes `&mut self`, so
/// writes to a store are serialized by construction.
#[derive(Debug)]
pub struct EffectWriter {
    store: Arc<EffectStateStore>,
}

impl EffectWriter {
    /// Report a new platform state.
    ///
    /// Returns `true` if this was a transition. Setting the current value is
    /// a no-op and notifies nobody.
    pub fn set(&mut self, new_state: EffectState) -> bool {
        self.store.apply(new_state).is_some()
    }

    /// Like [`set`](Self::set) but returns the accepted transition
    pub fn transition(&mut self, new_state: EffectState) -> Option<Transition> {
        self.store.apply(new_state)
    }

    pub fn get(&self) -> EffectState {
        self.store.get()
    }

    pub fn store(&self) -> &Arc<EffectStateStore> {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blur_store(initial: EffectState) -> (Arc<EffectStateStore>, EffectWriter) {
        EffectStateStore::create(DeviceId::new(1), EffectKind::BackgroundBlur, initial)
    }

    #[test]
    fn test_get_returns_initial() {
        let (store, _writer) = blur_store(EffectState::Enabled);
        assert_eq!(store.get(), EffectState::Enabled);
        assert_eq!(store.generation(), 0);
    }

    #[test]
    fn test_set_same_value_is_noop() {
        let (store, mut writer) = blur_store(EffectState::Disabled);
        assert!(!writer.set(EffectState::Disabled));
        assert_eq!(store.generation(), 0);
    }

    #[test]
    fn test_set_new_value_bumps_generation() {
        let (store, mut writer) = blur_store(EffectState::Disabled);
        let t = writer.transition(EffectState::Enabled).unwrap();
        assert_eq!(t.from, EffectState::Disabled);
        assert_eq!(t.to, EffectState::Enabled);
        assert_eq!(t.generation, 1);
        assert_eq!(store.snapshot(), (EffectState::Enabled, 1));
        assert!(writer.set(EffectState::Disabled));
        assert_eq!(store.generation(), 2);
    }

    #[test]
    fn test_writer_and_store_agree() {
        let (store, mut writer) = blur_store(EffectState::Disabled);
        writer.set(EffectState::Enabled);
        assert_eq!(writer.get(), store.get());
        assert!(Arc::ptr_eq(writer.store(), &store));
    }
}
