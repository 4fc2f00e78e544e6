//! Change notifier state machine and subscriber list
//!
//! ```text
//! Uninitialized --prime(s)--> Disabled | Enabled
//! Disabled <--observe(new != old)--> Enabled
//! ```
//!
//! `Uninitialized` is never observable from outside a handle: it only keeps
//! the first observed value from being reported as a transition.

use std::sync::Arc;

use camfx_core::{EffectKind, EffectState, OriginId, SubscriptionId, TrackId};

use crate::EffectHandle;

/// Notifier phase
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum NotifierPhase {
    #[default]
    Uninitialized,
    Disabled,
    Enabled,
}

impl From<EffectState> for NotifierPhase {
    fn from(state: EffectState) -> Self {
        match state {
            EffectState::Disabled => NotifierPhase::Disabled,
            EffectState::Enabled => NotifierPhase::Enabled,
        }
    }
}

impl NotifierPhase {
    /// The effect state this phase stands for, if initialized
    pub fn state(self) -> Option<EffectState> {
        match self {
            NotifierPhase::Uninitialized => None,
            NotifierPhase::Disabled => Some(EffectState::Disabled),
            NotifierPhase::Enabled => Some(EffectState::Enabled),
        }
    }
}

/// Detects transitions for one handle
#[derive(Debug, Default)]
pub struct ChangeNotifier {
    phase: NotifierPhase,
    fired: u64,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        ChangeNotifier::default()
    }

    /// Create a notifier already holding the platform-reported state
    pub fn primed(state: EffectState) -> Self {
        let mut notifier = ChangeNotifier::new();
        notifier.prime(state);
        notifier
    }

    /// Set the initial state without emitting a transition
    pub fn prime(&mut self, state: EffectState) {
        self.phase = state.into();
    }

    /// Feed a new value. Returns the new state when it is a real transition.
    ///
    /// The first value seen by an uninitialized notifier primes it silently.
    pub fn observe(&mut self, state: EffectState) -> Option<EffectState> {
        let next = NotifierPhase::from(state);
        match self.phase {
            NotifierPhase::Uninitialized => {
                self.phase = next;
                None
            }
            current if current == next => None,
            _ => {
                self.phase = next;
                self.fired += 1;
                Some(state)
            }
        }
    }

    pub fn phase(&self) -> NotifierPhase {
        self.phase
    }

    /// Number of transitions this notifier has fired
    pub fn fired(&self) -> u64 {
        self.fired
    }
}

/// Payload delivered to subscribers on a transition
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EffectChange {
    pub track: TrackId,
    pub origin: OriginId,
    pub kind: EffectKind,
    /// The new state
    pub state: EffectState,
    /// Store generation that produced this change
    pub generation: u64,
}

/// Subscriber callback.
///
/// Receives the handle being notified, so it may read `state()`, subscribe or
/// unsubscribe while the round is running.
pub type Subscriber = Arc<dyn Fn(&EffectHandle, &EffectChange) + Send + Sync>;

/// Ordered subscriber list
#[derive(Default)]
pub(crate) struct SubscriberList {
    next_id: u64,
    entries: Vec<(SubscriptionId, Subscriber)>,
}

impl SubscriberList {
    pub(crate) fn add(&mut self, subscriber: Subscriber) -> SubscriptionId {
        let id = SubscriptionId::new(self.next_id);
        self.next_id += 1;
        self.entries.push((id, subscriber));
        id
    }

    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(sid, _)| *sid != id);
        self.entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Copy of the list taken at the start of a delivery round
    pub(crate) fn snapshot(&self) -> Vec<Subscriber> {
        self.entries.iter().map(|(_, s)| Arc::clone(s)).collect()
    }
}
