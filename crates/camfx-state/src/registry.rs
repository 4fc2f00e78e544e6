//! Effect registry - stores keyed by physical camera
//!
//! Blur is a property of the camera, not of the page using it, so every
//! (device, effect) pair has exactly one store. Tracks opened by different
//! origins get their own handles, all viewing that one store.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::debug;

use camfx_core::{DeviceId, EffectInfo, EffectKind, EffectMap, EffectState, OriginId, TrackId};

use crate::{EffectHandle, EffectStateStore, EffectWriter};

/// Effects available on one camera
#[derive(Debug)]
pub struct DeviceEffects {
    device: DeviceId,
    stores: BTreeMap<EffectKind, Arc<EffectStateStore>>,
}

impl DeviceEffects {
    pub fn new(device: DeviceId) -> Self {
        DeviceEffects {
            device,
            stores: BTreeMap::new(),
        }
    }

    pub fn device(&self) -> DeviceId {
        self.device
    }

    /// Declare an effect as available and get its writer.
    ///
    /// Returns `None` if the effect is already declared; the existing writer
    /// stays the only one.
    pub fn add_effect(&mut self, kind: EffectKind, initial: EffectState) -> Option<EffectWriter> {
        if self.stores.contains_key(&kind) {
            return None;
        }
        let (store, writer) = EffectStateStore::create(self.device, kind.clone(), initial);
        self.stores.insert(kind, store);
        Some(writer)
    }

    /// Store for an effect, if the platform reports it on this camera
    pub fn store(&self, kind: &EffectKind) -> Option<&Arc<EffectStateStore>> {
        self.stores.get(kind)
    }

    pub fn supports(&self, kind: &EffectKind) -> bool {
        self.stores.contains_key(kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &EffectKind> {
        self.stores.keys()
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }

    /// Create the handles for a new track on this camera
    pub fn open_handles(&self, track: TrackId, origin: OriginId) -> EffectHandles {
        let handles = self
            .stores
            .iter()
            .map(|(kind, store)| (kind.clone(), EffectHandle::attach(store, track, origin)))
            .collect();
        EffectHandles { handles }
    }

    /// Current state of every available effect
    pub fn settings(&self) -> EffectMap {
        self.stores
            .iter()
            .map(|(kind, store)| (kind.clone(), EffectInfo::new(store.get())))
            .collect()
    }
}

/// The handles a track owns, one per available effect
#[derive(Debug, Default)]
pub struct EffectHandles {
    handles: BTreeMap<EffectKind, EffectHandle>,
}

impl EffectHandles {
    /// No effects available
    pub fn none() -> Self {
        EffectHandles::default()
    }

    pub fn get(&self, kind: &EffectKind) -> Option<&EffectHandle> {
        self.handles.get(kind)
    }

    pub fn background_blur(&self) -> Option<&EffectHandle> {
        self.get(&EffectKind::BackgroundBlur)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EffectKind, &EffectHandle)> {
        self.handles.iter()
    }

    pub fn kinds(&self) -> impl Iterator<Item = &EffectKind> {
        self.handles.keys()
    }

    /// Stores behind these handles, in effect order
    pub fn stores(&self) -> Vec<Arc<EffectStateStore>> {
        self.handles.values().map(|h| Arc::clone(h.store())).collect()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Current state of every handle
    pub fn settings(&self) -> EffectMap {
        self.handles
            .iter()
            .map(|(kind, handle)| (kind.clone(), handle.info()))
            .collect()
    }
}

impl FromIterator<(EffectKind, EffectHandle)> for EffectHandles {
    fn from_iter<I: IntoIterator<Item = (EffectKind, EffectHandle)>>(iter: I) -> Self {
        EffectHandles {
            handles: iter.into_iter().collect(),
        }
    }
}

/// All cameras known to the host
#[derive(Debug, Default)]
pub struct EffectRegistry {
    devices: HashMap<DeviceId, DeviceEffects>,
}

impl EffectRegistry {
    pub fn new() -> Self {
        EffectRegistry::default()
    }

    /// Register a camera. Returns `false` if it was already registered.
    pub fn register(&mut self, effects: DeviceEffects) -> bool {
        let device = effects.device();
        if self.devices.contains_key(&device) {
            return false;
        }
        debug!(device = %device, effects = effects.len(), "device registered");
        self.devices.insert(device, effects);
        true
    }

    pub fn get(&self, device: DeviceId) -> Option<&DeviceEffects> {
        self.devices.get(&device)
    }

    pub fn get_mut(&mut self, device: DeviceId) -> Option<&mut DeviceEffects> {
        self.devices.get_mut(&device)
    }

    pub fn remove(&mut self, device: DeviceId) -> Option<DeviceEffects> {
        self.devices.remove(&device)
    }

    pub fn contains(&self, device: DeviceId) -> bool {
        self.devices.contains_key(&device)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DeviceId, &DeviceEffects)> {
        self.devices.iter()
    }
}
