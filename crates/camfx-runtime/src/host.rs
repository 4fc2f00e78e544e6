//! Effects host - wires cameras, the platform bridge and open tracks

use std::collections::HashMap;

use tracing::info;

use camfx_core::{CamfxError, CamfxResult, DeviceId, EffectMap, OriginId, TrackId};
use camfx_media::{CameraTrack, Frame, RawFrame};
use camfx_state::{DeviceEffects, EffectRegistry};

use crate::{BatchOutcome, DeviceConfig, PlatformBridge, PlatformReport, RuntimeConfig};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RuntimeStats {
    pub devices: u64,
    pub tracks_opened: u64,
    pub tracks_stopped: u64,
    pub reports: u64,
    pub reports_coalesced: u64,
    pub transitions: u64,
    pub frames_captured: u64,
}

/// Host for camera effect observation
#[derive(Debug, Default)]
pub struct EffectsHost {
    registry: EffectRegistry,
    platform: PlatformBridge,
    tracks: HashMap<TrackId, CameraTrack>,
    next_track: u64,
    stats: RuntimeStats,
}

impl EffectsHost {
    pub fn new() -> Self {
        EffectsHost::default()
    }

    /// Build a host with every configured camera registered
    pub fn from_config(config: &RuntimeConfig) -> CamfxResult<Self> {
        config.validate()?;
        let mut host = EffectsHost::new();
        for device in &config.devices {
            host.add_device(device)?;
        }
        Ok(host)
    }

    /// Register a camera and hand its writers to the platform bridge
    pub fn add_device(&mut self, config: &DeviceConfig) -> CamfxResult<()> {
        if self.registry.contains(config.id) {
            return Err(CamfxError::DuplicateDevice(config.id));
        }

        let mut effects = DeviceEffects::new(config.id);
        let mut writers = Vec::with_capacity(config.effects.len());
        for effect in &config.effects {
            let writer = effects.add_effect(effect.kind.clone(), effect.initial).ok_or_else(|| {
                CamfxError::Config(format!("effect {} listed twice for device {}", effect.kind, config.id))
            })?;
            writers.push(writer);
        }

        for writer in writers {
            self.platform.adopt(writer);
        }
        self.registry.register(effects);
        self.stats.devices += 1;
        info!(
            device = %config.id,
            label = config.label.as_deref().unwrap_or(""),
            effects = config.effects.len(),
            "camera added"
        );
        Ok(())
    }

    /// Remove a camera. Open tracks on it are stopped.
    pub fn remove_device(&mut self, device: DeviceId) -> CamfxResult<()> {
        if self.registry.remove(device).is_none() {
            return Err(CamfxError::UnknownDevice(device));
        }
        self.platform.release_device(device);

        let doomed: Vec<TrackId> = self
            .tracks
            .values()
            .filter(|t| t.device() == device)
            .map(|t| t.id())
            .collect();
        for id in doomed {
            self.stop_track(id)?;
        }
        info!(device = %device, "camera removed");
        Ok(())
    }

    pub fn device(&self, device: DeviceId) -> Option<&DeviceEffects> {
        self.registry.get(device)
    }

    /// Current effect settings of a camera
    pub fn device_settings(&self, device: DeviceId) -> CamfxResult<EffectMap> {
        self.registry
            .get(device)
            .map(DeviceEffects::settings)
            .ok_or(CamfxError::UnknownDevice(device))
    }

    /// Open a new track on a camera for an origin
    pub fn open_track(&mut self, device: DeviceId, origin: OriginId) -> CamfxResult<TrackId> {
        let effects = self.registry.get(device).ok_or(CamfxError::UnknownDevice(device))?;
        let id = TrackId::new(self.next_track + 1);
        let track = CameraTrack::open(id, origin, effects);
        self.next_track += 1;
        self.tracks.insert(id, track);
        self.stats.tracks_opened += 1;
        Ok(id)
    }

    /// Clone an open track. The clone has its own, empty subscriber lists.
    pub fn clone_track(&mut self, source: TrackId) -> CamfxResult<TrackId> {
        let id = TrackId::new(self.next_track + 1);
        let clone = self
            .tracks
            .get(&source)
            .ok_or(CamfxError::UnknownTrack(source))?
            .clone_track(id);
        self.next_track += 1;
        self.tracks.insert(id, clone);
        self.stats.tracks_opened += 1;
        Ok(id)
    }

    /// Stop and destroy a track
    pub fn stop_track(&mut self, id: TrackId) -> CamfxResult<()> {
        let mut track = self.tracks.remove(&id).ok_or(CamfxError::UnknownTrack(id))?;
        track.stop();
        self.stats.tracks_stopped += 1;
        Ok(())
    }

    pub fn track(&self, id: TrackId) -> Option<&CameraTrack> {
        self.tracks.get(&id)
    }

    pub fn track_mut(&mut self, id: TrackId) -> Option<&mut CameraTrack> {
        self.tracks.get_mut(&id)
    }

    /// Hand a track over to another owner, e.g. a capture thread
    pub fn take_track(&mut self, id: TrackId) -> CamfxResult<CameraTrack> {
        self.tracks.remove(&id).ok_or(CamfxError::UnknownTrack(id))
    }

    pub fn track_ids(&self) -> Vec<TrackId> {
        let mut ids: Vec<_> = self.tracks.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Capture a frame on a track
    pub fn capture(&mut self, id: TrackId, raw: RawFrame) -> CamfxResult<Option<Frame>> {
        let track = self.tracks.get_mut(&id).ok_or(CamfxError::UnknownTrack(id))?;
        let frame = track.capture(raw);
        if frame.is_some() {
            self.stats.frames_captured += 1;
        }
        Ok(frame)
    }

    /// Apply one platform reading. Rejected readings are not counted.
    pub fn report(&mut self, report: &PlatformReport) -> CamfxResult<bool> {
        let changed = self.platform.report(report)?;
        self.stats.reports += 1;
        if changed {
            self.stats.transitions += 1;
        }
        Ok(changed)
    }

    /// Apply a burst of platform readings with coalescing
    pub fn report_batch<I>(&mut self, reports: I) -> CamfxResult<BatchOutcome>
    where
        I: IntoIterator<Item = PlatformReport>,
    {
        let outcome = self.platform.report_batch(reports)?;
        self.stats.reports += (outcome.applied + outcome.coalesced) as u64;
        self.stats.reports_coalesced += outcome.coalesced as u64;
        self.stats.transitions += outcome.transitions as u64;
        Ok(outcome)
    }

    pub fn stats(&self) -> &RuntimeStats {
        &self.stats
    }
}
