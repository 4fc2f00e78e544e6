//! Camera track
//!
//! A track owns one handle per effect its camera reports, plus the tagger
//! that stamps its frames. Both read the same stores, so a frame and the
//! handle can never disagree about the state at capture time.

use tracing::info;

use camfx_core::{CaptureTime, DeviceId, EffectKind, EffectMap, OriginId, TrackId};
use camfx_state::{DeviceEffects, EffectHandle, EffectHandles};

use crate::{Frame, FrameTagger, RawFrame};

/// Track lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackState {
    Live,
    Ended,
}

/// A live camera track handed to one origin
#[derive(Debug)]
pub struct CameraTrack {
    id: TrackId,
    device: DeviceId,
    origin: OriginId,
    handles: EffectHandles,
    tagger: FrameTagger,
    state: TrackState,
    frames_captured: u64,
}

impl CameraTrack {
    /// Open a track on a camera for an origin
    pub fn open(id: TrackId, origin: OriginId, device: &DeviceEffects) -> Self {
        let handles = device.open_handles(id, origin);
        let track = CameraTrack::with_handles(id, device.device(), origin, handles);
        info!(track = %id, device = %track.device, origin = %origin, effects = track.handles.len(), "track opened");
        track
    }

    fn with_handles(id: TrackId, device: DeviceId, origin: OriginId, handles: EffectHandles) -> Self {
        let tagger = FrameTagger::new(id, handles.stores());
        CameraTrack {
            id,
            device,
            origin,
            handles,
            tagger,
            state: TrackState::Live,
            frames_captured: 0,
        }
    }

    pub fn id(&self) -> TrackId {
        self.id
    }

    pub fn device(&self) -> DeviceId {
        self.device
    }

    pub fn origin(&self) -> OriginId {
        self.origin
    }

    pub fn state(&self) -> TrackState {
        self.state
    }

    pub fn is_live(&self) -> bool {
        self.state == TrackState::Live
    }

    pub fn frames_captured(&self) -> u64 {
        self.frames_captured
    }

    /// Handle for an effect; `None` means the effect is unsupported
    pub fn effect(&self, kind: &EffectKind) -> Option<&EffectHandle> {
        self.handles.get(kind)
    }

    pub fn background_blur(&self) -> Option<&EffectHandle> {
        self.handles.background_blur()
    }

    /// Effects this track reports
    pub fn capabilities(&self) -> Vec<EffectKind> {
        self.handles.kinds().cloned().collect()
    }

    /// Current state of each available effect
    pub fn settings(&self) -> EffectMap {
        self.handles.settings()
    }

    /// Capture a frame. Ended tracks produce nothing.
    pub fn capture(&mut self, raw: RawFrame) -> Option<Frame> {
        if !self.is_live() {
            return None;
        }
        self.frames_captured += 1;
        Some(self.tagger.tag(raw))
    }

    /// Convenience for [`capture`](Self::capture) from a payload and time
    pub fn capture_payload(&mut self, payload: impl Into<bytes::Bytes>, at: CaptureTime) -> Option<Frame> {
        self.capture(RawFrame::new(payload, at))
    }

    /// New track on the same camera and origin with its own handles.
    ///
    /// Subscribers are not carried over.
    pub fn clone_track(&self, id: TrackId) -> CameraTrack {
        let handles = self
            .handles
            .iter()
            .map(|(kind, handle)| (kind.clone(), EffectHandle::attach(handle.store(), id, self.origin)))
            .collect();
        let mut track = CameraTrack::with_handles(id, self.device, self.origin, handles);
        track.state = self.state;
        info!(track = %id, source = %self.id, "track cloned");
        track
    }

    /// End the track. Its handles are destroyed and stop receiving changes.
    pub fn stop(&mut self) {
        if self.state == TrackState::Ended {
            return;
        }
        self.state = TrackState::Ended;
        self.handles = EffectHandles::none();
        self.tagger.clear_sources();
        info!(track = %self.id, frames = self.frames_captured, "track stopped");
    }
}
