//! Frames and per-frame metadata
//!
//! A [`RawFrame`] is what the capture pipeline hands over. It only becomes a
//! [`Frame`], the type consumers see, after the tagger has sealed its
//! metadata. Nothing on a `Frame` can be changed afterwards.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use camfx_core::{CaptureTime, EffectInfo, EffectKind, EffectMap, FrameSeq, TrackId};

/// Untagged frame from the capture pipeline
#[derive(Clone, Debug)]
pub struct RawFrame {
    pub payload: Bytes,
    pub captured_at: CaptureTime,
}

impl RawFrame {
    pub fn new(payload: impl Into<Bytes>, captured_at: CaptureTime) -> Self {
        RawFrame {
            payload: payload.into(),
            captured_at,
        }
    }

    /// Frame with no payload, for tests and probes
    pub fn empty(captured_at: CaptureTime) -> Self {
        RawFrame::new(Bytes::new(), captured_at)
    }
}

/// Metadata attached to a frame at capture time
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameMetadata {
    effects: EffectMap,
}

impl FrameMetadata {
    pub(crate) fn from_effects(effects: EffectMap) -> Self {
        FrameMetadata { effects }
    }

    /// `backgroundBlur` field; `None` when the effect is unsupported
    pub fn background_blur(&self) -> Option<EffectInfo> {
        self.effects.background_blur()
    }

    pub fn effect(&self, kind: &EffectKind) -> Option<EffectInfo> {
        self.effects.get(kind)
    }

    pub fn effects(&self) -> &EffectMap {
        &self.effects
    }
}

/// A captured, tagged, immutable video frame
#[derive(Clone, Debug)]
pub struct Frame {
    track: TrackId,
    seq: FrameSeq,
    captured_at: CaptureTime,
    payload: Bytes,
    metadata: FrameMetadata,
}

impl Frame {
    pub(crate) fn seal(track: TrackId, seq: FrameSeq, raw: RawFrame, metadata: FrameMetadata) -> Self {
        Frame {
            track,
            seq,
            captured_at: raw.captured_at,
            payload: raw.payload,
            metadata,
        }
    }

    pub fn track(&self) -> TrackId {
        self.track
    }

    pub fn seq(&self) -> FrameSeq {
        self.seq
    }

    pub fn captured_at(&self) -> CaptureTime {
        self.captured_at
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    pub fn metadata(&self) -> &FrameMetadata {
        &self.metadata
    }

    /// Shorthand for `metadata().background_blur()`
    pub fn background_blur(&self) -> Option<EffectInfo> {
        self.metadata.background_blur()
    }
}
