//! Frame tagger - seals each frame with the effect states at capture time

use std::sync::Arc;

use tracing::trace;

use camfx_core::{EffectInfo, EffectMap, FrameSeq, TrackId};
use camfx_state::EffectStateStore;

use crate::{Frame, FrameMetadata, RawFrame};

/// Stamps frames for one track.
///
/// Every source store is read exactly once per frame. A store that is not
/// listed leaves its field absent in the metadata.
#[derive(Clone, Debug)]
pub struct FrameTagger {
    track: TrackId,
    sources: Vec<Arc<EffectStateStore>>,
    next_seq: FrameSeq,
}

impl FrameTagger {
    pub fn new(track: TrackId, sources: Vec<Arc<EffectStateStore>>) -> Self {
        FrameTagger {
            track,
            sources,
            next_seq: FrameSeq::ZERO,
        }
    }

    /// Tagger for a single effect store
    pub fn for_store(track: TrackId, store: Arc<EffectStateStore>) -> Self {
        FrameTagger::new(track, vec![store])
    }

    /// Tagger with no effect sources; frames carry empty metadata
    pub fn unsupported(track: TrackId) -> Self {
        FrameTagger::new(track, Vec::new())
    }

    pub fn track(&self) -> TrackId {
        self.track
    }

    /// Sequence number the next frame will get
    pub fn next_seq(&self) -> FrameSeq {
        self.next_seq
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    pub(crate) fn clear_sources(&mut self) {
        self.sources.clear();
    }

    /// Read the current metadata, one `get` per source
    pub fn snapshot(&self) -> FrameMetadata {
        let effects: EffectMap = self
            .sources
            .iter()
            .map(|store| (store.kind().clone(), EffectInfo::new(store.get())))
            .collect();
        FrameMetadata::from_effects(effects)
    }

    /// Tag a raw frame and assign it the next sequence number
    pub fn tag(&mut self, raw: RawFrame) -> Frame {
        let metadata = self.snapshot();
        let seq = self.next_seq;
        self.next_seq = seq.next();
        trace!(
            track = %self.track,
            seq = seq.0,
            blur = ?metadata.background_blur().map(|info| info.state),
            "frame tagged"
        );
        Frame::seal(self.track, seq, raw, metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use camfx_core::{CaptureTime, DeviceId, EffectKind, EffectState};

    #[test]
    fn test_consistency_around_a_transition() {
        let (store, mut writer) =
            EffectStateStore::create(DeviceId::new(1), EffectKind::BackgroundBlur, EffectState::Disabled);
        let mut tagger = FrameTagger::for_store(TrackId::new(1), store);

        let frame_a = tagger.tag(RawFrame::empty(CaptureTime::from_millis(0)));
        writer.set(EffectState::Enabled);
        let frame_b = tagger.tag(RawFrame::empty(CaptureTime::from_millis(33)));

        assert_eq!(frame_a.background_blur().unwrap().state, EffectState::Disabled);
        assert_eq!(frame_b.background_blur().unwrap().state, EffectState::Enabled);
    }

    #[test]
    fn test_tagged_metadata_does_not_follow_later_sets() {
        let (store, mut writer) =
            EffectStateStore::create(DeviceId::new(1), EffectKind::BackgroundBlur, EffectState::Enabled);
        let mut tagger = FrameTagger::for_store(TrackId::new(1), store);

        let frame = tagger.tag(RawFrame::empty(CaptureTime::ZERO));
        writer.set(EffectState::Disabled);
        writer.set(EffectState::Enabled);
        writer.set(EffectState::Disabled);

        assert_eq!(frame.background_blur().unwrap().state, EffectState::Enabled);
    }

    #[test]
    fn test_unsupported_leaves_field_absent() {
        let mut tagger = FrameTagger::unsupported(TrackId::new(2));
        let frame = tagger.tag(RawFrame::empty(CaptureTime::ZERO));
        assert!(frame.background_blur().is_none());
        assert!(frame.metadata().effects().is_empty());
    }

    #[test]
    fn test_sequence_numbers_increase() {
        let mut tagger = FrameTagger::unsupported(TrackId::new(1));
        let a = tagger.tag(RawFrame::empty(CaptureTime::ZERO));
        let b = tagger.tag(RawFrame::empty(CaptureTime::from_millis(33)));
        assert_eq!(a.seq(), FrameSeq::ZERO);
        assert_eq!(b.seq(), FrameSeq::new(1));
        assert_eq!(tagger.next_seq(), FrameSeq::new(2));
    }

    #[test]
    fn test_other_effects_are_tagged_by_name() {
        let framing = EffectKind::named("faceFraming").unwrap();
        let (blur, _w1) =
            EffectStateStore::create(DeviceId::new(1), EffectKind::BackgroundBlur, EffectState::Disabled);
        let (face, _w2) = EffectStateStore::create(DeviceId::new(1), framing.clone(), EffectState::Enabled);
        let mut tagger = FrameTagger::new(TrackId::new(1), vec![blur, face]);

        let frame = tagger.tag(RawFrame::empty(CaptureTime::ZERO));
        assert_eq!(frame.metadata().effects().len(), 2);
        assert_eq!(frame.metadata().effect(&framing), Some(EffectInfo::new(EffectState::Enabled)));
    }
}
