//! Property checks over recorded histories

use camfx_core::EffectState;
use camfx_media::Frame;

/// Collapse a sequence of sets into the transitions they should produce
pub fn expected_transitions(initial: EffectState, sets: &[EffectState]) -> Vec<EffectState> {
    let mut current = initial;
    let mut out = Vec::new();
    for &state in sets {
        if state != current {
            out.push(state);
            current = state;
        }
    }
    out
}

/// Final state after a sequence of sets
pub fn final_state(initial: EffectState, sets: &[EffectState]) -> EffectState {
    sets.last().copied().unwrap_or(initial)
}

/// Frame sequence numbers strictly increase
pub fn sequences_increase(frames: &[Frame]) -> bool {
    frames.windows(2).all(|w| w[0].seq() < w[1].seq())
}

/// Every frame carries a blur state from the given set of values the store held
pub fn frames_within(frames: &[Frame], held: &[EffectState]) -> bool {
    frames
        .iter()
        .all(|f| f.background_blur().map_or(false, |info| held.contains(&info.state)))
}
