//! Scenario simulator - random interleavings of platform sets, captures and
//! subscription changes, checked against a simple model.
//!
//! Checks:
//! - Idempotence: repeated sets never notify
//! - Determinism: every frame carries the state at capture time
//! - Exactly-once delivery per live subscriber per transition
//! - Stopped tracks receive nothing

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use camfx_core::{CaptureTime, DeviceId, EffectKind, EffectState, OriginId, SubscriptionId, TrackId};
use camfx_media::RawFrame;
use camfx_runtime::{DeviceConfig, EffectsHost, PlatformReport};

/// Scenario configuration
#[derive(Clone, Debug)]
pub struct ScenarioConfig {
    /// Number of steps to run
    pub steps: usize,
    /// Maximum tracks open at once
    pub max_tracks: usize,
    /// Probability a step is a platform set
    pub set_prob: f64,
    /// Probability a step is a capture
    pub capture_prob: f64,
    /// Probability a step changes subscriptions (the rest open/stop tracks)
    pub subscribe_prob: f64,
    /// Whether the camera supports blur at all
    pub blur_supported: bool,
    /// Random seed
    pub seed: u64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        ScenarioConfig {
            steps: 1000,
            max_tracks: 4,
            set_prob: 0.3,
            capture_prob: 0.4,
            subscribe_prob: 0.2,
            blur_supported: true,
            seed: 42,
        }
    }
}

impl ScenarioConfig {
    /// Short run for quick tests
    pub fn light() -> Self {
        ScenarioConfig {
            steps: 100,
            max_tracks: 2,
            ..ScenarioConfig::default()
        }
    }

    /// Long run with many tracks
    pub fn heavy() -> Self {
        ScenarioConfig {
            steps: 10_000,
            max_tracks: 8,
            ..ScenarioConfig::default()
        }
    }

    /// Camera that never reports blur
    pub fn unsupported() -> Self {
        ScenarioConfig {
            blur_supported: false,
            ..ScenarioConfig::light()
        }
    }
}

/// One step of a scenario
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScenarioOp {
    Set(EffectState),
    Capture { track: usize },
    Subscribe { track: usize },
    Unsubscribe { track: usize, slot: usize },
    OpenTrack,
    StopTrack { track: usize },
}

/// Invariant violation found while running
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Violation {
    /// Frame metadata differs from the model state at capture
    FrameMismatch {
        track: TrackId,
        expected: Option<EffectState>,
        actual: Option<EffectState>,
    },
    /// A subscriber was called a different number of times than expected
    DeliveryCount { track: TrackId, expected: u64, actual: u64 },
    /// Handle state differs from the model
    HandleMismatch { track: TrackId, expected: EffectState, actual: EffectState },
    /// Handle present on an unsupported camera, or missing on a supported one
    HandlePresence { track: TrackId },
    /// The host rejected an operation that should have succeeded
    HostRejected { op: &'static str, error: String },
}

/// Result of a scenario run
#[derive(Debug, Default)]
pub struct ScenarioResult {
    pub steps: usize,
    pub transitions: u64,
    pub idle_sets: u64,
    pub frames: u64,
    pub deliveries: u64,
    pub violations: Vec<Violation>,
}

impl ScenarioResult {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

struct ModelSubscriber {
    id: SubscriptionId,
    calls: Arc<AtomicU64>,
    expected: u64,
}

struct ModelTrack {
    id: TrackId,
    subscribers: Vec<ModelSubscriber>,
    /// Subscribers that were removed, with the count they must stay at
    retired: Vec<ModelSubscriber>,
}

/// Runs a scenario against a real host
pub struct ScenarioRunner {
    config: ScenarioConfig,
    rng: StdRng,
    host: EffectsHost,
    device: DeviceId,
    model_state: EffectState,
    tracks: Vec<ModelTrack>,
    stopped: Vec<ModelTrack>,
    next_origin: u64,
    clock: u64,
}

impl ScenarioRunner {
    pub fn new(config: ScenarioConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        let device = DeviceId::new(1);
        let mut device_config = DeviceConfig::new(device).with_label("simulated");
        if config.blur_supported {
            device_config = device_config.with_effect(EffectKind::BackgroundBlur, EffectState::Disabled);
        }

        let mut host = EffectsHost::new();
        host.add_device(&device_config).expect("fresh host accepts its only camera");

        ScenarioRunner {
            config,
            rng,
            host,
            device,
            model_state: EffectState::Disabled,
            tracks: Vec::new(),
            stopped: Vec::new(),
            next_origin: 1,
            clock: 0,
        }
    }

    pub fn host(&self) -> &EffectsHost {
        &self.host
    }

    /// Pick the next operation
    pub fn generate_op(&mut self) -> ScenarioOp {
        if self.tracks.is_empty() {
            return ScenarioOp::OpenTrack;
        }
        let track = self.rng.gen_range(0..self.tracks.len());
        let roll: f64 = self.rng.gen();

        if roll < self.config.set_prob {
            let state = if self.rng.gen_bool(0.5) {
                EffectState::Enabled
            } else {
                EffectState::Disabled
            };
            return ScenarioOp::Set(state);
        }
        let roll = roll - self.config.set_prob;
        if roll < self.config.capture_prob {
            return ScenarioOp::Capture { track };
        }
        let roll = roll - self.config.capture_prob;
        if roll < self.config.subscribe_prob {
            let count = self.tracks[track].subscribers.len();
            if count > 0 && self.rng.gen_bool(0.3) {
                let slot = self.rng.gen_range(0..count);
                return ScenarioOp::Unsubscribe { track, slot };
            }
            return ScenarioOp::Subscribe { track };
        }
        if self.tracks.len() < self.config.max_tracks && self.rng.gen_bool(0.7) {
            ScenarioOp::OpenTrack
        } else {
            ScenarioOp::StopTrack { track }
        }
    }

    /// Run all steps, then verify delivery counts
    pub fn run(&mut self) -> ScenarioResult {
        let mut result = ScenarioResult::default();
        for _ in 0..self.config.steps {
            let op = self.generate_op();
            self.apply(&op, &mut result);
            result.steps += 1;
        }
        self.verify_deliveries(&mut result);
        result
    }

    /// Apply one operation and check what can be checked immediately
    pub fn apply(&mut self, op: &ScenarioOp, result: &mut ScenarioResult) {
        match op {
            ScenarioOp::Set(state) => self.apply_set(*state, result),
            ScenarioOp::Capture { track } => self.apply_capture(*track, result),
            ScenarioOp::Subscribe { track } => self.apply_subscribe(*track),
            ScenarioOp::Unsubscribe { track, slot } => self.apply_unsubscribe(*track, *slot),
            ScenarioOp::OpenTrack => self.apply_open(result),
            ScenarioOp::StopTrack { track } => self.apply_stop(*track, result),
        }
    }

    fn apply_set(&mut self, state: EffectState, result: &mut ScenarioResult) {
        if !self.config.blur_supported {
            return;
        }
        let report = PlatformReport::background_blur(self.device, state);
        let changed = match self.host.report(&report) {
            Ok(changed) => changed,
            Err(e) => {
                result.violations.push(Violation::HostRejected {
                    op: "report",
                    error: e.to_string(),
                });
                return;
            }
        };
        if changed {
            self.model_state = state;
            result.transitions += 1;
            for track in &mut self.tracks {
                for sub in &mut track.subscribers {
                    sub.expected += 1;
                }
            }
        } else {
            result.idle_sets += 1;
        }

        for track in &self.tracks {
            if let Some(handle) = self.host.track(track.id).and_then(|t| t.background_blur()) {
                if handle.state() != self.model_state {
                    result.violations.push(Violation::HandleMismatch {
                        track: track.id,
                        expected: self.model_state,
                        actual: handle.state(),
                    });
                }
            }
        }
    }

    fn apply_capture(&mut self, index: usize, result: &mut ScenarioResult) {
        let Some(track) = self.tracks.get(index) else {
            return;
        };
        let id = track.id;
        self.clock += 33_333;
        let raw = RawFrame::empty(CaptureTime::from_micros(self.clock));
        let frame = match self.host.capture(id, raw) {
            Ok(Some(frame)) => frame,
            Ok(None) => return,
            Err(e) => {
                result.violations.push(Violation::HostRejected {
                    op: "capture",
                    error: e.to_string(),
                });
                return;
            }
        };
        result.frames += 1;

        let expected = self.config.blur_supported.then_some(self.model_state);
        let actual = frame.background_blur().map(|info| info.state);
        if expected != actual {
            result.violations.push(Violation::FrameMismatch { track: id, expected, actual });
        }
    }

    fn apply_subscribe(&mut self, index: usize) {
        let Some(track) = self.tracks.get_mut(index) else {
            return;
        };
        let Some(handle) = self.host.track(track.id).and_then(|t| t.background_blur()) else {
            return;
        };
        let calls = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&calls);
        let id = handle.subscribe(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        track.subscribers.push(ModelSubscriber { id, calls, expected: 0 });
    }

    fn apply_unsubscribe(&mut self, index: usize, slot: usize) {
        let Some(track) = self.tracks.get_mut(index) else {
            return;
        };
        if slot >= track.subscribers.len() {
            return;
        }
        let sub = track.subscribers.remove(slot);
        if let Some(handle) = self.host.track(track.id).and_then(|t| t.background_blur()) {
            handle.unsubscribe(sub.id);
        }
        track.retired.push(sub);
    }

    fn apply_open(&mut self, result: &mut ScenarioResult) {
        let origin = OriginId::new(self.next_origin);
        self.next_origin += 1;
        let id = match self.host.open_track(self.device, origin) {
            Ok(id) => id,
            Err(e) => {
                result.violations.push(Violation::HostRejected {
                    op: "open_track",
                    error: e.to_string(),
                });
                return;
            }
        };
        let has_handle = self.host.track(id).and_then(|t| t.background_blur()).is_some();
        if has_handle != self.config.blur_supported {
            result.violations.push(Violation::HandlePresence { track: id });
        }
        self.tracks.push(ModelTrack {
            id,
            subscribers: Vec::new(),
            retired: Vec::new(),
        });
    }

    fn apply_stop(&mut self, index: usize, result: &mut ScenarioResult) {
        if index >= self.tracks.len() {
            return;
        }
        let track = self.tracks.remove(index);
        if let Err(e) = self.host.stop_track(track.id) {
            result.violations.push(Violation::HostRejected {
                op: "stop_track",
                error: e.to_string(),
            });
        }
        self.stopped.push(track);
    }

    fn verify_deliveries(&self, result: &mut ScenarioResult) {
        let all = self.tracks.iter().chain(self.stopped.iter());
        for track in all {
            for sub in track.subscribers.iter().chain(track.retired.iter()) {
                let actual = sub.calls.load(Ordering::SeqCst);
                result.deliveries += actual;
                if actual != sub.expected {
                    result.violations.push(Violation::DeliveryCount {
                        track: track.id,
                        expected: sub.expected,
                        actual,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_light() {
        let mut runner = ScenarioRunner::new(ScenarioConfig::light());
        let result = runner.run();
        assert!(result.is_valid(), "violations: {:?}", result.violations);
        assert_eq!(result.steps, 100);
    }

    #[test]
    fn test_scenario_default() {
        let mut runner = ScenarioRunner::new(ScenarioConfig::default());
        let result = runner.run();
        assert!(result.is_valid(), "violations: {:?}", result.violations);
        assert!(result.transitions > 0);
        assert!(result.frames > 0);
    }

    #[test]
    fn test_scenario_unsupported_camera() {
        let mut runner = ScenarioRunner::new(ScenarioConfig::unsupported());
        let result = runner.run();
        assert!(result.is_valid(), "violations: {:?}", result.violations);
        assert_eq!(result.transitions, 0);
        assert_eq!(result.deliveries, 0);
    }

    #[test]
    fn test_manual_ops() {
        let mut runner = ScenarioRunner::new(ScenarioConfig::light());
        let mut result = ScenarioResult::default();
        for op in [
            ScenarioOp::OpenTrack,
            ScenarioOp::Subscribe { track: 0 },
            ScenarioOp::Set(EffectState::Disabled),
            ScenarioOp::Set(EffectState::Enabled),
            ScenarioOp::Capture { track: 0 },
            ScenarioOp::StopTrack { track: 0 },
            ScenarioOp::OpenTrack,
            ScenarioOp::Set(EffectState::Disabled),
        ] {
            runner.apply(&op, &mut result);
        }
        runner.verify_deliveries(&mut result);

        assert!(result.is_valid(), "violations: {:?}", result.violations);
        assert_eq!(result.idle_sets, 1);
        assert_eq!(result.transitions, 2);
        assert_eq!(result.deliveries, 1);
    }

    #[test]
    fn test_host_rejection_is_a_violation() {
        let mut runner = ScenarioRunner::new(ScenarioConfig::light());
        let mut result = ScenarioResult::default();
        runner.apply(&ScenarioOp::OpenTrack, &mut result);

        // Stop behind the model's back so the scripted stop is refused
        let id = runner.tracks[0].id;
        runner.host.stop_track(id).unwrap();
        runner.apply(&ScenarioOp::StopTrack { track: 0 }, &mut result);

        assert!(!result.is_valid());
        assert!(matches!(
            result.violations[0],
            Violation::HostRejected { op: "stop_track", .. }
        ));
    }
}
