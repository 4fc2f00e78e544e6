//! Platform bridge - the only writer of effect state
//!
//! Holds the writer of every store and turns platform readings into `set`
//! calls. Bursts of readings can be coalesced so only the final value per
//! (device, effect) reaches the stores.

use std::collections::HashMap;

use tracing::{debug, warn};

use camfx_core::{CamfxError, CamfxResult, DeviceId, EffectKind, EffectState};
use camfx_state::EffectWriter;

/// One platform reading
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlatformReport {
    pub device: DeviceId,
    pub kind: EffectKind,
    pub state: EffectState,
}

impl PlatformReport {
    pub fn new(device: DeviceId, kind: EffectKind, state: EffectState) -> Self {
        PlatformReport { device, kind, state }
    }

    pub fn background_blur(device: DeviceId, state: EffectState) -> Self {
        PlatformReport::new(device, EffectKind::BackgroundBlur, state)
    }
}

/// Result of applying a batch of readings
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Readings written to a store after coalescing
    pub applied: u32,
    /// Readings dropped because a later one replaced them
    pub coalesced: u32,
    /// Writes that changed state
    pub transitions: u32,
}

/// Owner of all effect writers
#[derive(Debug, Default)]
pub struct PlatformBridge {
    writers: HashMap<(DeviceId, EffectKind), EffectWriter>,
}

impl PlatformBridge {
    pub fn new() -> Self {
        PlatformBridge::default()
    }

    /// Take ownership of a store's writer
    pub fn adopt(&mut self, writer: EffectWriter) {
        let store = writer.store();
        let key = (store.device(), store.kind().clone());
        debug!(device = %key.0, kind = %key.1, "writer adopted");
        self.writers.insert(key, writer);
    }

    /// Drop all writers for a device
    pub fn release_device(&mut self, device: DeviceId) -> usize {
        let before = self.writers.len();
        self.writers.retain(|(d, _), _| *d != device);
        before - self.writers.len()
    }

    pub fn has_device(&self, device: DeviceId) -> bool {
        self.writers.keys().any(|(d, _)| *d == device)
    }

    pub fn len(&self) -> usize {
        self.writers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writers.is_empty()
    }

    /// Apply one reading. Returns whether it changed state.
    pub fn report(&mut self, report: &PlatformReport) -> CamfxResult<bool> {
        self.check(report)?;
        match self.writers.get_mut(&(report.device, report.kind.clone())) {
            Some(writer) => Ok(writer.set(report.state)),
            None => Err(CamfxError::UnknownDevice(report.device)),
        }
    }

    fn check(&self, report: &PlatformReport) -> CamfxResult<()> {
        if self.writers.contains_key(&(report.device, report.kind.clone())) {
            return Ok(());
        }
        if self.has_device(report.device) {
            return Err(CamfxError::EffectUnavailable {
                device: report.device,
                kind: report.kind.clone(),
            });
        }
        warn!(device = %report.device, kind = %report.kind, "report for unknown device");
        Err(CamfxError::UnknownDevice(report.device))
    }

    /// Apply a burst of readings, keeping only the last one per
    /// (device, effect). Writes happen in first-seen order.
    ///
    /// The whole batch is checked before anything is written.
    pub fn report_batch<I>(&mut self, reports: I) -> CamfxResult<BatchOutcome>
    where
        I: IntoIterator<Item = PlatformReport>,
    {
        let coalesced = coalesce(reports);
        for report in &coalesced.reports {
            self.check(report)?;
        }

        let mut outcome = BatchOutcome {
            coalesced: coalesced.dropped,
            ..BatchOutcome::default()
        };
        for report in &coalesced.reports {
            outcome.applied += 1;
            if self.report(report)? {
                outcome.transitions += 1;
            }
        }
        debug!(
            applied = outcome.applied,
            coalesced = outcome.coalesced,
            transitions = outcome.transitions,
            "platform batch applied"
        );
        Ok(outcome)
    }
}

struct Coalesced {
    reports: Vec<PlatformReport>,
    dropped: u32,
}

fn coalesce<I>(reports: I) -> Coalesced
where
    I: IntoIterator<Item = PlatformReport>,
{
    let mut order: Vec<PlatformReport> = Vec::new();
    let mut index: HashMap<(DeviceId, EffectKind), usize> = HashMap::new();
    let mut dropped = 0;

    for report in reports {
        let key = (report.device, report.kind.clone());
        match index.get(&key) {
            Some(&i) => {
                order[i].state = report.state;
                dropped += 1;
            }
            None => {
                index.insert(key, order.len());
                order.push(report);
            }
        }
    }

    Coalesced {
        reports: order,
        dropped,
    }
}
