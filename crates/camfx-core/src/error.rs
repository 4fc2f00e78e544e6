//! Error types for CAMFX
//!
//! Reading, setting, tagging and subscribing never fail. These errors belong
//! to the host layer: device bookkeeping and configuration.

use thiserror::Error;

use crate::{DeviceId, EffectKind, TrackId};

/// Host-level CAMFX errors
#[derive(Error, Debug)]
pub enum CamfxError {
    // Device errors
    #[error("Unknown device: {0}")]
    UnknownDevice(DeviceId),

    #[error("Device already registered: {0}")]
    DuplicateDevice(DeviceId),

    #[error("Effect {kind} is not available on device {device}")]
    EffectUnavailable { device: DeviceId, kind: EffectKind },

    #[error("Invalid effect name: {0:?}")]
    InvalidEffectName(String),

    // Track errors
    #[error("Unknown track: {0}")]
    UnknownTrack(TrackId),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for CAMFX host operations
pub type CamfxResult<T> = Result<T, CamfxError>;
