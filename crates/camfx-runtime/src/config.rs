//! Runtime configuration
//!
//! Loaded from JSON. Describes logging and the cameras the platform reports,
//! with the effects each one supports and their state at startup.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use camfx_core::{CamfxError, CamfxResult, DeviceId, EffectKind, EffectState};

/// Logging settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set
    pub filter: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            filter: "info".to_string(),
            json: false,
        }
    }
}

/// One effect a camera supports
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectConfig {
    pub kind: EffectKind,
    #[serde(default = "default_initial")]
    pub initial: EffectState,
}

fn default_initial() -> EffectState {
    EffectState::Disabled
}

impl EffectConfig {
    pub fn new(kind: EffectKind, initial: EffectState) -> Self {
        EffectConfig { kind, initial }
    }
}

/// One camera
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub id: DeviceId,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub effects: Vec<EffectConfig>,
}

impl DeviceConfig {
    pub fn new(id: DeviceId) -> Self {
        DeviceConfig {
            id,
            label: None,
            effects: Vec::new(),
        }
    }

    pub fn with_effect(mut self, kind: EffectKind, initial: EffectState) -> Self {
        self.effects.push(EffectConfig::new(kind, initial));
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Top-level runtime configuration
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub log: LogConfig,
    pub devices: Vec<DeviceConfig>,
}

impl RuntimeConfig {
    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> CamfxResult<Self> {
        let config: RuntimeConfig =
            serde_json::from_str(json).map_err(|e| CamfxError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> CamfxResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_pretty(&self) -> CamfxResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| CamfxError::Config(e.to_string()))
    }

    /// Reject duplicate cameras and duplicate effects on one camera
    pub fn validate(&self) -> CamfxResult<()> {
        let mut seen = HashSet::new();
        for device in &self.devices {
            if !seen.insert(device.id) {
                return Err(CamfxError::DuplicateDevice(device.id));
            }
            let mut kinds = HashSet::new();
            for effect in &device.effects {
                if !kinds.insert(&effect.kind) {
                    return Err(CamfxError::Config(format!(
                        "effect {} listed twice for device {}",
                        effect.kind, device.id
                    )));
                }
            }
        }
        Ok(())
    }
}
