//! Effect definitions
//!
//! An effect is a platform-applied transformation of camera video, such as
//! background blur. Applications can observe effect state but never control it.
//!
//! Effects are identified by an open [`EffectKind`] so new effects can be
//! reported without touching the store or notifier contract.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{CamfxError, CamfxResult};

/// Two-valued effect status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum EffectState {
    Disabled = 0x00,
    Enabled = 0x01,
}

impl EffectState {
    /// Parse from a compact byte
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0x00 => Some(EffectState::Disabled),
            0x01 => Some(EffectState::Enabled),
            _ => None,
        }
    }

    #[inline]
    pub fn to_byte(self) -> u8 {
        self as u8
    }

    #[inline]
    pub fn from_enabled(enabled: bool) -> Self {
        if enabled {
            EffectState::Enabled
        } else {
            EffectState::Disabled
        }
    }

    #[inline]
    pub fn is_enabled(self) -> bool {
        self == EffectState::Enabled
    }

    /// The opposite state
    #[inline]
    pub fn toggled(self) -> Self {
        match self {
            EffectState::Disabled => EffectState::Enabled,
            EffectState::Enabled => EffectState::Disabled,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EffectState::Disabled => "disabled",
            EffectState::Enabled => "enabled",
        }
    }
}

impl fmt::Display for EffectState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Immutable snapshot of an effect's state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EffectInfo {
    pub state: EffectState,
}

impl EffectInfo {
    #[inline]
    pub fn new(state: EffectState) -> Self {
        EffectInfo { state }
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.state.is_enabled()
    }
}

impl From<EffectState> for EffectInfo {
    fn from(state: EffectState) -> Self {
        EffectInfo::new(state)
    }
}

/// Name of an effect that is not built in.
///
/// Only obtainable through [`EffectKind::named`] or parsing, so it never
/// holds a built-in name or surrounding whitespace.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EffectName(String);

impl EffectName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EffectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Effect name in the open registry.
///
/// `BackgroundBlur` is built in; anything else the platform reports is
/// carried by name. The wire name `backgroundBlur` always parses to the
/// built-in variant.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EffectKind {
    BackgroundBlur,
    Other(EffectName),
}

impl EffectKind {
    pub const BACKGROUND_BLUR_NAME: &'static str = "backgroundBlur";

    /// Effect for a wire name. Built-in names map to their variant.
    pub fn named(name: &str) -> CamfxResult<Self> {
        if name.is_empty() || name.trim() != name {
            return Err(CamfxError::InvalidEffectName(name.to_string()));
        }
        if name == Self::BACKGROUND_BLUR_NAME {
            Ok(EffectKind::BackgroundBlur)
        } else {
            Ok(EffectKind::Other(EffectName(name.to_string())))
        }
    }

    /// Wire/metadata name of this effect
    pub fn name(&self) -> &str {
        match self {
            EffectKind::BackgroundBlur => Self::BACKGROUND_BLUR_NAME,
            EffectKind::Other(name) => name.as_str(),
        }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, EffectKind::BackgroundBlur)
    }
}

impl FromStr for EffectKind {
    type Err = CamfxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EffectKind::named(s)
    }
}

impl TryFrom<String> for EffectKind {
    type Error = CamfxError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        EffectKind::named(&value)
    }
}

impl From<EffectKind> for String {
    fn from(kind: EffectKind) -> Self {
        match kind {
            EffectKind::BackgroundBlur => EffectKind::BACKGROUND_BLUR_NAME.to_string(),
            EffectKind::Other(name) => name.0,
        }
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered mapping from effect to its snapshot.
///
/// Used for per-frame metadata and track settings. An effect missing from
/// the map is unsupported; it is never filled in with a default.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EffectMap {
    entries: BTreeMap<EffectKind, EffectInfo>,
}

impl EffectMap {
    pub fn new() -> Self {
        EffectMap::default()
    }

    /// Insert a snapshot, returning the previous one for that effect
    pub fn insert(&mut self, kind: EffectKind, info: EffectInfo) -> Option<EffectInfo> {
        self.entries.insert(kind, info)
    }

    #[inline]
    pub fn get(&self, kind: &EffectKind) -> Option<EffectInfo> {
        self.entries.get(kind).copied()
    }

    #[inline]
    pub fn background_blur(&self) -> Option<EffectInfo> {
        self.get(&EffectKind::BackgroundBlur)
    }

    pub fn contains(&self, kind: &EffectKind) -> bool {
        self.entries.contains_key(kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EffectKind, &EffectInfo)> {
        self.entries.iter()
    }

    pub fn kinds(&self) -> impl Iterator<Item = &EffectKind> {
        self.entries.keys()
    }
}

impl FromIterator<(EffectKind, EffectInfo)> for EffectMap {
    fn from_iter<I: IntoIterator<Item = (EffectKind, EffectInfo)>>(iter: I) -> Self {
        EffectMap {
            entries: iter.into_iter().collect(),
        }
    }
}
