//! Identity types for CAMFX
//!
//! All identifiers are plain 64-bit values. Devices and origins come from
//! the host; tracks, subscriptions and frame sequence numbers are allocated
//! locally.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Physical camera identity. One effect store exists per (device, effect).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(pub u64);

impl DeviceId {
    #[inline]
    pub fn new(id: u64) -> Self {
        DeviceId(id)
    }
}

impl fmt::Debug for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Device({:08x})", self.0)
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

/// Camera track identity
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TrackId(pub u64);

impl TrackId {
    #[inline]
    pub fn new(id: u64) -> Self {
        TrackId(id)
    }
}

impl fmt::Debug for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Track({})", self.0)
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Origin identity - the application context a track was handed to.
/// Several origins may hold tracks over the same device.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OriginId(pub u64);

impl OriginId {
    #[inline]
    pub fn new(id: u64) -> Self {
        OriginId(id)
    }
}

impl fmt::Debug for OriginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Origin({:08x})", self.0)
    }
}

impl fmt::Display for OriginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

/// Subscription identity, unique within one handle
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SubscriptionId(pub u64);

impl SubscriptionId {
    #[inline]
    pub fn new(id: u64) -> Self {
        SubscriptionId(id)
    }
}

impl fmt::Debug for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

/// Per-track frame sequence number, starting at zero
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameSeq(pub u64);

impl FrameSeq {
    pub const ZERO: FrameSeq = FrameSeq(0);

    #[inline]
    pub fn new(seq: u64) -> Self {
        FrameSeq(seq)
    }

    /// The sequence number following this one
    #[inline]
    pub fn next(self) -> Self {
        FrameSeq(self.0.wrapping_add(1))
    }
}

impl fmt::Debug for FrameSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame#{}", self.0)
    }
}
