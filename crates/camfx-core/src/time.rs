//! Capture time
//!
//! Frames are stamped with the time they were captured, measured in
//! microseconds since the producing track started.

use std::ops::{Add, Sub};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Capture time - microseconds since track start
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaptureTime(pub u64);

impl CaptureTime {
    pub const ZERO: CaptureTime = CaptureTime(0);

    #[inline]
    pub fn from_micros(micros: u64) -> Self {
        CaptureTime(micros)
    }

    #[inline]
    pub fn from_millis(millis: u64) -> Self {
        CaptureTime(millis.saturating_mul(1000))
    }

    /// Capture time of the `index`-th frame at a fixed frame rate
    pub fn from_frame_index(index: u64, fps: u32) -> Self {
        if fps == 0 {
            return CaptureTime::ZERO;
        }
        CaptureTime(index.saturating_mul(1_000_000) / fps as u64)
    }

    #[inline]
    pub fn as_micros(self) -> u64 {
        self.0
    }

    #[inline]
    pub fn as_millis(self) -> u64 {
        self.0 / 1000
    }

    #[inline]
    pub fn saturating_add(self, duration: Duration) -> Self {
        let micros = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);
        CaptureTime(self.0.saturating_add(micros))
    }
}

impl Add<Duration> for CaptureTime {
    type Output = CaptureTime;

    #[inline]
    fn add(self, rhs: Duration) -> Self::Output {
        self.saturating_add(rhs)
    }
}

impl Sub<CaptureTime> for CaptureTime {
    type Output = Duration;

    #[inline]
    fn sub(self, rhs: CaptureTime) -> Self::Output {
        Duration::from_micros(self.0.saturating_sub(rhs.0))
    }
}

impl std::fmt::Debug for CaptureTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t({:.3}ms)", self.0 as f64 / 1000.0)
    }
}
