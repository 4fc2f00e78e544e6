//! CAMFX Core - Fundamental types for camera effect observation
//!
//! This crate defines the types shared by every other CAMFX crate:
//! - Identifiers (DeviceId, TrackId, OriginId, SubscriptionId, FrameSeq)
//! - Capture time
//! - Effect state, effect info snapshots and the open effect registry
//! - The host-level error type

pub mod id;
pub mod time;
pub mod effect;
pub mod error;

pub use id::*;
pub use time::*;
pub use effect::*;
pub use error::*;
