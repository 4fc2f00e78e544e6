//! CAMFX State - Effect state store and change notification
//!
//! This crate implements the observation side of camera effects:
//! - One authoritative store per (device, effect), written only by the
//!   platform through a single writer
//! - Per-track handles that read the store and notify subscribers
//! - Transition detection with idempotent sets and snapshot delivery rounds
//! - The device registry shared across origins

pub mod handle;
pub mod notifier;
pub mod registry;
pub mod store;

pub use handle::*;
pub use notifier::*;
pub use registry::*;
pub use store::*;
