//! CAMFX Runtime - Host wiring for camera effect observation
//!
//! This crate connects the pieces a browser-like host needs:
//! 1. Load configuration (cameras and the effects they report)
//! 2. Install the tracing subscriber
//! 3. Register cameras and hand their writers to the platform bridge
//! 4. Open, clone and stop tracks for origins
//! 5. Apply platform readings, coalescing bursts
//! 6. Capture tagged frames

pub mod config;
pub mod host;
pub mod logging;
pub mod platform;

pub use config::*;
pub use host::*;
pub use platform::*;
