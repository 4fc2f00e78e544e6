//! CAMFX Test - Simulation and invariant checks
//!
//! - Seeded scenario runner driving a real host through random interleavings
//!   of platform sets, captures, subscriptions and track lifecycles
//! - Property helpers shared by the integration tests and benches

pub mod properties;
pub mod scenario;

pub use scenario::*;
