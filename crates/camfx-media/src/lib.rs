//! CAMFX Media - Camera tracks and tagged frames
//!
//! Frames are stamped with the effect states of their camera at the moment
//! they are captured. The stamp is a snapshot: later state changes never
//! reach a frame that already exists.

pub mod frame;
pub mod tagger;
pub mod track;

pub use frame::*;
pub use tagger::*;
pub use track::*;
