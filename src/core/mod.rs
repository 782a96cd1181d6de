//! Core value types shared by the video and playback modules.
//!
//! Time values are seconds (`f64`) except where a persisted format stores
//! milliseconds; conversions live in [`time`].

pub mod overridable;
pub mod time;
pub mod vector;

pub use overridable::Override;
pub use time::Seconds;
pub use vector::Vec3;
