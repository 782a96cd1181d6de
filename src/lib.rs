//! Video playback kept in lock-step with a rhythm-game level's audio clock.
//!
//! `video` models a video's association with a level (metadata, download
//! state, overrides, legacy migration), `playback` drives a platform media
//! backend and corrects drift against the game clock, `render` holds the
//! output surface model.

pub mod context;
pub mod core;
pub mod logging;
pub mod playback;
pub mod render;
pub mod settings;
pub mod video;

pub use context::AppContext;
pub use settings::{Settings, SyncSettings};
