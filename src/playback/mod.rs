pub mod backend;
pub mod engine;
pub mod player;
pub mod state;
pub mod sync;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::{BackendEvent, MediaBackend};
pub use engine::{LevelPhase, PlaybackController, SceneContext};
pub use player::{MediaPlayer, PlaybackError};
pub use state::PlayerState;
pub use sync::{SyncAction, SyncController};
