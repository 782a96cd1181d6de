//! Player state machine.
//!
//! `Idle → Preparing → Prepared → Playing ⇄ Paused → Stopped`. Preparation
//! completes asynchronously, signalled by the backend.

/// Transport state of a [`MediaPlayer`](crate::playback::MediaPlayer)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerState {
    /// No preparation requested yet
    #[default]
    Idle,
    /// Waiting for the backend's prepare-completed event
    Preparing,
    /// Ready to play
    Prepared,
    Playing,
    Paused,
    /// Stopped by the caller or after a playback failure
    Stopped,
}

impl PlayerState {
    pub fn is_playing(&self) -> bool {
        matches!(self, PlayerState::Playing)
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, PlayerState::Paused)
    }

    /// States from which `play` may be requested. A stopped player re-prepares
    /// inside the backend.
    pub fn can_play(&self) -> bool {
        matches!(self, PlayerState::Prepared | PlayerState::Paused | PlayerState::Stopped)
    }
}
