//! Platform media backend seam.
//!
//! Decoding and presentation are done by the host platform. The backend
//! exposes transport primitives and reports asynchronous completions as
//! [`BackendEvent`]s on a crossbeam channel that the player drains once per
//! tick.

use crossbeam::channel::{self, Receiver, Sender};

use crate::core::Seconds;

/// Asynchronous notification from the backend
#[derive(Debug, Clone, PartialEq)]
pub enum BackendEvent {
    /// `prepare` finished; resolution and frame rate are now known
    PrepareCompleted,
    /// Playback actually started
    Started,
    /// A frame is ready for display. Only sent while frame events are enabled.
    FrameReady { frame: u64 },
    /// End of the video was reached
    LoopPointReached,
    /// Backend error message
    Error(String),
}

/// Create the channel a backend reports on
pub fn event_channel() -> (Sender<BackendEvent>, Receiver<BackendEvent>) {
    channel::unbounded()
}

/// Video+audio playback pipeline provided by the platform
pub trait MediaBackend {
    fn set_source(&mut self, url: &str);
    fn source(&self) -> &str;

    /// Start preparing the current source. Completion is reported with
    /// [`BackendEvent::PrepareCompleted`].
    fn prepare(&mut self);
    fn play(&mut self);
    fn pause(&mut self);
    fn stop(&mut self);
    fn is_playing(&self) -> bool;

    /// Current playback position
    fn time(&self) -> Seconds;
    /// Seek
    fn set_time(&mut self, seconds: Seconds);
    /// Video length, 0.0 when unknown
    fn length(&self) -> Seconds;
    /// Frames per second, 0.0 when unknown
    fn frame_rate(&self) -> f64;
    /// Source resolution once prepared
    fn resolution(&self) -> Option<(u32, u32)>;

    fn playback_speed(&self) -> f64;
    fn set_playback_speed(&mut self, speed: f64);
    fn set_looping(&mut self, looping: bool);
    /// Toggle [`BackendEvent::FrameReady`] reporting
    fn set_frame_events(&mut self, enabled: bool);

    fn set_volume(&mut self, volume: f32);
    /// -1.0 (left) to 1.0 (right)
    fn set_pan_stereo(&mut self, pan: f32);
}
