//! Media player wrapping a platform backend and the screen it draws on.
//!
//! Owns the transport state machine, the first-frame handshake that keeps the
//! screen cleared until real video arrives, and the speed primitives used by
//! drift correction.

use crossbeam::channel::Receiver;
use tracing::{debug, error, warn};

use crate::core::time::{self, Seconds};
use crate::core::{Override, Vec3};
use crate::playback::backend::{BackendEvent, MediaBackend};
use crate::playback::state::PlayerState;
use crate::render::screen::{MaterialSource, Placement, Screen, ScreenTint, DEFAULT_ASPECT_RATIO};

/// Error message backends report when asked to prepare an empty source
const EMPTY_SOURCE_ERROR: &str = "Can't play movie []";

/// Error type for playback operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlaybackError {
    #[error("video playback failed: {0}")]
    Failure(String),
    #[error("player is not prepared (state {0:?})")]
    NotPrepared(PlayerState),
}

/// True for the error a backend reports when no source is bound yet
pub fn is_expected_empty_source(message: &str) -> bool {
    message == EMPTY_SOURCE_ERROR
}

pub struct MediaPlayer<B: MediaBackend> {
    backend: B,
    events: Receiver<BackendEvent>,
    screen: Screen,
    state: PlayerState,
    /// Speed to return to when a correction episode ends
    nominal_speed: f64,
    is_syncing: bool,
    out_of_sync_frames: i32,
    waiting_for_first_frame: bool,
    /// Set once the backend confirms playback after the last `play`
    started: bool,
    placement_defaults: Placement,
    unmute_volume: f32,
}

impl<B: MediaBackend> MediaPlayer<B> {
    /// Create a player. `events` must be the receiving end of the channel the
    /// backend reports on.
    pub fn new(
        mut backend: B,
        events: Receiver<BackendEvent>,
        materials: &dyn MaterialSource,
        unmute_volume: f32,
    ) -> Self {
        backend.set_looping(false);
        backend.set_frame_events(false);
        let nominal_speed = backend.playback_speed();

        Self {
            backend,
            events,
            screen: Screen::new(materials),
            state: PlayerState::Idle,
            nominal_speed,
            is_syncing: false,
            out_of_sync_frames: 0,
            waiting_for_first_frame: false,
            started: false,
            placement_defaults: Placement::MENU,
            unmute_volume,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    // Transport

    pub fn set_source(&mut self, url: &str) {
        self.backend.set_source(url);
    }

    pub fn source(&self) -> &str {
        self.backend.source()
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.backend.set_looping(looping);
    }

    /// Request pipeline setup. Returns immediately; readiness arrives as an event.
    pub fn prepare(&mut self) {
        debug!(source = self.backend.source(), "Preparing video");
        self.state = PlayerState::Preparing;
        self.started = false;
        self.backend.prepare();
    }

    /// Start playback. The screen stays cleared until the first frame is ready.
    pub fn play(&mut self) -> Result<(), PlaybackError> {
        if !self.state.can_play() {
            warn!(state = ?self.state, "Play requested before the video was prepared");
            return Err(PlaybackError::NotPrepared(self.state));
        }

        self.waiting_for_first_frame = true;
        self.started = false;
        self.backend.set_frame_events(true);
        self.backend.play();
        self.state = PlayerState::Playing;
        Ok(())
    }

    pub fn pause(&mut self) {
        if self.state.is_playing() {
            self.backend.pause();
            self.state = PlayerState::Paused;
        }
    }

    /// Halt playback, clear the screen and drop any pending first-frame wait
    pub fn stop(&mut self) {
        self.backend.stop();
        self.disarm_first_frame();
        self.started = false;
        let aspect_ratio = self.aspect_ratio();
        self.screen.set_aspect_ratio(aspect_ratio);
        self.screen.set_tint(ScreenTint::Cleared);
        if self.state != PlayerState::Idle {
            self.state = PlayerState::Stopped;
        }
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing() && self.backend.is_playing()
    }

    /// True once the backend has started presenting after the last `play`
    pub fn has_started(&self) -> bool {
        self.started
    }

    pub fn is_waiting_for_first_frame(&self) -> bool {
        self.waiting_for_first_frame
    }

    // Timing

    pub fn time(&self) -> Seconds {
        self.backend.time()
    }

    pub fn set_time(&mut self, seconds: Seconds) {
        self.backend.set_time(seconds);
    }

    pub fn length(&self) -> Seconds {
        self.backend.length()
    }

    pub fn frame_duration(&self) -> Seconds {
        time::frame_duration(self.backend.frame_rate())
    }

    // Synchronization primitives

    pub fn playback_speed(&self) -> f64 {
        self.backend.playback_speed()
    }

    /// Set the effective speed. Outside a correction episode this also
    /// becomes the nominal speed.
    pub fn set_playback_speed(&mut self, speed: f64) {
        if !self.is_syncing {
            self.nominal_speed = speed;
        }
        self.backend.set_playback_speed(speed);
    }

    pub fn nominal_speed(&self) -> f64 {
        self.nominal_speed
    }

    pub fn is_syncing(&self) -> bool {
        self.is_syncing
    }

    pub fn set_syncing(&mut self, syncing: bool) {
        self.is_syncing = syncing;
    }

    /// Consecutive out-of-sync ticks, signed by drift direction (positive:
    /// video ahead). The drift itself in frames is
    /// [`SyncController::drift_frames`](crate::playback::sync::SyncController::drift_frames).
    pub fn out_of_sync_frames(&self) -> i32 {
        self.out_of_sync_frames
    }

    pub fn set_out_of_sync_frames(&mut self, frames: i32) {
        self.out_of_sync_frames = frames;
    }

    /// End a correction episode: back to nominal speed, syncing cleared
    pub fn reset_playback_speed(&mut self) {
        self.backend.set_playback_speed(self.nominal_speed);
        self.is_syncing = false;
    }

    // Presentation

    pub fn show(&mut self) {
        self.screen.show();
    }

    pub fn hide(&mut self) {
        self.screen.hide();
    }

    /// Defaults used for inherited placement components
    pub fn set_placement_defaults(&mut self, defaults: Placement) {
        self.placement_defaults = defaults;
    }

    pub fn placement_defaults(&self) -> &Placement {
        &self.placement_defaults
    }

    /// Reposition the screen. Inherited components take the current defaults;
    /// width follows the current source aspect ratio.
    pub fn set_placement(
        &mut self,
        position: Override<Vec3>,
        rotation: Override<Vec3>,
        height: Override<f32>,
    ) {
        let placement = Placement::resolve(position, rotation, height, &self.placement_defaults);
        let aspect_ratio = self.aspect_ratio();
        self.screen.set_placement(placement);
        self.screen.set_aspect_ratio(aspect_ratio);
    }

    /// Source aspect ratio, 16:9 while no valid resolution is known
    pub fn aspect_ratio(&self) -> f32 {
        match self.backend.resolution() {
            Some((width, height)) if width > 0 && height > 0 => width as f32 / height as f32,
            _ => DEFAULT_ASPECT_RATIO,
        }
    }

    // Audio

    pub fn set_volume(&mut self, volume: f32) {
        self.backend.set_volume(volume.clamp(0.0, 1.0));
    }

    pub fn set_pan_stereo(&mut self, pan: f32) {
        self.backend.set_pan_stereo(pan.clamp(-1.0, 1.0));
    }

    pub fn mute(&mut self) {
        self.set_volume(0.0);
    }

    pub fn unmute(&mut self) {
        self.set_volume(self.unmute_volume);
    }

    // Events

    /// Drain backend events. All pending events are processed; the first
    /// playback failure among them is returned. Failures leave the player
    /// stopped, they are never fatal.
    pub fn poll_events(&mut self) -> Result<(), PlaybackError> {
        let mut failure = None;
        while let Ok(event) = self.events.try_recv() {
            if let Err(err) = self.handle_event(event) {
                failure.get_or_insert(err);
            }
        }
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn handle_event(&mut self, event: BackendEvent) -> Result<(), PlaybackError> {
        match event {
            BackendEvent::PrepareCompleted => {
                if self.state == PlayerState::Preparing {
                    self.state = PlayerState::Prepared;
                }
                debug!(resolution = ?self.backend.resolution(), "Video player prepare complete");
            }
            BackendEvent::Started => {
                if self.state.is_playing() {
                    self.started = true;
                }
                debug!("Video player started");
            }
            BackendEvent::FrameReady { frame } => {
                if self.waiting_for_first_frame {
                    let aspect_ratio = self.aspect_ratio();
                    self.screen.set_tint(ScreenTint::On);
                    self.screen.set_aspect_ratio(aspect_ratio);
                    self.disarm_first_frame();
                    self.started = true;
                    debug!(frame, "First video frame ready");
                }
            }
            BackendEvent::LoopPointReached => {
                debug!("Video reached its end");
            }
            BackendEvent::Error(message) => {
                if is_expected_empty_source(&message) {
                    return Ok(());
                }
                error!(%message, "Video player error");
                self.disarm_first_frame();
                self.started = false;
                self.screen.set_tint(ScreenTint::Cleared);
                self.state = PlayerState::Stopped;
                return Err(PlaybackError::Failure(message));
            }
        }
        Ok(())
    }

    fn disarm_first_frame(&mut self) {
        if self.waiting_for_first_frame {
            self.waiting_for_first_frame = false;
            self.backend.set_frame_events(false);
        }
    }
}
