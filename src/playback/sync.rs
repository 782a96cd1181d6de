//! Audio/video synchronization controller.
//! The level's audio clock is the master; video follows by nudging its
//! playback speed, and only seeks when drift is too large to nudge away.

use tracing::{debug, info};

use crate::core::time::{self, Seconds};
use crate::playback::backend::MediaBackend;
use crate::playback::player::MediaPlayer;
use crate::settings::SyncSettings;

/// Outcome of one synchronization tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SyncAction {
    /// Player not started yet, or video start still ahead because of the offset
    Waiting,
    InSync,
    /// Out of sync, below the threshold that starts a correction
    Drifting { frames: i32 },
    /// Correction episode active at this speed
    Correcting { speed: f64 },
    /// Correction episode ended, nominal speed restored
    Recovered,
    /// Drift too large; the player was moved to `target`
    Reseek { target: Seconds },
}

/// Drift detection and speed correction, run once per presentation tick
#[derive(Debug, Clone)]
pub struct SyncController {
    settings: SyncSettings,
    /// Association offset in seconds
    offset: Seconds,
    looping: bool,
    /// Drift measured on the last corrected tick, in frames (positive: video ahead)
    drift_frames: f64,
}

impl SyncController {
    pub fn new(settings: SyncSettings) -> Self {
        Self {
            settings,
            offset: 0.0,
            looping: false,
            drift_frames: 0.0,
        }
    }

    /// Set the association's offset and loop flag
    pub fn configure(&mut self, offset: Seconds, looping: bool) {
        self.offset = offset;
        self.looping = looping;
    }

    pub fn offset(&self) -> Seconds {
        self.offset
    }

    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    /// Size of the last measured drift in frames. Zero until the video runs.
    pub fn drift_frames(&self) -> f64 {
        self.drift_frames
    }

    /// Where the video should be for the given audio time.
    /// Negative before the video is due to start. Wraps when looping and the
    /// video length is known.
    pub fn expected_video_time(&self, audio_time: Seconds, video_length: Seconds) -> Seconds {
        let expected = audio_time + self.offset;
        if self.looping && video_length > 0.0 && expected >= 0.0 {
            expected % video_length
        } else {
            expected
        }
    }

    /// Compare the player against the audio clock and correct it
    pub fn tick<B: MediaBackend>(
        &mut self,
        player: &mut MediaPlayer<B>,
        audio_time: Seconds,
    ) -> SyncAction {
        if !player.is_playing() || !player.has_started() {
            return SyncAction::Waiting;
        }

        let expected = self.expected_video_time(audio_time, player.length());
        if expected < 0.0 {
            return SyncAction::Waiting;
        }

        let drift = self.wrap_drift(player.time() - expected, player.length());
        self.correct(player, drift, expected)
    }

    /// Near a loop point the video and the expected time may wrap on
    /// different ticks; measure drift the short way around the loop.
    fn wrap_drift(&self, drift: Seconds, video_length: Seconds) -> Seconds {
        if !self.looping || video_length <= 0.0 {
            return drift;
        }
        let wrapped = drift.rem_euclid(video_length);
        if wrapped > video_length / 2.0 {
            wrapped - video_length
        } else {
            wrapped
        }
    }

    fn correct<B: MediaBackend>(
        &mut self,
        player: &mut MediaPlayer<B>,
        drift: Seconds,
        expected: Seconds,
    ) -> SyncAction {
        if drift.abs() >= self.settings.reseek_seconds {
            info!(drift, target = expected, "Video too far out of sync, seeking");
            self.drift_frames = 0.0;
            player.set_time(expected);
            player.set_out_of_sync_frames(0);
            if player.is_syncing() {
                player.reset_playback_speed();
            }
            return SyncAction::Reseek { target: expected };
        }

        let drift_frames = time::to_frames(drift, player.frame_duration());
        self.drift_frames = drift_frames;
        if drift_frames.abs() <= self.settings.frame_tolerance {
            player.set_out_of_sync_frames(0);
            if player.is_syncing() {
                player.reset_playback_speed();
                info!(speed = player.playback_speed(), "Video back in sync");
                return SyncAction::Recovered;
            }
            return SyncAction::InSync;
        }

        // Count consecutive out-of-sync frames in the direction of the drift;
        // a change of direction restarts the count.
        let step = if drift > 0.0 { 1 } else { -1 };
        let previous = player.out_of_sync_frames();
        let frames = if previous == 0 || previous.signum() == step {
            previous.saturating_add(step)
        } else {
            step
        };
        player.set_out_of_sync_frames(frames);

        if !player.is_syncing() && frames.unsigned_abs() <= self.settings.out_of_sync_threshold {
            debug!(drift, frames, "Video drifting");
            return SyncAction::Drifting { frames };
        }

        // Video ahead (positive drift) slows down, behind speeds up
        let max = self.settings.max_speed_deviation;
        let deviation = (drift * self.settings.correction_gain).clamp(-max, max);
        let speed = player.nominal_speed() * (1.0 - deviation);

        if !player.is_syncing() {
            info!(drift, frames, speed, "Starting video sync correction");
            player.set_syncing(true);
        }
        player.set_playback_speed(speed);
        SyncAction::Correcting { speed }
    }
}
