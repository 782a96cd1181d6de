//! Playback controller coordinating a level's video with its audio clock.
//! The host calls [`PlaybackController::tick`] once per rendered frame and
//! reports scene transitions through [`PlaybackController::on_context_changed`].

use tracing::{debug, info, warn};

use crate::context::AppContext;
use crate::core::{Override, Seconds};
use crate::playback::backend::MediaBackend;
use crate::playback::player::MediaPlayer;
use crate::playback::sync::{SyncAction, SyncController};
use crate::render::screen::Placement;
use crate::video::config::VideoAssociation;
use crate::video::environment::EnvironmentApplier;

/// Host scene the screen is shown in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneContext {
    Menu,
    Gameplay,
}

impl SceneContext {
    fn placement_defaults(self) -> Placement {
        match self {
            SceneContext::Menu => Placement::MENU,
            SceneContext::Gameplay => Placement::GAMEPLAY,
        }
    }
}

/// Where the loaded video is relative to the running level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelPhase {
    /// No level running
    Inactive,
    /// Level running, video not started yet
    WaitingForStart,
    /// Video playing and being kept in sync
    Running,
}

pub struct PlaybackController<B: MediaBackend> {
    context: AppContext,
    player: MediaPlayer<B>,
    sync: SyncController,
    environment: Box<dyn EnvironmentApplier>,
    association: Option<VideoAssociation>,
    scene: SceneContext,
    phase: LevelPhase,
}

impl<B: MediaBackend> PlaybackController<B> {
    pub fn new(
        context: AppContext,
        player: MediaPlayer<B>,
        environment: Box<dyn EnvironmentApplier>,
    ) -> Self {
        let sync = SyncController::new(context.settings.sync.clone());
        Self {
            context,
            player,
            sync,
            environment,
            association: None,
            scene: SceneContext::Menu,
            phase: LevelPhase::Inactive,
        }
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut AppContext {
        &mut self.context
    }

    pub fn player(&self) -> &MediaPlayer<B> {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut MediaPlayer<B> {
        &mut self.player
    }

    pub fn association(&self) -> Option<&VideoAssociation> {
        self.association.as_ref()
    }

    pub fn association_mut(&mut self) -> Option<&mut VideoAssociation> {
        self.association.as_mut()
    }

    pub fn scene(&self) -> SceneContext {
        self.scene
    }

    pub fn phase(&self) -> LevelPhase {
        self.phase
    }

    /// Bind an association and start preparing its video.
    /// Returns false when nothing will play (disabled, not downloaded, no path).
    pub fn load_video(&mut self, association: VideoAssociation) -> bool {
        self.player.stop();
        self.player.reset_playback_speed();
        self.player.set_out_of_sync_frames(0);
        self.phase = LevelPhase::Inactive;

        let source = association.video_path();
        self.sync.configure(association.offset_seconds(), association.looping);
        self.player.set_looping(association.looping);
        self.association = Some(association);
        self.apply_placement();

        if !self.context.is_enabled() {
            debug!("Video playback disabled, not preparing");
            return false;
        }

        let Some(association) = self.association.as_ref() else {
            return false;
        };
        if !association.is_playable() {
            info!(
                video_id = %association.video_id,
                state = ?association.download_state,
                "Video not downloaded"
            );
            return false;
        }
        let Some(source) = source else {
            warn!(video_id = %association.video_id, "Video has no path");
            return false;
        };

        self.player.set_source(&source.to_url());
        self.player.prepare();
        true
    }

    /// Drop the current association and stop its video
    pub fn unload_video(&mut self) {
        self.stop_level();
        self.player.set_source("");
        self.association = None;
        if self.scene == SceneContext::Gameplay {
            self.environment.reset();
        }
    }

    /// Host scene transition
    pub fn on_context_changed(&mut self, scene: SceneContext) {
        debug!(?scene, "Scene context changed");
        self.scene = scene;
        self.player.set_placement_defaults(scene.placement_defaults());

        match scene {
            SceneContext::Menu => {
                self.stop_level();
                self.environment.reset();
            }
            SceneContext::Gameplay => {
                if self.context.is_enabled() {
                    if let Some(association) = &self.association {
                        self.environment.apply(
                            association.environment_modifications(),
                            association.disable_big_mirror_override.unwrap_or(false),
                        );
                    }
                }
            }
        }
        self.apply_placement();

        if self.context.is_enabled() {
            self.player.show();
        } else {
            self.player.hide();
        }
    }

    /// Level audio started; the video starts once its offset is reached
    pub fn start_level(&mut self) {
        let playable = self.context.is_enabled()
            && self.association.as_ref().map_or(false, VideoAssociation::is_playable);
        self.phase = if playable {
            LevelPhase::WaitingForStart
        } else {
            LevelPhase::Inactive
        };
    }

    pub fn pause_level(&mut self) {
        self.player.pause();
    }

    pub fn resume_level(&mut self) {
        if self.phase == LevelPhase::Running && self.player.state().is_paused() {
            if let Err(err) = self.player.play() {
                warn!(%err, "Could not resume video");
            }
        }
    }

    pub fn stop_level(&mut self) {
        self.player.stop();
        self.player.reset_playback_speed();
        self.player.set_out_of_sync_frames(0);
        self.phase = LevelPhase::Inactive;
    }

    /// Per-frame update with the level's authoritative audio time
    pub fn tick(&mut self, audio_time: Seconds) -> SyncAction {
        if let Err(err) = self.player.poll_events() {
            warn!(%err, "Continuing without video");
            self.phase = LevelPhase::Inactive;
            return SyncAction::Waiting;
        }

        if !self.context.is_enabled() {
            return SyncAction::Waiting;
        }

        match self.phase {
            LevelPhase::Inactive => SyncAction::Waiting,
            LevelPhase::WaitingForStart => {
                self.start_when_due(audio_time);
                SyncAction::Waiting
            }
            LevelPhase::Running => self.sync.tick(&mut self.player, audio_time),
        }
    }

    /// A stopped player counts as ready: the backend re-prepares on play
    fn start_when_due(&mut self, audio_time: Seconds) {
        if !self.player.state().can_play() {
            return;
        }
        let expected = self.sync.expected_video_time(audio_time, self.player.length());
        if expected < 0.0 {
            return;
        }

        self.player.set_time(expected);
        match self.player.play() {
            Ok(()) => {
                debug!(expected, "Video started");
                self.phase = LevelPhase::Running;
            }
            Err(err) => warn!(%err, "Could not start video"),
        }
    }

    /// Place the screen for the current scene, honouring the association's
    /// overrides during gameplay
    fn apply_placement(&mut self) {
        match (&self.association, self.scene) {
            (Some(association), SceneContext::Gameplay) => self.player.set_placement(
                association.screen_position,
                association.screen_rotation,
                association.screen_height,
            ),
            _ => self
                .player
                .set_placement(Override::Inherit, Override::Inherit, Override::Inherit),
        }
    }
}
