//! Scripted backend for tests. Its clock advances only when told to, at
//! `speed × rate_error` seconds per second.

use crossbeam::channel::Sender;

use crate::core::Seconds;
use crate::playback::backend::{event_channel, BackendEvent, MediaBackend};
use crate::playback::player::MediaPlayer;
use crate::render::screen::{MaterialHandle, MaterialSource};

pub(crate) struct FakeBackend {
    events: Sender<BackendEvent>,
    pub source: String,
    pub time: Seconds,
    pub length: Seconds,
    pub speed: f64,
    /// Multiplier on the clock, 1.02 for a video running 2% fast
    pub rate_error: f64,
    pub frame_rate: f64,
    pub resolution: Option<(u32, u32)>,
    pub playing: bool,
    pub looping: bool,
    pub frame_events: bool,
    pub volume: f32,
    pub pan: f32,
    pub seeks: Vec<Seconds>,
}

impl FakeBackend {
    pub fn new(events: Sender<BackendEvent>) -> Self {
        Self {
            events,
            source: String::new(),
            time: 0.0,
            length: 0.0,
            speed: 1.0,
            rate_error: 1.0,
            frame_rate: 30.0,
            resolution: Some((1920, 1080)),
            playing: false,
            looping: false,
            frame_events: false,
            volume: 1.0,
            pan: 0.0,
            seeks: Vec::new(),
        }
    }

    pub fn send(&self, event: BackendEvent) {
        let _ = self.events.send(event);
    }

    pub fn complete_prepare(&self) {
        self.send(BackendEvent::PrepareCompleted);
    }

    /// Report start plus the first frame (only if frame events are enabled)
    pub fn present_first_frame(&self) {
        self.send(BackendEvent::Started);
        if self.frame_events {
            self.send(BackendEvent::FrameReady { frame: 0 });
        }
    }

    pub fn advance(&mut self, dt: Seconds) {
        if self.playing {
            self.time += dt * self.speed * self.rate_error;
        }
    }
}

impl MediaBackend for FakeBackend {
    fn set_source(&mut self, url: &str) {
        self.source = url.to_string();
    }

    fn source(&self) -> &str {
        &self.source
    }

    fn prepare(&mut self) {}

    fn play(&mut self) {
        self.playing = true;
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn stop(&mut self) {
        self.playing = false;
        self.time = 0.0;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn time(&self) -> Seconds {
        self.time
    }

    fn set_time(&mut self, seconds: Seconds) {
        self.time = seconds;
        self.seeks.push(seconds);
    }

    fn length(&self) -> Seconds {
        self.length
    }

    fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    fn resolution(&self) -> Option<(u32, u32)> {
        self.resolution
    }

    fn playback_speed(&self) -> f64 {
        self.speed
    }

    fn set_playback_speed(&mut self, speed: f64) {
        self.speed = speed;
    }

    fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    fn set_frame_events(&mut self, enabled: bool) {
        self.frame_events = enabled;
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    fn set_pan_stereo(&mut self, pan: f32) {
        self.pan = pan;
    }
}

pub(crate) struct TestMaterials;

impl MaterialSource for TestMaterials {
    fn load_screen_material(&self) -> Option<MaterialHandle> {
        Some(MaterialHandle(1))
    }
}

/// Idle player over a fresh fake backend
pub(crate) fn test_player() -> MediaPlayer<FakeBackend> {
    let (tx, rx) = event_channel();
    MediaPlayer::new(FakeBackend::new(tx), rx, &TestMaterials, 0.8)
}

/// Player that has been prepared, started and shown its first frame
pub(crate) fn playing_player() -> MediaPlayer<FakeBackend> {
    let mut player = test_player();
    player.set_source("video.mp4");
    player.prepare();
    player.backend().complete_prepare();
    player.poll_events().unwrap();
    player.play().unwrap();
    player.backend().present_first_frame();
    player.poll_events().unwrap();
    player
}
