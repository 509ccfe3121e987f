use std::time::Instant;

use stamp_engine::{LocalMedia, PlaybackControl, PlayerBackend};
use tracing::debug;

/// Headless player that advances a wall clock while playing.
#[derive(Debug)]
pub struct SimulatedPlayer {
    duration: f64,
    offset: f64,
    started: Option<Instant>,
}

impl SimulatedPlayer {
    pub fn new(duration: f64) -> Self {
        Self {
            duration: duration.max(0.0),
            offset: 0.0,
            started: None,
        }
    }
}

impl PlaybackControl for SimulatedPlayer {
    fn is_ready(&self) -> bool {
        true
    }

    fn current_time(&self) -> f64 {
        let elapsed = self
            .started
            .map_or(0.0, |started| started.elapsed().as_secs_f64());
        (self.offset + elapsed).min(self.duration)
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn seek_to(&mut self, seconds: f64, _allow_seek_ahead: bool) {
        self.offset = seconds.clamp(0.0, self.duration);
        if self.started.is_some() {
            self.started = Some(Instant::now());
        }
    }

    fn play(&mut self) {
        if self.started.is_none() {
            self.started = Some(Instant::now());
        }
    }

    fn pause(&mut self) {
        self.offset = self.current_time();
        self.started = None;
    }
}

/// Opens a [`SimulatedPlayer`] of fixed length for every source.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedBackend {
    duration: f64,
}

impl SimulatedBackend {
    pub fn new(duration: f64) -> Self {
        Self { duration }
    }
}

impl PlayerBackend for SimulatedBackend {
    fn open_remote(&mut self, video_id: &str) -> Box<dyn PlaybackControl> {
        debug!(%video_id, duration = self.duration, "simulated remote player opened");
        Box::new(SimulatedPlayer::new(self.duration))
    }

    fn open_local(&mut self, media: &LocalMedia) -> Box<dyn PlaybackControl> {
        debug!(path = ?media.path(), duration = self.duration, "simulated media element opened");
        Box::new(SimulatedPlayer::new(self.duration))
    }
}
