//! Playback device abstraction
//!
//! One device backs one channel. The engine treats it as an opaque primitive
//! that streams the set clip and reports elapsed position; platform backends
//! (cpal, a game engine's audio source, a test double) implement this trait
//! at the integration boundary.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::audio::clip::Clip;

/// Per-channel audio output primitive
///
/// Contract:
/// - `set_clip` binds a clip and resets the playback position to zero.
/// - `start` begins playback of the set clip from the current position
///   (resuming after `pause`, from the top after `set_clip` or `stop`).
/// - `stop` halts playback and resets the position; `pause` keeps it.
/// - `position` reports elapsed playback time within the set clip and never
///   exceeds `length`.
pub trait PlaybackDevice: Send + Sync {
    fn set_clip(&mut self, clip: Option<Arc<Clip>>);
    fn start(&mut self);
    fn pause(&mut self);
    fn stop(&mut self);
    fn set_volume(&mut self, volume: f32);
    fn set_pitch(&mut self, pitch: f32);
    fn set_mute(&mut self, mute: bool);
    fn is_playing(&self) -> bool;
    fn position(&self) -> Duration;
    fn length(&self) -> Duration;
}

/// Silent device that advances its position in wall-clock time
///
/// Useful for headless hosts (dedicated servers, CI) that want playlist
/// sequencing without an audio backend.
#[derive(Debug, Default)]
pub struct NullDevice {
    clip: Option<Arc<Clip>>,
    started_at: Option<Instant>,
    accumulated: Duration,
    volume: f32,
    pitch: f32,
    muted: bool,
}

impl NullDevice {
    pub fn new() -> Self {
        Self {
            volume: 1.0,
            pitch: 1.0,
            ..Self::default()
        }
    }

    fn elapsed(&self) -> Duration {
        let running = self
            .started_at
            .map(|t| t.elapsed())
            .unwrap_or(Duration::ZERO);
        self.accumulated + running
    }
}

impl PlaybackDevice for NullDevice {
    fn set_clip(&mut self, clip: Option<Arc<Clip>>) {
        self.clip = clip;
        self.started_at = None;
        self.accumulated = Duration::ZERO;
    }

    fn start(&mut self) {
        if self.started_at.is_none() {
            self.started_at = Some(Instant::now());
        }
    }

    fn pause(&mut self) {
        self.accumulated = self.elapsed();
        self.started_at = None;
    }

    fn stop(&mut self) {
        self.accumulated = Duration::ZERO;
        self.started_at = None;
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    fn set_pitch(&mut self, pitch: f32) {
        self.pitch = pitch;
    }

    fn set_mute(&mut self, mute: bool) {
        self.muted = mute;
    }

    fn is_playing(&self) -> bool {
        self.started_at.is_some() && self.position() < self.length()
    }

    fn position(&self) -> Duration {
        self.elapsed().min(self.length())
    }

    fn length(&self) -> Duration {
        self.clip.as_ref().map(|c| c.length).unwrap_or(Duration::ZERO)
    }
}

// ========================================
// Tests
// ========================================
