//! Playback channel
//!
//! One channel owns one playback device and layers three pieces of state on
//! top of it: transport (play/pause/stop with idempotent diagnostics), a
//! fade state machine driven once per tick, and an edge-triggered finished
//! detector that fires exactly once per play request.
//!
//! # Finished detection
//!
//! `finished` is an edge, not a level: the detector fires on the tick where
//! normalized progress first reaches 1.0 while the channel was in a playing
//! state, latches until the next `play_clip`, and exposes the edge for one
//! tick through [`Channel::take_finished`].

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::audio::clip::Clip;
use crate::audio::device::PlaybackDevice;
use crate::playback::fade::{Fade, FadeState};

/// One independent playback line bound to a single device
pub struct Channel {
    device: Box<dyn PlaybackDevice>,
    clip: Option<Arc<Clip>>,
    volume: f32,
    muted: bool,
    playing: bool,

    fade: Option<Fade>,
    fade_state: FadeState,
    fade_in_duration: Duration,
    fade_out_duration: Duration,

    // Edge detector: `finished_fired` latches per clip, `finished_edge`
    // stays set for exactly one tick.
    finished_fired: bool,
    finished_edge: bool,
}

impl Channel {
    pub fn new(
        device: Box<dyn PlaybackDevice>,
        fade_in_duration: Duration,
        fade_out_duration: Duration,
    ) -> Self {
        Self {
            device,
            clip: None,
            volume: 1.0,
            muted: false,
            playing: false,
            fade: None,
            fade_state: FadeState::Idle,
            fade_in_duration,
            fade_out_duration,
            finished_fired: false,
            finished_edge: false,
        }
    }

    /// Set the clip and start playback from the top
    ///
    /// Cancels any in-flight fade so a stale ramp cannot write volume after
    /// the new clip has started. Resets the finished detector.
    pub fn play_clip(&mut self, clip: Arc<Clip>) {
        self.fade = None;
        self.fade_state = FadeState::Idle;
        self.finished_fired = false;
        self.finished_edge = false;

        self.device.set_clip(Some(Arc::clone(&clip)));
        self.clip = Some(clip);
        self.device.start();
        self.playing = true;
    }

    /// Start or resume playback of the current clip
    ///
    /// No-op with a diagnostic when no clip is set.
    pub fn play(&mut self) {
        if self.clip.is_none() {
            debug!("no clip set on channel");
            return;
        }
        self.device.start();
        self.playing = true;
    }

    /// Pause playback, keeping the position
    pub fn pause(&mut self) {
        if self.playing {
            self.device.pause();
            self.playing = false;
        } else {
            debug!("channel is already paused or stopped");
        }
    }

    /// Stop playback, resetting the position
    pub fn stop(&mut self) {
        if self.playing {
            self.device.stop();
            self.playing = false;
        } else {
            debug!("channel is already paused or stopped");
        }
    }

    pub fn set_mute(&mut self, mute: bool) {
        self.muted = mute;
        self.device.set_mute(mute);
    }

    pub fn muted(&self) -> bool {
        self.muted
    }

    /// Set the channel volume, clamped to [0, 1]
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        self.device.set_volume(self.volume);
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn set_pitch(&mut self, pitch: f32) {
        self.device.set_pitch(pitch);
    }

    /// Linearly ramp volume from `from` to `to` over `duration`
    ///
    /// The ramp is sampled once per tick. A non-positive duration (or equal
    /// endpoints) snaps to `to` on the spot with no fade installed.
    pub fn fade_to(&mut self, from: f32, to: f32, duration: Duration, now: Instant) {
        let from = from.clamp(0.0, 1.0);
        let to = to.clamp(0.0, 1.0);

        if duration.is_zero() || from == to {
            self.set_volume(to);
            self.fade = None;
            self.fade_state = FadeState::Idle;
            return;
        }

        self.set_volume(from);
        self.fade = Some(Fade::new(from, to, duration, now));
        self.fade_state = if to > from {
            FadeState::FadingIn
        } else {
            FadeState::FadingOut
        };
    }

    /// Fade from the current volume to full over the configured in-duration
    pub fn fade_in(&mut self, now: Instant) {
        self.fade_to(self.volume, 1.0, self.fade_in_duration, now);
    }

    /// Fade from the current volume to silence over the configured
    /// out-duration
    pub fn fade_out(&mut self, now: Instant) {
        self.fade_to(self.volume, 0.0, self.fade_out_duration, now);
    }

    pub fn fade_state(&self) -> FadeState {
        self.fade_state
    }

    pub fn set_fade_durations(&mut self, fade_in: Duration, fade_out: Duration) {
        self.fade_in_duration = fade_in;
        self.fade_out_duration = fade_out;
    }

    /// Normalized playback progress in [0, 1]
    ///
    /// 0 when no clip is set; a zero-length clip counts as finished.
    pub fn progress(&self) -> f32 {
        match &self.clip {
            None => 0.0,
            Some(clip) if clip.length.is_zero() => 1.0,
            Some(clip) => {
                (self.device.position().as_secs_f32() / clip.length.as_secs_f32()).min(1.0)
            }
        }
    }

    /// Whether playback progress has reached the end of the clip
    pub fn is_finished(&self) -> bool {
        self.clip.is_some() && self.progress() >= 1.0
    }

    /// Elapsed playback time of the current clip
    pub fn play_time(&self) -> Duration {
        self.device.position()
    }

    /// Length of the current clip, if one is set
    pub fn clip_length(&self) -> Option<Duration> {
        self.clip.as_ref().map(|c| c.length)
    }

    pub fn clip(&self) -> Option<&Arc<Clip>> {
        self.clip.as_ref()
    }

    pub fn playing(&self) -> bool {
        self.playing
    }

    /// Advance fades and the finished detector by one scheduling tick
    ///
    /// Returns `true` exactly on the tick where the current clip finishes;
    /// the same edge stays readable through [`Channel::take_finished`] until
    /// the next tick.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.finished_edge = false;

        if let Some(fade) = self.fade {
            let volume = fade.volume_at(now);
            self.volume = volume;
            self.device.set_volume(volume);

            if fade.is_complete(now) {
                self.volume = fade.target();
                self.device.set_volume(self.volume);
                self.fade = None;
                self.fade_state = FadeState::Idle;
            }
        }

        if self.playing && !self.finished_fired && self.is_finished() {
            self.finished_fired = true;
            self.finished_edge = true;
            self.playing = false;
            if let Some(clip) = &self.clip {
                debug!(clip = %clip.name, "clip finished");
            }
        }

        self.finished_edge
    }

    /// Consume the finished edge raised by the current tick
    pub fn take_finished(&mut self) -> bool {
        std::mem::take(&mut self.finished_edge)
    }
}

/// Shared handle to a channel
///
/// The pool keeps one handle per channel for group mutes and routing; the
/// playlist controller holds the music channel's handle as its exclusive
/// playback owner (by convention, nothing else issues transport commands on
/// it). Lock scopes are per-call and never span a tick.
#[derive(Clone)]
pub struct ChannelHandle(Arc<RwLock<Channel>>);

impl ChannelHandle {
    pub fn new(channel: Channel) -> Self {
        Self(Arc::new(RwLock::new(channel)))
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Channel> {
        self.0.read().expect("channel lock poisoned")
    }

    pub fn lock(&self) -> RwLockWriteGuard<'_, Channel> {
        self.0.write().expect("channel lock poisoned")
    }
}

// ========================================
// Tests
// ========================================
