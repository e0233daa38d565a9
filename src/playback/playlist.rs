//! Playlist controller
//!
//! Drives one channel through a continuous sequence of tracks: fade-in
//! after each track starts, fade-out once the time remaining drops to the
//! crossfade duration, advance on the channel's finished edge. The fades
//! run sequentially across the track boundary (the outgoing ramp completes
//! at the clip's natural end before the next clip fades in), which keeps a
//! single channel sufficient for gapless music.
//!
//! The controller is advanced by the external scheduling tick, after the
//! pool's tick in the same frame so a finished edge is consumed the tick it
//! fires.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::audio::clip::Clip;
use crate::config::AudioSettings;
use crate::events::{AudioEvent, EventBus};
use crate::playback::channel::ChannelHandle;

/// Progression state of the playlist controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaylistState {
    Stopped,
    Playing,
    Crossfading,
}

impl std::fmt::Display for PlaylistState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaylistState::Stopped => write!(f, "stopped"),
            PlaylistState::Playing => write!(f, "playing"),
            PlaylistState::Crossfading => write!(f, "crossfading"),
        }
    }
}

/// Sequencer for continuous music playback on one bound channel
pub struct PlaylistController {
    tracks: Vec<Arc<Clip>>,
    cursor: Option<usize>,
    shuffle: bool,
    crossfade: Duration,
    state: PlaylistState,
    channel: ChannelHandle,
    events: EventBus,
}

impl PlaylistController {
    /// Bind the controller to its music channel
    ///
    /// The channel's fade durations are set to the playlist crossfade
    /// duration so `fade_in`/`fade_out` ramp over the crossfade window.
    pub fn new(channel: ChannelHandle, settings: &AudioSettings, events: EventBus) -> Self {
        let crossfade = settings.crossfade();
        channel.lock().set_fade_durations(crossfade, crossfade);

        Self {
            tracks: Vec::new(),
            cursor: None,
            shuffle: settings.shuffle,
            crossfade,
            state: PlaylistState::Stopped,
            channel,
            events,
        }
    }

    // ========================================
    // Track list editing
    // ========================================

    /// Append tracks, skipping clips already in the list
    pub fn add_tracks<I>(&mut self, clips: I)
    where
        I: IntoIterator<Item = Arc<Clip>>,
    {
        for clip in clips {
            if self.tracks.iter().any(|t| t.id == clip.id) {
                debug!(track = %clip.name, "track already in playlist, skipped");
                continue;
            }
            self.tracks.push(clip);
        }
    }

    /// Remove the track at `index`; out of range is a logged no-op
    ///
    /// The cursor stays on the same track where possible, clamps to the new
    /// last index otherwise, and resets when the list becomes empty.
    pub fn remove_track(&mut self, index: usize) {
        if index >= self.tracks.len() {
            warn!(index, "remove request for out-of-range track dropped");
            return;
        }
        self.tracks.remove(index);

        self.cursor = match self.cursor {
            None => None,
            Some(_) if self.tracks.is_empty() => None,
            Some(c) if c > index => Some(c - 1),
            Some(c) if c >= self.tracks.len() => Some(self.tracks.len() - 1),
            Some(c) => Some(c),
        };
    }

    pub fn tracks_count(&self) -> usize {
        self.tracks.len()
    }

    pub fn tracks(&self) -> &[Arc<Clip>] {
        &self.tracks
    }

    pub fn track_name(&self, index: usize) -> Option<&str> {
        self.tracks.get(index).map(|t| t.name.as_str())
    }

    /// Track at the cursor, if one is selected
    pub fn current_track(&self) -> Option<Arc<Clip>> {
        self.cursor.and_then(|c| self.tracks.get(c)).cloned()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    // ========================================
    // Transport
    // ========================================

    /// Start playback at the cursor, selecting one when none is set
    ///
    /// Resumes a paused track in place; otherwise starts the current track
    /// from the top with a fade-in.
    pub fn play(&mut self, now: Instant) {
        if self.state != PlaylistState::Stopped {
            debug!("playlist is already playing");
            return;
        }
        if self.tracks.is_empty() {
            debug!("playlist is empty");
            return;
        }
        if self.cursor.is_none() {
            self.change_track(true);
        }

        let resume = {
            let channel = self.channel.read();
            match (channel.clip(), self.current_track()) {
                (Some(current), Some(selected)) => {
                    current.id == selected.id
                        && !channel.playing()
                        && channel.progress() > 0.0
                        && !channel.is_finished()
                }
                _ => false,
            }
        };

        if resume {
            self.channel.lock().play();
            self.set_state(PlaylistState::Playing);
        } else {
            self.start_current(now);
        }
    }

    /// Pause the bound channel and halt progression
    ///
    /// Fade state is preserved; `play` picks the track back up.
    pub fn pause(&mut self) {
        self.channel.lock().pause();
        self.set_state(PlaylistState::Stopped);
    }

    /// Move the cursor forward
    ///
    /// Does not itself start playback: the selected track plays once the
    /// current one finishes naturally or `play` is invoked.
    pub fn next(&mut self) {
        self.change_track(true);
    }

    /// Move the cursor backward (same draw as [`Self::next`] under shuffle)
    pub fn previous(&mut self) {
        self.change_track(false);
    }

    /// Advance or rewind the cursor with circular wraparound
    ///
    /// Under shuffle both directions resolve to a uniformly random index;
    /// forward and backward are indistinguishable. An empty list leaves the
    /// cursor unselected.
    pub fn change_track(&mut self, forward: bool) {
        if self.tracks.is_empty() {
            debug!("playlist is empty, cursor unchanged");
            return;
        }

        if self.shuffle {
            self.cursor = Some(rand::thread_rng().gen_range(0..self.tracks.len()));
            return;
        }

        let last = self.tracks.len() - 1;
        self.cursor = Some(match self.cursor {
            None => {
                if forward {
                    0
                } else {
                    last
                }
            }
            Some(c) if forward => {
                if c == last {
                    0
                } else {
                    c + 1
                }
            }
            Some(c) => {
                if c == 0 {
                    last
                } else {
                    c - 1
                }
            }
        });
    }

    pub fn set_shuffle(&mut self, shuffle: bool) {
        self.shuffle = shuffle;
    }

    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    /// Change the crossfade duration, retuning the bound channel's fades
    pub fn set_crossfade(&mut self, crossfade: Duration) {
        self.crossfade = crossfade;
        self.channel.lock().set_fade_durations(crossfade, crossfade);
    }

    pub fn crossfade(&self) -> Duration {
        self.crossfade
    }

    pub fn state(&self) -> PlaylistState {
        self.state
    }

    // ========================================
    // Sequencing
    // ========================================

    /// Advance the state machine by one scheduling tick
    pub fn tick(&mut self, now: Instant) {
        if self.tracks.is_empty() {
            if self.state != PlaylistState::Stopped {
                self.channel.lock().stop();
                self.set_state(PlaylistState::Stopped);
            }
            return;
        }

        match self.state {
            PlaylistState::Stopped => {}

            PlaylistState::Playing => {
                if self.channel.lock().take_finished() {
                    // Covers crossfade durations of zero (or longer than the
                    // remainder observed on the starting tick).
                    self.finish_and_advance(now);
                    return;
                }

                let fade_due = {
                    let channel = self.channel.read();
                    channel.playing()
                        && channel
                            .clip_length()
                            .map(|length| length.saturating_sub(channel.play_time()) <= self.crossfade)
                            .unwrap_or(false)
                };

                if fade_due && !self.crossfade.is_zero() {
                    let fading = self.channel.read().clip().cloned();
                    if let Some(track) = fading {
                        self.channel.lock().fade_out(now);
                        info!(track = %track.name, "crossfade started");
                        self.events.emit_lossy(AudioEvent::CrossfadeStarted {
                            clip_id: track.id,
                            name: track.name.clone(),
                            timestamp: Utc::now(),
                        });
                        self.set_state(PlaylistState::Crossfading);
                    }
                }
            }

            PlaylistState::Crossfading => {
                if self.channel.lock().take_finished() {
                    self.finish_and_advance(now);
                }
            }
        }
    }

    fn finish_and_advance(&mut self, now: Instant) {
        // The channel's clip, not the cursor track: a manual next() or a
        // list edit may have re-pointed the cursor mid-play.
        let finished = self.channel.read().clip().cloned();
        if let Some(track) = finished {
            self.events.emit_lossy(AudioEvent::TrackFinished {
                clip_id: track.id,
                name: track.name.clone(),
                timestamp: Utc::now(),
            });
        }
        self.change_track(true);
        self.start_current(now);
    }

    /// Start the track at the cursor with a fade-in
    fn start_current(&mut self, now: Instant) {
        let Some(track) = self.current_track() else {
            self.set_state(PlaylistState::Stopped);
            return;
        };

        {
            let mut channel = self.channel.lock();
            channel.play_clip(Arc::clone(&track));
            channel.fade_in(now);
        }

        info!(track = %track.name, "track started");
        self.events.emit_lossy(AudioEvent::TrackStarted {
            index: self.cursor.unwrap_or(0),
            clip_id: track.id,
            name: track.name.clone(),
            timestamp: Utc::now(),
        });
        self.set_state(PlaylistState::Playing);
    }

    fn set_state(&mut self, state: PlaylistState) {
        if self.state == state {
            return;
        }
        self.state = state;
        self.events.emit_lossy(AudioEvent::PlaybackStateChanged {
            state,
            timestamp: Utc::now(),
        });
    }
}

// ========================================
// Tests
// ========================================
