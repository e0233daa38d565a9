//! Configuration for the audio layer
//!
//! All settings are plain numeric/boolean values with built-in defaults,
//! deserializable from a TOML file. Hosts that configure the engine
//! programmatically can build [`AudioSettings`] directly; hosts that ship a
//! config file use [`AudioSettings::from_toml_file`].
//!
//! Durations are expressed in seconds (f64) on the wire and converted to
//! `std::time::Duration` through the accessor methods, which clamp negative
//! values to zero.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Engine settings with documented defaults
///
/// Defaults: 4 channels (channel 0 reserved for music), 0.5 s channel-level
/// fade-in/out, 3 s playlist crossfade, shuffle off.
#[derive(Debug, Clone, Deserialize)]
pub struct AudioSettings {
    /// Number of playback channels, fixed for the life of the pool
    #[serde(default = "default_channel_count")]
    pub channel_count: usize,

    /// Channel-level fade-in duration in seconds
    #[serde(default = "default_fade_secs")]
    pub fade_in_secs: f64,

    /// Channel-level fade-out duration in seconds
    #[serde(default = "default_fade_secs")]
    pub fade_out_secs: f64,

    /// Playlist crossfade duration in seconds
    #[serde(default = "default_crossfade_secs")]
    pub crossfade_secs: f64,

    /// Playlist shuffle flag
    #[serde(default)]
    pub shuffle: bool,
}

fn default_channel_count() -> usize {
    4
}

fn default_fade_secs() -> f64 {
    0.5
}

fn default_crossfade_secs() -> f64 {
    3.0
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            channel_count: default_channel_count(),
            fade_in_secs: default_fade_secs(),
            fade_out_secs: default_fade_secs(),
            crossfade_secs: default_crossfade_secs(),
            shuffle: false,
        }
    }
}

impl AudioSettings {
    /// Load settings from a TOML file
    ///
    /// Missing fields fall back to their defaults; a missing file is an
    /// `Error::Io`, malformed TOML an `Error::Config`.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let settings: AudioSettings = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;

        info!(path = %path.display(), "loaded audio settings");
        Ok(settings)
    }

    /// Channel-level fade-in duration
    pub fn fade_in(&self) -> Duration {
        Duration::from_secs_f64(self.fade_in_secs.max(0.0))
    }

    /// Channel-level fade-out duration
    pub fn fade_out(&self) -> Duration {
        Duration::from_secs_f64(self.fade_out_secs.max(0.0))
    }

    /// Playlist crossfade duration
    pub fn crossfade(&self) -> Duration {
        Duration::from_secs_f64(self.crossfade_secs.max(0.0))
    }
}

// ========================================
// Tests
// ========================================
