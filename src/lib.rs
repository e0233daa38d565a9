//! # audiolayer
//!
//! Audio playback layer for interactive applications: a fixed pool of
//! mixable playback channels plus a playlist engine that crossfades between
//! tracks on one designated channel.
//!
//! **Architecture:** single-threaded cooperative scheduling. The host calls
//! [`AudioEngine::tick`] once per frame with a monotonic timestamp; fades
//! and sequencing are recomputed from elapsed time rather than run on
//! background threads. Platform audio output and asset loading stay behind
//! the [`audio::PlaybackDevice`] and [`audio::ClipStore`] traits.
//!
//! ```
//! use std::time::{Duration, Instant};
//! use audiolayer::audio::{Clip, MemoryClipStore, NullDevice};
//! use audiolayer::{AudioEngine, AudioSettings};
//!
//! let mut store = MemoryClipStore::new();
//! let theme = store.register(Clip::new("theme", Duration::from_secs(90)));
//! store.register(Clip::new("coin", Duration::from_millis(300)));
//!
//! let mut engine = AudioEngine::new(
//!     AudioSettings::default(),
//!     Box::new(store),
//!     |_| Box::new(NullDevice::new()),
//! );
//!
//! engine.playlist_mut().add_tracks([theme]);
//! engine.playlist_mut().play(Instant::now());
//! engine.pool_mut().play("coin", 1, 1.0, 0.8);
//!
//! // Per frame:
//! engine.tick(Instant::now());
//! ```

pub mod audio;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod playback;

pub use config::AudioSettings;
pub use engine::AudioEngine;
pub use error::{Error, Result};
