//! Engine composition root
//!
//! [`AudioEngine`] is built once by the host application and passed
//! explicitly to whatever needs it; the crate has no global state. It owns
//! the channel pool and the playlist controller, wires the playlist to the
//! music channel, and funnels the host's per-frame tick to both in the
//! order that lets a finished edge be consumed on the tick it fires.

use std::time::Instant;

use tracing::info;

use crate::audio::clip::ClipStore;
use crate::audio::device::PlaybackDevice;
use crate::config::AudioSettings;
use crate::events::EventBus;
use crate::playback::playlist::PlaylistController;
use crate::playback::pool::ChannelPool;

const EVENT_BUS_CAPACITY: usize = 256;

/// Top-level audio layer: channel pool + playlist controller + event bus
pub struct AudioEngine {
    pool: ChannelPool,
    playlist: PlaylistController,
    events: EventBus,
}

impl AudioEngine {
    /// Build the engine
    ///
    /// `make_device` is called once per channel index to bind each channel
    /// to its platform output primitive.
    pub fn new<F>(settings: AudioSettings, store: Box<dyn ClipStore>, make_device: F) -> Self
    where
        F: FnMut(usize) -> Box<dyn PlaybackDevice>,
    {
        let events = EventBus::new(EVENT_BUS_CAPACITY);
        let pool = ChannelPool::new(&settings, store, make_device, events.clone());
        let playlist = PlaylistController::new(pool.music_channel(), &settings, events.clone());

        info!(channels = pool.channel_count(), "audio engine ready");
        Self {
            pool,
            playlist,
            events,
        }
    }

    /// Advance the whole engine by one scheduling tick
    ///
    /// Call once per rendered frame or fixed timestep with a monotonic
    /// timestamp. Channels tick first (fades, finished edges), then the
    /// playlist consumes its channel's edge.
    pub fn tick(&mut self, now: Instant) {
        self.pool.tick(now);
        self.playlist.tick(now);
    }

    pub fn pool(&self) -> &ChannelPool {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut ChannelPool {
        &mut self.pool
    }

    pub fn playlist(&self) -> &PlaylistController {
        &self.playlist
    }

    pub fn playlist_mut(&mut self) -> &mut PlaylistController {
        &mut self.playlist
    }

    /// Bus handle for event subscribers
    pub fn events(&self) -> &EventBus {
        &self.events
    }
}
