//! Channel pool
//!
//! Owns the fixed set of playback channels, the lazily-populated clip cache,
//! and the music/effects group mutes. Play requests are best-effort: an
//! out-of-range channel index or an unresolvable clip name is a logged
//! no-op, never a fault surfaced to gameplay code.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::audio::clip::{Clip, ClipStore};
use crate::audio::device::PlaybackDevice;
use crate::config::AudioSettings;
use crate::events::{AudioEvent, EventBus};
use crate::playback::channel::{Channel, ChannelHandle};

/// Channel index conventionally reserved for music playback
pub const MUSIC_CHANNEL: usize = 0;

/// Fixed-size collection of channels with a shared clip cache
pub struct ChannelPool {
    channels: Vec<ChannelHandle>,
    clips: HashMap<String, Arc<Clip>>,
    store: Box<dyn ClipStore>,
    events: EventBus,
}

impl ChannelPool {
    /// Build the pool, creating every channel eagerly
    ///
    /// `make_device` is invoked once per channel index. The channel count is
    /// fixed for the pool's lifetime; a configured count of zero is raised
    /// to one so the music channel always exists.
    pub fn new<F>(
        settings: &AudioSettings,
        store: Box<dyn ClipStore>,
        mut make_device: F,
        events: EventBus,
    ) -> Self
    where
        F: FnMut(usize) -> Box<dyn PlaybackDevice>,
    {
        let count = settings.channel_count.max(1);
        if count != settings.channel_count {
            warn!(
                configured = settings.channel_count,
                "channel count raised to 1"
            );
        }

        let channels = (0..count)
            .map(|index| {
                ChannelHandle::new(Channel::new(
                    make_device(index),
                    settings.fade_in(),
                    settings.fade_out(),
                ))
            })
            .collect::<Vec<_>>();

        info!(channels = count, "channel pool created");
        Self {
            channels,
            clips: HashMap::new(),
            store,
            events,
        }
    }

    /// Number of channels in the pool
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Handle to the channel at `index`
    pub fn channel(&self, index: usize) -> Option<ChannelHandle> {
        self.channels.get(index).cloned()
    }

    /// Handle to the music channel (index 0, always present)
    pub fn music_channel(&self) -> ChannelHandle {
        self.channels[MUSIC_CHANNEL].clone()
    }

    /// Resolve a clip by name and play it on the given channel
    ///
    /// Best-effort: logs and returns when the index is out of range or the
    /// clip cannot be resolved.
    pub fn play(&mut self, name: &str, channel: usize, pitch: f32, volume: f32) {
        let Some(clip) = self.load(name) else {
            warn!(clip = name, "clip not found, play request dropped");
            return;
        };
        self.play_clip(clip, channel, pitch, volume);
    }

    /// Play an already-resolved clip on the given channel
    pub fn play_clip(&mut self, clip: Arc<Clip>, channel: usize, pitch: f32, volume: f32) {
        let Some(handle) = self.channels.get(channel) else {
            warn!(channel, "play request for out-of-range channel dropped");
            return;
        };

        let mut ch = handle.lock();
        ch.set_pitch(pitch);
        ch.set_volume(volume);
        ch.play_clip(clip);
    }

    /// Pause the channel at `index`; out of range is a logged no-op
    pub fn pause(&mut self, index: usize) {
        match self.channels.get(index) {
            Some(handle) => handle.lock().pause(),
            None => warn!(index, "pause request for out-of-range channel dropped"),
        }
    }

    /// Stop the channel at `index`; out of range is a logged no-op
    pub fn stop(&mut self, index: usize) {
        match self.channels.get(index) {
            Some(handle) => handle.lock().stop(),
            None => warn!(index, "stop request for out-of-range channel dropped"),
        }
    }

    /// Mute or unmute the music channel
    pub fn set_music_enabled(&mut self, enabled: bool) {
        self.channels[MUSIC_CHANNEL].lock().set_mute(!enabled);
    }

    pub fn music_enabled(&self) -> bool {
        !self.channels[MUSIC_CHANNEL].read().muted()
    }

    /// Mute or unmute every channel except the music channel
    pub fn set_sfx_enabled(&mut self, enabled: bool) {
        for handle in self.channels.iter().skip(1) {
            handle.lock().set_mute(!enabled);
        }
    }

    pub fn sfx_enabled(&self) -> bool {
        self.channels
            .get(1)
            .map(|handle| !handle.read().muted())
            .unwrap_or(true)
    }

    /// Resolve a clip through the cache, hitting the store on first lookup
    ///
    /// The cache is keyed by the lookup string, so repeated lookups through
    /// the same alias never fetch twice. A lookup by alias and a later
    /// lookup by the asset's intrinsic name are distinct keys and load
    /// separately. Entries are never evicted.
    pub fn load(&mut self, name: &str) -> Option<Arc<Clip>> {
        if let Some(clip) = self.clips.get(name) {
            return Some(Arc::clone(clip));
        }

        let clip = self.store.load(name)?;
        debug!(clip = name, "cached clip from store");
        self.clips.insert(name.to_string(), Arc::clone(&clip));
        Some(clip)
    }

    /// Number of cached clips
    pub fn cached_clips(&self) -> usize {
        self.clips.len()
    }

    /// Advance every channel by one scheduling tick
    ///
    /// Emits [`AudioEvent::ClipFinished`] for each channel whose clip
    /// reached its end this tick. The finished edge remains consumable on
    /// the channel itself until the next tick.
    pub fn tick(&mut self, now: Instant) {
        for (index, handle) in self.channels.iter().enumerate() {
            let mut channel = handle.lock();
            if channel.tick(now) {
                if let Some(clip) = channel.clip() {
                    self.events.emit_lossy(AudioEvent::ClipFinished {
                        channel: index,
                        clip_id: clip.id,
                        name: clip.name.clone(),
                        timestamp: Utc::now(),
                    });
                }
            }
        }
    }
}

// ========================================
// Tests
// ========================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::clip::MemoryClipStore;
    use crate::audio::device::NullDevice;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Store wrapper that counts lookups reaching the backing store.
    struct CountingStore {
        inner: MemoryClipStore,
        fetches: Arc<AtomicUsize>,
    }

    impl ClipStore for CountingStore {
        fn load(&self, name: &str) -> Option<Arc<Clip>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.inner.load(name)
        }
    }

    fn pool_with_clips(channel_count: usize) -> (ChannelPool, Arc<AtomicUsize>) {
        let mut inner = MemoryClipStore::new();
        inner.register(Clip::new("coin", Duration::from_millis(300)));
        inner.register(Clip::new("theme", Duration::from_secs(10)));

        let fetches = Arc::new(AtomicUsize::new(0));
        let store = CountingStore {
            inner,
            fetches: Arc::clone(&fetches),
        };

        let settings = AudioSettings {
            channel_count,
            ..AudioSettings::default()
        };
        let pool = ChannelPool::new(
            &settings,
            Box::new(store),
            |_| Box::new(NullDevice::new()),
            EventBus::new(16),
        );
        (pool, fetches)
    }

    #[test]
    fn test_channel_count_fixed_and_nonzero() {
        let (pool, _) = pool_with_clips(0);
        assert_eq!(pool.channel_count(), 1);

        let (pool, _) = pool_with_clips(4);
        assert_eq!(pool.channel_count(), 4);
    }

    #[test]
    fn test_channel_out_of_range_is_none() {
        let (pool, _) = pool_with_clips(4);
        assert!(pool.channel(3).is_some());
        assert!(pool.channel(4).is_none());
    }

    #[test]
    fn test_load_caches_on_first_lookup() {
        let (mut pool, fetches) = pool_with_clips(4);

        let first = pool.load("coin").unwrap();
        let second = pool.load("coin").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
        assert_eq!(pool.cached_clips(), 1);
    }

    #[test]
    fn test_load_missing_does_not_cache() {
        let (mut pool, fetches) = pool_with_clips(4);

        assert!(pool.load("missing").is_none());
        assert!(pool.load("missing").is_none());

        // Not-found results are not cached; both lookups hit the store.
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
        assert_eq!(pool.cached_clips(), 0);
    }

    #[test]
    fn test_play_out_of_range_channel_is_noop() {
        let (mut pool, fetches) = pool_with_clips(2);
        pool.play("coin", 7, 1.0, 1.0);
        pool.pause(7);
        pool.stop(7);
        // The clip still resolved before routing failed.
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_play_missing_clip_is_noop() {
        let (mut pool, _) = pool_with_clips(2);
        pool.play("missing", 1, 1.0, 1.0);
        assert!(!pool.channel(1).unwrap().read().playing());
    }

    #[test]
    fn test_play_sets_volume_and_starts() {
        let (mut pool, _) = pool_with_clips(2);
        pool.play("coin", 1, 1.0, 0.6);

        let handle = pool.channel(1).unwrap();
        let channel = handle.read();
        assert!(channel.playing());
        assert_eq!(channel.volume(), 0.6);
    }

    #[test]
    fn test_music_mute_only_touches_channel_zero() {
        let (mut pool, _) = pool_with_clips(4);

        pool.set_music_enabled(false);
        assert!(!pool.music_enabled());
        for i in 1..4 {
            assert!(!pool.channel(i).unwrap().read().muted());
        }

        pool.set_music_enabled(true);
        assert!(pool.music_enabled());
    }

    #[test]
    fn test_sfx_mute_spares_music_channel() {
        let (mut pool, _) = pool_with_clips(4);

        pool.set_sfx_enabled(false);
        assert!(!pool.sfx_enabled());
        assert!(pool.music_enabled());
        for i in 1..4 {
            assert!(pool.channel(i).unwrap().read().muted());
        }

        pool.set_sfx_enabled(true);
        assert!(pool.sfx_enabled());
    }
}
