//! Test helpers for audiolayer integration tests
//!
//! Provides a controllable playback device double, a pre-registered clip
//! store, and a fixed-timestep simulation harness that advances devices and
//! the engine in lockstep on a virtual timeline.

// Each integration test binary compiles this module and uses a subset.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use audiolayer::audio::{Clip, ClipStore, MemoryClipStore, PlaybackDevice};
use audiolayer::{AudioEngine, AudioSettings};

#[derive(Debug, Default)]
struct FakeDeviceState {
    clip: Option<Arc<Clip>>,
    playing: bool,
    position: Duration,
    volume: f32,
    pitch: f32,
    muted: bool,
}

/// Playback device double with externally driven position
///
/// Clones share state: the engine owns one clone, the test keeps another to
/// advance time and observe what the device was told.
#[derive(Clone, Default)]
pub struct FakeDevice(Arc<Mutex<FakeDeviceState>>);

impl FakeDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the playback position by `dt` while playing, capped at the
    /// clip length
    pub fn advance(&self, dt: Duration) {
        let mut s = self.0.lock().unwrap();
        if s.playing {
            let length = s.clip.as_ref().map(|c| c.length).unwrap_or(Duration::ZERO);
            s.position = (s.position + dt).min(length);
        }
    }

    pub fn volume(&self) -> f32 {
        self.0.lock().unwrap().volume
    }

    pub fn pitch(&self) -> f32 {
        self.0.lock().unwrap().pitch
    }

    pub fn muted(&self) -> bool {
        self.0.lock().unwrap().muted
    }

    pub fn playing(&self) -> bool {
        self.0.lock().unwrap().playing
    }

    pub fn position(&self) -> Duration {
        self.0.lock().unwrap().position
    }

    pub fn clip_name(&self) -> Option<String> {
        self.0.lock().unwrap().clip.as_ref().map(|c| c.name.clone())
    }
}

impl PlaybackDevice for FakeDevice {
    fn set_clip(&mut self, clip: Option<Arc<Clip>>) {
        let mut s = self.0.lock().unwrap();
        s.clip = clip;
        s.position = Duration::ZERO;
    }

    fn start(&mut self) {
        self.0.lock().unwrap().playing = true;
    }

    fn pause(&mut self) {
        self.0.lock().unwrap().playing = false;
    }

    fn stop(&mut self) {
        let mut s = self.0.lock().unwrap();
        s.playing = false;
        s.position = Duration::ZERO;
    }

    fn set_volume(&mut self, volume: f32) {
        self.0.lock().unwrap().volume = volume;
    }

    fn set_pitch(&mut self, pitch: f32) {
        self.0.lock().unwrap().pitch = pitch;
    }

    fn set_mute(&mut self, mute: bool) {
        self.0.lock().unwrap().muted = mute;
    }

    fn is_playing(&self) -> bool {
        self.0.lock().unwrap().playing
    }

    fn position(&self) -> Duration {
        self.0.lock().unwrap().position
    }

    fn length(&self) -> Duration {
        let s = self.0.lock().unwrap();
        s.clip.as_ref().map(|c| c.length).unwrap_or(Duration::ZERO)
    }
}

/// Clip store that counts lookups reaching the backing store
pub struct CountingStore {
    inner: MemoryClipStore,
    pub fetches: Arc<AtomicUsize>,
}

impl CountingStore {
    pub fn new(inner: MemoryClipStore) -> Self {
        Self {
            inner,
            fetches: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl ClipStore for CountingStore {
    fn load(&self, name: &str) -> Option<Arc<Clip>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.inner.load(name)
    }
}

/// Fixed-timestep simulation over a virtual timeline
///
/// Each step advances every fake device by `dt`, then ticks the engine at
/// the new virtual now, mirroring a host that polls its audio sources once
/// per frame.
pub struct Sim {
    pub engine: AudioEngine,
    pub devices: Vec<FakeDevice>,
    pub now: Instant,
}

impl Sim {
    /// Build a simulation with fake devices on every channel and the given
    /// clips registered in the store
    pub fn new(settings: AudioSettings, clips: &[(&str, Duration)]) -> (Self, Vec<Arc<Clip>>) {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let mut store = MemoryClipStore::new();
        let handles: Vec<Arc<Clip>> = clips
            .iter()
            .map(|(name, length)| store.register(Clip::new(*name, *length)))
            .collect();

        let devices = Arc::new(Mutex::new(Vec::new()));
        let engine = {
            let devices = Arc::clone(&devices);
            AudioEngine::new(settings, Box::new(store), move |_| {
                let device = FakeDevice::new();
                devices.lock().unwrap().push(device.clone());
                Box::new(device)
            })
        };

        let devices = devices.lock().unwrap().clone();
        let sim = Self {
            engine,
            devices,
            now: Instant::now(),
        };
        (sim, handles)
    }

    pub fn music_device(&self) -> &FakeDevice {
        &self.devices[0]
    }

    /// Advance the simulation by one step of `dt`
    pub fn step(&mut self, dt: Duration) {
        self.now += dt;
        for device in &self.devices {
            device.advance(dt);
        }
        self.engine.tick(self.now);
    }

    /// Run the simulation for `duration` in steps of `dt`
    pub fn run_for(&mut self, duration: Duration, dt: Duration) {
        let steps = (duration.as_secs_f64() / dt.as_secs_f64()).round() as u64;
        for _ in 0..steps {
            self.step(dt);
        }
    }
}
