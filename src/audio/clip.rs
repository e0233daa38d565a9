//! Audio clip references and the resource-store seam
//!
//! A [`Clip`] is an opaque handle to a loaded asset: the engine only needs
//! its identity, display name, and length. Decoded sample data stays behind
//! the playback device.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Reference to a loaded audio asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clip {
    /// Stable identity, assigned at load time
    pub id: Uuid,

    /// Asset name, used for cache keys and display
    pub name: String,

    /// Total playback length
    pub length: Duration,
}

impl Clip {
    pub fn new(name: impl Into<String>, length: Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            length,
        }
    }
}

/// Key→asset lookup consumed by the channel pool
///
/// Implementations may be slow (disk, network); the engine performs each
/// lookup at most once per key and caches the result. A `None` result
/// propagates as a no-op play request, never as an error.
pub trait ClipStore: Send + Sync {
    fn load(&self, name: &str) -> Option<Arc<Clip>>;
}

/// In-memory clip registry
///
/// Hosts that create clips programmatically register them here and hand the
/// store to the engine.
#[derive(Debug, Default)]
pub struct MemoryClipStore {
    clips: HashMap<String, Arc<Clip>>,
}

impl MemoryClipStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a clip under its own name, returning the shared handle
    pub fn register(&mut self, clip: Clip) -> Arc<Clip> {
        let clip = Arc::new(clip);
        self.clips.insert(clip.name.clone(), Arc::clone(&clip));
        clip
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}

impl ClipStore for MemoryClipStore {
    fn load(&self, name: &str) -> Option<Arc<Clip>> {
        self.clips.get(name).cloned()
    }
}

// ========================================
// Tests
// ========================================
