//! Event system for the audio layer
//!
//! One-to-many event broadcasting over `tokio::sync::broadcast`. The bus is
//! constructed by the composition root ([`crate::engine::AudioEngine`]) and
//! handed to components explicitly; there is no global bus.
//!
//! Emission is non-blocking and lossy by default: playback must never stall
//! because an observer fell behind or no observer exists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::playback::playlist::PlaylistState;

/// Events emitted by the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AudioEvent {
    /// Playlist controller changed state
    PlaybackStateChanged {
        state: PlaylistState,
        timestamp: DateTime<Utc>,
    },

    /// Playlist started a track on the music channel
    TrackStarted {
        index: usize,
        clip_id: Uuid,
        name: String,
        timestamp: DateTime<Utc>,
    },

    /// A playlist track reached its natural end
    TrackFinished {
        clip_id: Uuid,
        name: String,
        timestamp: DateTime<Utc>,
    },

    /// Playlist began fading out the current track ahead of its end
    CrossfadeStarted {
        clip_id: Uuid,
        name: String,
        timestamp: DateTime<Utc>,
    },

    /// A clip finished on any pool channel (fired once per play request)
    ClipFinished {
        channel: usize,
        clip_id: Uuid,
        name: String,
        timestamp: DateTime<Utc>,
    },
}

/// Broadcast bus for [`AudioEvent`]
///
/// Cloning shares the underlying channel; any clone can emit or subscribe.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<AudioEvent>,
    capacity: usize,
}

impl EventBus {
    /// Create a new bus with the given buffer capacity
    ///
    /// Slow subscribers that fall more than `capacity` events behind see
    /// `RecvError::Lagged` and miss the overwritten events.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<AudioEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)`, or `Err` when no subscriber is
    /// listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: AudioEvent,
    ) -> std::result::Result<usize, broadcast::error::SendError<AudioEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring the absence of subscribers
    pub fn emit_lossy(&self, event: AudioEvent) {
        self.tx.send(event).ok();
    }

    /// Configured buffer capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

// ========================================
// Tests
// ========================================
