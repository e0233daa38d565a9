//! Volume ramps for fades and crossfades
//!
//! A [`Fade`] is a pure function of elapsed time: each scheduling tick
//! recomputes the volume from the monotonic clock instead of mutating
//! incremental state. Interpolation is linear; the parameter is the clamped
//! normalized elapsed time `clamp01(elapsed / duration)`, so the ramp never
//! regresses and lands exactly on the target once `elapsed >= duration`.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Channel fade activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FadeState {
    Idle,
    FadingIn,
    FadingOut,
}

/// In-flight linear volume ramp
#[derive(Debug, Clone, Copy)]
pub struct Fade {
    from: f32,
    to: f32,
    duration: Duration,
    started_at: Instant,
}

impl Fade {
    /// Create a ramp from `from` to `to` over `duration`, anchored at
    /// `started_at`
    ///
    /// Endpoints are clamped to [0, 1]. Callers handle the degenerate cases
    /// (zero duration, equal endpoints) by snapping instead of constructing
    /// a fade.
    pub fn new(from: f32, to: f32, duration: Duration, started_at: Instant) -> Self {
        Self {
            from: from.clamp(0.0, 1.0),
            to: to.clamp(0.0, 1.0),
            duration,
            started_at,
        }
    }

    /// Volume at the given instant
    ///
    /// Exactly `to` once the ramp has run its full duration.
    pub fn volume_at(&self, now: Instant) -> f32 {
        let elapsed = now.saturating_duration_since(self.started_at);
        if elapsed >= self.duration {
            return self.to;
        }

        let t = elapsed.as_secs_f32() / self.duration.as_secs_f32();
        self.from + (self.to - self.from) * t
    }

    /// Whether the ramp has run its full duration at `now`
    pub fn is_complete(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started_at) >= self.duration
    }

    /// Final volume of the ramp
    pub fn target(&self) -> f32 {
        self.to
    }
}

// ========================================
// Tests
// ========================================
