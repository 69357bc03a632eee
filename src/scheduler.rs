//! Frame scheduling
//!
//! The host (browser `requestAnimationFrame`, a native loop, a test) calls into the
//! game once per frame. This module turns host timestamps into frame deltas, holds
//! the one-shot timers behind deferred transitions, and provides a fixed-step runner
//! for headless hosts.

use crate::game::Game;
use crate::sim::{GamePhase, SimEvent};

/// Converts host timestamps (milliseconds) into frame deltas (seconds)
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds since the previous timestamp
    ///
    /// The first frame after construction or `reset` is zero. Timestamps that go
    /// backwards count as zero. The result is not clamped; the integrator does that.
    pub fn tick(&mut self, timestamp_ms: f64) -> f32 {
        let dt = match self.last_ms {
            Some(last) if timestamp_ms > last => ((timestamp_ms - last) / 1000.0) as f32,
            _ => 0.0,
        };
        if timestamp_ms.is_finite() {
            self.last_ms = Some(timestamp_ms);
        }
        dt
    }

    /// Forget the previous timestamp (after a stop/start)
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

/// A cancellable one-shot delay
///
/// At most one firing is pending; scheduling again replaces it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OneShot {
    remaining: Option<f32>,
}

impl OneShot {
    /// Arm the timer; returns true if a pending firing was replaced
    pub fn schedule(&mut self, delay: f32) -> bool {
        self.remaining.replace(delay.max(0.0)).is_some()
    }

    pub fn cancel(&mut self) {
        self.remaining = None;
    }

    pub fn is_pending(&self) -> bool {
        self.remaining.is_some()
    }

    /// Let `dt` seconds pass; returns true exactly once, when the delay runs out
    pub fn advance(&mut self, dt: f32) -> bool {
        let Some(remaining) = self.remaining.as_mut() else {
            return false;
        };
        *remaining -= dt;
        if *remaining <= 0.0 {
            self.remaining = None;
            true
        } else {
            false
        }
    }
}

/// Drives a game with a fixed frame delta, for hosts without a display
#[derive(Debug, Clone)]
pub struct FixedStepRunner {
    /// Frame delta (seconds)
    pub dt: f32,
    /// Upper bound on simulated time per call (seconds)
    pub max_time: f32,
}

impl Default for FixedStepRunner {
    fn default() -> Self {
        Self {
            dt: 1.0 / 60.0,
            max_time: 10.0,
        }
    }
}

impl FixedStepRunner {
    /// Step until the current throw is fully over (ball back at launch, or won)
    ///
    /// Returns every simulation event produced along the way.
    pub fn run_throw(&self, game: &mut Game) -> Vec<SimEvent> {
        let mut events = Vec::new();
        let mut elapsed = 0.0;
        while game.phase() == GamePhase::Flying && elapsed < self.max_time {
            events.extend(game.step(self.dt));
            elapsed += self.dt;
        }
        // A win may still be pending after the ball returned
        while game.win_pending() && elapsed < self.max_time {
            events.extend(game.step(self.dt));
            elapsed += self.dt;
        }
        if elapsed >= self.max_time {
            log::warn!("Throw did not finish within {}s", self.max_time);
        }
        events
    }

    /// Step for a fixed amount of simulated time
    pub fn run_for(&self, game: &mut Game, seconds: f32) -> Vec<SimEvent> {
        let frames = (seconds / self.dt).ceil() as u32;
        (0..frames).flat_map(|_| game.step(self.dt)).collect()
    }
}
