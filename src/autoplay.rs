//! Autoplayer for headless sessions
//!
//! Picks an aim by trying seeded random candidates against a copy of the world,
//! then throws the first one that sinks a cup with a little human-like jitter.
//! Same seed, same session.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::{MAX_ANGLE_DEG, MAX_POWER};
use crate::game::AimState;
use crate::sim::{SimEvent, World, advance};
use crate::tuning::Tuning;

/// How a single throw ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrowOutcome {
    Sunk { cup_id: u32 },
    Settled,
    OutOfBounds,
    /// Still moving after the time limit
    Unfinished,
}

impl ThrowOutcome {
    pub fn from_event(event: &SimEvent) -> Option<Self> {
        match *event {
            SimEvent::Sunk { cup_id, .. } => Some(Self::Sunk { cup_id }),
            SimEvent::Settled { .. } => Some(Self::Settled),
            SimEvent::OutOfBounds => Some(Self::OutOfBounds),
            _ => None,
        }
    }
}

/// Frame delta used when predicting throws
const PREDICT_DT: f32 = 1.0 / 60.0;
/// Longest throw worth predicting (seconds)
const PREDICT_MAX_TIME: f32 = 5.0;

/// Run a throw on a copy of `world` without touching the original
pub fn predict_throw(world: &World, tuning: &Tuning, aim: AimState) -> ThrowOutcome {
    let mut world = world.clone();
    world.ball.launch(aim.velocity());

    let mut elapsed = 0.0;
    while elapsed < PREDICT_MAX_TIME {
        let events = advance(&mut world, tuning, PREDICT_DT);
        if let Some(outcome) = events.iter().find_map(ThrowOutcome::from_event) {
            return outcome;
        }
        elapsed += PREDICT_DT;
    }
    ThrowOutcome::Unfinished
}

/// Seeded aim picker
#[derive(Debug, Clone)]
pub struct Autoplayer {
    rng: Pcg32,
    /// Candidate aims tried per throw
    pub candidates: u32,
    /// Max random error added to the chosen angle (degrees) and power
    pub angle_jitter: f32,
    pub power_jitter: f32,
}

impl Autoplayer {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            candidates: 2000,
            angle_jitter: 0.4,
            power_jitter: 0.6,
        }
    }

    /// Choose the next aim for the current world
    pub fn next_aim(&mut self, world: &World, tuning: &Tuning) -> AimState {
        let mut planned = None;
        for _ in 0..self.candidates {
            let aim = AimState::new(
                self.rng.random_range(0.0..MAX_ANGLE_DEG),
                self.rng.random_range(0.0..MAX_POWER),
            );
            if let ThrowOutcome::Sunk { cup_id } = predict_throw(world, tuning, aim) {
                log::debug!(
                    "Planned cup {} with {:.2}° / {:.2}",
                    cup_id,
                    aim.angle_deg,
                    aim.power
                );
                planned = Some(aim);
                break;
            }
        }

        let aim = planned.unwrap_or_else(|| {
            log::debug!("No sinking aim found, throwing blind");
            AimState::default()
        });

        AimState::new(
            aim.angle_deg + self.rng.random_range(-self.angle_jitter..=self.angle_jitter),
            aim.power + self.rng.random_range(-self.power_jitter..=self.power_jitter),
        )
        .clamped()
    }
}
