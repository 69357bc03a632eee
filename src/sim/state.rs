//! World state: the ball and the cup pyramid
//!
//! Pure data. Only the integrator and a full reset mutate it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::tuning::Tuning;

/// Current phase of the practice game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Ball at the launch point, aim controls live
    #[default]
    Idle,
    /// A throw is in progress (including the delay before the ball returns)
    Flying,
    /// Every cup has been sunk; latched until an explicit reset
    Won,
}

/// The thrown ball
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    /// Position at the start of the last frame (for render interpolation)
    pub prev_pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Only an active ball moves
    pub active: bool,
    /// Cup the ball most recently bounced off
    pub last_cup_id: Option<u32>,
    /// Seconds left during which `last_cup_id` is ignored by collision
    pub cup_cooldown: f32,
    /// Launch point the ball returns to between throws
    pub home: Vec2,
}

impl Default for Ball {
    fn default() -> Self {
        Self::at_launch(Tuning::default().launch_point())
    }
}

impl Ball {
    /// Inactive ball resting at `home`
    pub fn at_launch(home: Vec2) -> Self {
        Self {
            pos: home,
            prev_pos: home,
            vel: Vec2::ZERO,
            radius: BALL_RADIUS,
            active: false,
            last_cup_id: None,
            cup_cooldown: 0.0,
            home,
        }
    }

    /// Put the ball back at its launch point, inactive
    pub fn return_to_launch(&mut self) {
        let radius = self.radius;
        *self = Self::at_launch(self.home);
        self.radius = radius;
    }

    /// Start a throw from the launch point
    pub fn launch(&mut self, vel: Vec2) {
        self.return_to_launch();
        self.vel = vel;
        self.active = true;
    }

    /// Whether collisions with `cup_id` are currently suppressed
    #[inline]
    pub fn cooling_down_for(&self, cup_id: u32) -> bool {
        self.cup_cooldown > 0.0 && self.last_cup_id == Some(cup_id)
    }
}

/// A cup in the pyramid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cup {
    pub id: u32,
    /// Center of the rim
    pub pos: Vec2,
    pub radius: f32,
    /// Latched once the ball sinks here
    pub hit: bool,
    /// Fade-out progress after a sink, 0..=1
    pub vanish: f32,
}

impl Cup {
    pub fn new(id: u32, pos: Vec2) -> Self {
        Self {
            id,
            pos,
            radius: CUP_RADIUS,
            hit: false,
            vanish: 0.0,
        }
    }

    /// Latch the cup as sunk and restart its fade-out
    pub fn sink(&mut self) {
        self.hit = true;
        self.vanish = 0.0;
    }

    /// Advance the fade-out animation (only once hit)
    pub fn advance_vanish(&mut self, dt: f32) {
        if self.hit && self.vanish < 1.0 {
            self.vanish = (self.vanish + dt / CUP_VANISH_TIME).min(1.0);
        }
    }
}

/// Build the 4-3-2-1 pyramid, base row nearest the thrower's far edge
pub fn pyramid_layout(tuning: &Tuning) -> Vec<Cup> {
    let pitch = 2.0 * CUP_RADIUS + CUP_GAP;
    let row_pitch = ((3.0_f32).sqrt() / 2.0 * pitch + 8.0).round();
    let base_len = CUP_ROWS[0] as f32;
    let start = Vec2::new(
        tuning.width - ((base_len - 0.5) * pitch + 60.0),
        tuning.table_y - 10.0,
    );

    let mut cups = Vec::with_capacity(CUP_ROWS.iter().sum::<u32>() as usize);
    let mut id = 0;
    for (row, &count) in CUP_ROWS.iter().enumerate() {
        let row_start = start + Vec2::new(row as f32 * pitch / 2.0, -(row as f32) * row_pitch);
        for i in 0..count {
            cups.push(Cup::new(id, row_start + Vec2::new(i as f32 * pitch, 0.0)));
            id += 1;
        }
    }
    cups
}

/// Everything the integrator advances
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct World {
    pub ball: Ball,
    /// Ordered by id
    pub cups: Vec<Cup>,
}

impl World {
    /// Fresh layout: all cups standing, ball inactive at the launch point
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            ball: Ball::at_launch(tuning.launch_point()),
            cups: pyramid_layout(tuning),
        }
    }

    /// Cups still standing
    pub fn remaining(&self) -> usize {
        self.cups.iter().filter(|c| !c.hit).count()
    }

    /// Win condition: every cup sunk
    pub fn all_hit(&self) -> bool {
        self.cups.iter().all(|c| c.hit)
    }

    pub fn cup(&self, id: u32) -> Option<&Cup> {
        self.cups.iter().find(|c| c.id == id)
    }
}
