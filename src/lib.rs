//! Cup Toss - a cup pyramid throwing practice game
//!
//! Core modules:
//! - `sim`: Simulation (integrator, swept collisions, sink heuristic, world state)
//! - `game`: Throw/reset state machine with deferred timers and the win event
//! - `scheduler`: Frame clock and headless fixed-step runner
//! - `tuning`: Data-driven physics and gameplay constants
//! - `autoplay`: Seeded aim sampler used by the headless session
//! - `web`: Browser binding (wasm32 only)

pub mod autoplay;
pub mod game;
pub mod scheduler;
pub mod sim;
pub mod tuning;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use game::{AimState, Game, Snapshot};
pub use tuning::{Tuning, TuningError};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Physics substeps per frame
    pub const PHYSICS_SUBSTEPS: u32 = 4;
    /// Longest frame the integrator will simulate (seconds); the rest is dropped
    pub const MAX_FRAME_DT: f32 = 0.032;

    /// Arena dimensions (screen space, y grows downward)
    pub const ARENA_WIDTH: f32 = 900.0;
    pub const ARENA_HEIGHT: f32 = 600.0;
    /// Top surface of the table
    pub const TABLE_Y: f32 = ARENA_HEIGHT - 110.0;
    /// Out-of-bounds margins past the far/near edge and below the arena
    pub const BOUNDS_SIDE_MARGIN: f32 = 60.0;
    pub const BOUNDS_BOTTOM_MARGIN: f32 = 40.0;

    /// Downward acceleration (units/s²)
    pub const GRAVITY: f32 = 3000.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 9.0;
    /// Launch point: fixed distance in from the near edge, fixed height above the arena floor
    pub const LAUNCH_X: f32 = 90.0;
    pub const LAUNCH_HEIGHT: f32 = 100.0;
    /// Launch speed at power 0, plus the extra speed reached at power 100
    pub const LAUNCH_BASE_SPEED: f32 = 800.0;
    pub const LAUNCH_POWER_SPEED: f32 = 900.0;

    /// Aim ranges and defaults
    pub const MAX_ANGLE_DEG: f32 = 80.0;
    pub const MAX_POWER: f32 = 100.0;
    pub const DEFAULT_ANGLE_DEG: f32 = 38.0;
    pub const DEFAULT_POWER: f32 = 65.0;

    /// Cup pyramid
    pub const CUP_RADIUS: f32 = 20.0;
    pub const CUP_GAP: f32 = 28.0;
    pub const CUP_ROWS: [u32; 4] = [4, 3, 2, 1];
    /// Seconds for a sunk cup to fade out
    pub const CUP_VANISH_TIME: f32 = 0.22;

    /// Table response
    pub const TABLE_RESTITUTION: f32 = 0.44;
    pub const TABLE_FRICTION: f32 = 0.12;
    /// Vertical speed below which a table bounce becomes resting contact
    pub const TABLE_REST_SPEED: f32 = 55.0;
    /// Total speed below which the throw has settled
    pub const SETTLE_SPEED: f32 = 90.0;

    /// Cup response
    pub const CUP_RESTITUTION: f32 = 0.62;
    pub const CUP_FRICTION: f32 = 0.16;
    pub const CUP_COLLISION_COOLDOWN: f32 = 0.045;
    /// Push-out distance after a cup bounce
    pub const CUP_SEPARATION: f32 = 0.6;

    /// Sink heuristic
    pub const SINK_MIN_DOWNWARD_SPEED: f32 = 140.0;
    pub const SINK_INNER_GATE: f32 = 0.92;
    /// Slack above the rim, as a fraction of the ball radius
    pub const SINK_RIM_SLACK: f32 = 0.2;

    /// Deferred transitions (seconds)
    pub const SETTLE_RESET_DELAY: f32 = 0.6;
    pub const SINK_RESET_DELAY: f32 = 0.65;
    pub const WIN_DELAY: f32 = 0.3;

    /// Aim guide sampling
    pub const PREVIEW_SAMPLES: usize = 60;
    pub const PREVIEW_DURATION: f32 = 1.8;
}

/// Launch velocity for an aim (degrees above horizontal, power 0-100)
#[inline]
pub fn launch_velocity(angle_deg: f32, power: f32) -> Vec2 {
    use consts::{LAUNCH_BASE_SPEED, LAUNCH_POWER_SPEED, MAX_POWER};
    let speed = LAUNCH_BASE_SPEED + (power / MAX_POWER) * LAUNCH_POWER_SPEED;
    let angle = angle_deg.to_radians();
    // Screen space: up is -y
    Vec2::new(angle.cos() * speed, -angle.sin() * speed)
}

/// Unit vector pointing up the screen
pub const UP: Vec2 = Vec2::new(0.0, -1.0);
