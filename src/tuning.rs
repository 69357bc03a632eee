//! Data-driven physics and gameplay constants
//!
//! Defaults come from [`crate::consts`]. A host may override any subset from JSON;
//! missing fields keep their defaults.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Why a tuning file was rejected
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to parse tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("`{field}` must be finite and positive, got {value}")]
    NotPositive { field: &'static str, value: f32 },
    #[error("`{field}` must lie in [0, 1], got {value}")]
    OutOfUnitRange { field: &'static str, value: f32 },
    #[error("`substeps` must be at least 1")]
    NoSubsteps,
    #[error("table at y={table_y} lies outside the arena height {height}")]
    TableOutsideArena { table_y: f32, height: f32 },
    #[error("launch point ({x}, {y}) lies outside the {width}x{height} arena")]
    LaunchOutsideArena {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
}

/// Every constant the simulation and state machine read at runtime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Integrator ===
    pub gravity: f32,
    pub substeps: u32,
    pub max_frame_dt: f32,

    // === Arena ===
    pub width: f32,
    pub height: f32,
    pub table_y: f32,

    // === Table response ===
    pub table_restitution: f32,
    pub table_friction: f32,
    pub table_rest_speed: f32,
    pub settle_speed: f32,

    // === Cup response ===
    pub cup_restitution: f32,
    pub cup_friction: f32,
    pub cup_cooldown: f32,

    // === Sink heuristic ===
    pub sink_min_downward_speed: f32,
    pub sink_inner_gate: f32,

    // === Deferred transitions ===
    pub settle_reset_delay: f32,
    pub sink_reset_delay: f32,
    pub win_delay: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            substeps: PHYSICS_SUBSTEPS,
            max_frame_dt: MAX_FRAME_DT,

            width: ARENA_WIDTH,
            height: ARENA_HEIGHT,
            table_y: TABLE_Y,

            table_restitution: TABLE_RESTITUTION,
            table_friction: TABLE_FRICTION,
            table_rest_speed: TABLE_REST_SPEED,
            settle_speed: SETTLE_SPEED,

            cup_restitution: CUP_RESTITUTION,
            cup_friction: CUP_FRICTION,
            cup_cooldown: CUP_COLLISION_COOLDOWN,

            sink_min_downward_speed: SINK_MIN_DOWNWARD_SPEED,
            sink_inner_gate: SINK_INNER_GATE,

            settle_reset_delay: SETTLE_RESET_DELAY,
            sink_reset_delay: SINK_RESET_DELAY,
            win_delay: WIN_DELAY,
        }
    }
}

impl Tuning {
    /// Parse and validate tuning from a JSON document
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Read, parse and validate a tuning file
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, TuningError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Reject values that would make the integrator unstable or meaningless
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.substeps == 0 {
            return Err(TuningError::NoSubsteps);
        }

        let positive = [
            ("gravity", self.gravity),
            ("max_frame_dt", self.max_frame_dt),
            ("width", self.width),
            ("height", self.height),
            ("table_y", self.table_y),
            ("cup_cooldown", self.cup_cooldown),
            ("sink_min_downward_speed", self.sink_min_downward_speed),
            ("settle_reset_delay", self.settle_reset_delay),
            ("sink_reset_delay", self.sink_reset_delay),
            ("win_delay", self.win_delay),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(TuningError::NotPositive { field, value });
            }
        }

        let unit = [
            ("table_restitution", self.table_restitution),
            ("table_friction", self.table_friction),
            ("cup_restitution", self.cup_restitution),
            ("cup_friction", self.cup_friction),
            ("sink_inner_gate", self.sink_inner_gate),
        ];
        for (field, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(TuningError::OutOfUnitRange { field, value });
            }
        }

        // Thresholds may be zero (disables the rest clamp / settle check)
        for (field, value) in [
            ("table_rest_speed", self.table_rest_speed),
            ("settle_speed", self.settle_speed),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(TuningError::NotPositive { field, value });
            }
        }

        if self.table_y >= self.height {
            return Err(TuningError::TableOutsideArena {
                table_y: self.table_y,
                height: self.height,
            });
        }

        let launch = self.launch_point();
        if launch.x > self.width || launch.y < 0.0 {
            return Err(TuningError::LaunchOutsideArena {
                x: launch.x,
                y: launch.y,
                width: self.width,
                height: self.height,
            });
        }

        Ok(())
    }

    /// Length of one physics substep for a frame of `dt` seconds
    #[inline]
    pub fn substep_dt(&self, dt: f32) -> f32 {
        dt / self.substeps as f32
    }

    /// Where every throw starts, measured up from the arena floor
    #[inline]
    pub fn launch_point(&self) -> Vec2 {
        Vec2::new(LAUNCH_X, self.height - LAUNCH_HEIGHT)
    }

    /// Plane the ball's center touches when resting on the table
    #[inline]
    pub fn table_contact_y(&self, ball_radius: f32) -> f32 {
        self.table_y - ball_radius
    }
}
