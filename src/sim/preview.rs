//! Aim guide: the drag-free parabola shown while the ball waits at the launch point

use glam::Vec2;

use crate::consts::{PREVIEW_DURATION, PREVIEW_SAMPLES};
use crate::launch_velocity;

/// Sample the closed-form throw path for an aim starting at `origin`
///
/// Returns `PREVIEW_SAMPLES + 1` points spanning `PREVIEW_DURATION` seconds. Ignores
/// collisions; the host draws it as a dashed line.
pub fn trajectory_preview(origin: Vec2, angle_deg: f32, power: f32, gravity: f32) -> Vec<Vec2> {
    let vel = launch_velocity(angle_deg, power);
    let accel = Vec2::new(0.0, gravity);

    (0..=PREVIEW_SAMPLES)
        .map(|i| {
            let t = i as f32 / PREVIEW_SAMPLES as f32 * PREVIEW_DURATION;
            origin + vel * t + 0.5 * accel * t * t
        })
        .collect()
}
