//! Swept collision detection and impulse response
//!
//! The ball is treated as a point moving along a straight segment each substep.
//! Cups are inflated by the ball radius and the table plane is raised by it, so
//! every test is a point-vs-shape test.

use glam::Vec2;

use super::state::{Ball, Cup};
use crate::UP;

/// Below this squared length a segment is treated as a point
const MIN_SEGMENT_LEN_SQ: f32 = 1e-8;
/// Below this vertical travel a segment runs along the table plane
const MIN_PLANE_CROSSING: f32 = 1e-6;
/// Below this length a contact normal is degenerate
const MIN_NORMAL_LEN: f32 = 1e-6;

/// What the ball ran into first along a substep segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Contact {
    /// Crossed the table plane moving down
    Table { t: f32 },
    /// Touched the inflated circle of the cup at `index` in the cup list
    Cup { t: f32, index: usize },
}

impl Contact {
    /// Segment parameter of the contact, in [0, 1]
    pub fn t(&self) -> f32 {
        match *self {
            Contact::Table { t } | Contact::Cup { t, .. } => t,
        }
    }
}

/// First parameter `t` in [0, 1] where the segment `start..end` meets the circle
///
/// Prefers the entry root; falls back to the exit root when the segment starts
/// inside the circle.
pub fn segment_circle_hit(start: Vec2, end: Vec2, center: Vec2, radius: f32) -> Option<f32> {
    let d = end - start;
    let f = start - center;
    let a = d.length_squared();
    if a <= MIN_SEGMENT_LEN_SQ {
        return None;
    }
    let b = 2.0 * f.dot(d);
    let c = f.length_squared() - radius * radius;
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return None;
    }

    let s = disc.sqrt();
    let t1 = (-b - s) / (2.0 * a);
    let t2 = (-b + s) / (2.0 * a);
    if (0.0..=1.0).contains(&t1) {
        Some(t1)
    } else if (0.0..=1.0).contains(&t2) {
        Some(t2)
    } else {
        None
    }
}

/// Parameter where a downward-moving segment crosses the horizontal plane `plane_y`
///
/// Screen space: "down" is +y. Upward motion never hits.
pub fn segment_plane_hit(start: Vec2, end: Vec2, vel_y: f32, plane_y: f32) -> Option<f32> {
    if vel_y <= 0.0 || start.y > plane_y || end.y < plane_y {
        return None;
    }
    let denom = end.y - start.y;
    if denom.abs() <= MIN_PLANE_CROSSING {
        return None;
    }
    let t = (plane_y - start.y) / denom;
    (0.0..=1.0).contains(&t).then_some(t)
}

/// Reflect `vel` off a surface with unit `normal` (pointing toward the ball)
///
/// The normal component is reversed and scaled by `restitution`; the tangential
/// component is scaled by `1 - friction`. A separating velocity is returned as-is.
pub fn bounce_with_impulse(vel: Vec2, normal: Vec2, restitution: f32, friction: f32) -> Vec2 {
    let vn = vel.dot(normal);
    if vn >= 0.0 {
        return vel;
    }
    let tangential = vel - vn * normal;
    let post_normal = -vn * restitution;
    tangential * (1.0 - friction).max(0.0) + normal * post_normal
}

/// Unit normal from `center` toward `point`, straight up when they coincide
pub fn contact_normal(point: Vec2, center: Vec2) -> Vec2 {
    let offset = point - center;
    let len = offset.length();
    if len > MIN_NORMAL_LEN { offset / len } else { UP }
}

/// Earliest contact along `start..end`
///
/// Skips sunk cups and the cup the ball is cooling down from. The table is tested
/// first and cups replace it on ties, so a cup wins an exact tie.
pub fn earliest_contact(
    ball: &Ball,
    start: Vec2,
    end: Vec2,
    table_contact_y: f32,
    cups: &[Cup],
) -> Option<Contact> {
    let mut best: Option<Contact> = segment_plane_hit(start, end, ball.vel.y, table_contact_y)
        .map(|t| Contact::Table { t });

    for (index, cup) in cups.iter().enumerate() {
        if cup.hit || ball.cooling_down_for(cup.id) {
            continue;
        }
        let Some(t) = segment_circle_hit(start, end, cup.pos, ball.radius + cup.radius) else {
            continue;
        };
        if best.is_none_or(|b| t <= b.t()) {
            best = Some(Contact::Cup { t, index });
        }
    }

    best
}
