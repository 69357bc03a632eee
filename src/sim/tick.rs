//! Frame integrator
//!
//! Advances the world by one frame using fixed substeps. Collision responses
//! happen inline; terminal outcomes come back as events for the game layer.

use glam::Vec2;

use super::collision::{Contact, bounce_with_impulse, contact_normal, earliest_contact};
use super::sink::SinkContact;
use super::state::World;
use crate::UP;
use crate::consts::{BOUNDS_BOTTOM_MARGIN, BOUNDS_SIDE_MARGIN, CUP_SEPARATION};
use crate::tuning::Tuning;

/// Something that happened during an advance
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimEvent {
    /// Ball bounced off the table
    TableBounce { substep: u32, pre: Vec2, post: Vec2 },
    /// Ball deflected off a cup
    CupBounce { substep: u32, cup_id: u32 },
    /// Ball dropped into a cup (ball is now inactive)
    Sunk { substep: u32, cup_id: u32 },
    /// Ball came to rest on the table (ball is now inactive)
    Settled { substep: u32 },
    /// Ball left the arena (ball is now inactive)
    OutOfBounds,
}

impl SimEvent {
    /// Whether this event ended the throw
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SimEvent::Sunk { .. } | SimEvent::Settled { .. } | SimEvent::OutOfBounds
        )
    }
}

/// Advance the world by one frame of `dt` seconds
///
/// `dt` is clamped to `tuning.max_frame_dt`; excess time is dropped. Physics only
/// runs while the ball is active, but sunk cups keep fading either way.
pub fn advance(world: &mut World, tuning: &Tuning, dt: f32) -> Vec<SimEvent> {
    let dt = clamp_frame_dt(dt, tuning.max_frame_dt);
    let mut events = Vec::new();

    if world.ball.active {
        world.ball.prev_pos = world.ball.pos;
        let sub_dt = tuning.substep_dt(dt);

        for substep in 0..tuning.substeps {
            if !world.ball.active {
                break;
            }
            step_ball(world, tuning, sub_dt, substep, &mut events);
        }

        if world.ball.active && out_of_bounds(world.ball.pos, tuning) {
            log::debug!("Ball left the arena at {:?}", world.ball.pos);
            world.ball.active = false;
            events.push(SimEvent::OutOfBounds);
        }
    }

    for cup in &mut world.cups {
        cup.advance_vanish(dt);
    }

    events
}

/// Clamp a frame delta to `[0, max]`, treating non-finite input as zero
#[inline]
pub fn clamp_frame_dt(dt: f32, max: f32) -> f32 {
    if dt.is_finite() { dt.clamp(0.0, max) } else { 0.0 }
}

fn out_of_bounds(pos: Vec2, tuning: &Tuning) -> bool {
    pos.y > tuning.height + BOUNDS_BOTTOM_MARGIN
        || pos.x > tuning.width + BOUNDS_SIDE_MARGIN
        || pos.x < -BOUNDS_SIDE_MARGIN
}

/// One substep: gravity, cooldown, sweep, resolve
fn step_ball(
    world: &mut World,
    tuning: &Tuning,
    sub_dt: f32,
    substep: u32,
    events: &mut Vec<SimEvent>,
) {
    let ball = &mut world.ball;

    // Semi-implicit Euler: velocity first
    ball.vel.y += tuning.gravity * sub_dt;
    ball.cup_cooldown = (ball.cup_cooldown - sub_dt).max(0.0);

    let start = ball.pos;
    let end = start + ball.vel * sub_dt;
    let table_y = tuning.table_contact_y(ball.radius);

    let Some(contact) = earliest_contact(ball, start, end, table_y, &world.cups) else {
        ball.pos = end;
        return;
    };

    let impact = start.lerp(end, contact.t());

    match contact {
        Contact::Table { .. } => {
            let pre = ball.vel;
            ball.pos = Vec2::new(impact.x, table_y);
            ball.vel = bounce_with_impulse(
                ball.vel,
                UP,
                tuning.table_restitution,
                tuning.table_friction,
            );
            if ball.vel.y.abs() < tuning.table_rest_speed {
                ball.vel.y = 0.0;
            }
            events.push(SimEvent::TableBounce {
                substep,
                pre,
                post: ball.vel,
            });

            if ball.vel.length() < tuning.settle_speed {
                ball.active = false;
                events.push(SimEvent::Settled { substep });
            }
        }
        Contact::Cup { index, .. } => {
            let cup = &mut world.cups[index];
            let sink_check = SinkContact {
                start,
                impact,
                vel: ball.vel,
                ball_radius: ball.radius,
                cup_center: cup.pos,
                cup_radius: cup.radius,
            };
            let verdict = sink_check.evaluate(tuning);

            if verdict.is_sink() {
                cup.sink();
                ball.pos = impact;
                ball.active = false;
                events.push(SimEvent::Sunk {
                    substep,
                    cup_id: cup.id,
                });
                return;
            }

            log::debug!("Cup {} deflected the ball ({:?})", cup.id, verdict);
            let normal = contact_normal(impact, cup.pos);
            ball.pos = impact + normal * CUP_SEPARATION;
            ball.vel =
                bounce_with_impulse(ball.vel, normal, tuning.cup_restitution, tuning.cup_friction);
            ball.last_cup_id = Some(cup.id);
            ball.cup_cooldown = tuning.cup_cooldown;
            events.push(SimEvent::CupBounce {
                substep,
                cup_id: cup.id,
            });
        }
    }
}
