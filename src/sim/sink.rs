//! Sink heuristic: does a cup contact capture the ball or deflect it?
//!
//! There is no depth simulation. A capture is a fast downward drop that meets the
//! cup above its rim line and enters the mouth near its center. Rim grazes, side
//! strikes and slow rolls all bounce.

use glam::Vec2;

use crate::consts::SINK_RIM_SLACK;
use crate::tuning::Tuning;

/// Geometry of one ball-cup contact
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SinkContact {
    /// Ball center at the start of the substep
    pub start: Vec2,
    /// Ball center at first contact
    pub impact: Vec2,
    /// Ball velocity at contact
    pub vel: Vec2,
    pub ball_radius: f32,
    /// Rim center
    pub cup_center: Vec2,
    pub cup_radius: f32,
}

/// The three conditions, evaluated separately for logging and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkVerdict {
    pub downward: bool,
    pub from_above: bool,
    pub centered: bool,
}

impl SinkVerdict {
    #[inline]
    pub fn is_sink(&self) -> bool {
        self.downward && self.from_above && self.centered
    }
}

impl SinkContact {
    /// Where the incoming path crosses the rim line, if it is heading down
    ///
    /// The contact itself always lies on the inflated collision circle, so the
    /// gate is measured where the ball would enter the mouth.
    pub fn mouth_entry(&self) -> Option<Vec2> {
        if self.vel.y <= f32::EPSILON {
            return None;
        }
        let drop = self.cup_center.y - self.impact.y;
        Some(self.impact + self.vel * (drop / self.vel.y))
    }

    pub fn evaluate(&self, tuning: &Tuning) -> SinkVerdict {
        let downward = self.vel.y > tuning.sink_min_downward_speed;

        // Contact must happen over the mouth, not level with the rim line
        let rim_band = self.cup_center.y - self.ball_radius * SINK_RIM_SLACK;
        let from_above = self.start.y < self.cup_center.y && self.impact.y <= rim_band;

        let gate = self.cup_radius * tuning.sink_inner_gate;
        let centered = self
            .mouth_entry()
            .is_some_and(|entry| entry.distance(self.cup_center) <= gate);

        SinkVerdict {
            downward,
            from_above,
            centered,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact_at(start: Vec2, impact: Vec2, vel: Vec2) -> SinkContact {
        SinkContact {
            start,
            impact,
            vel,
            ball_radius: 9.0,
            cup_center: Vec2::new(0.0, 0.0),
            cup_radius: 20.0,
        }
    }

    #[test]
    fn test_center_drop_sinks() {
        let p = contact_at(Vec2::new(0.0, -31.0), Vec2::new(0.0, -29.0), Vec2::new(0.0, 500.0));
        let verdict = p.evaluate(&Tuning::default());
        assert!(verdict.is_sink(), "{verdict:?}");
    }

    #[test]
    fn test_angled_drop_through_mouth_sinks() {
        // Contact on the upper-left of the circle, path crosses the rim 5 units from center
        let vel = Vec2::new(300.0, 600.0);
        let entry = Vec2::new(-5.0, 0.0);
        let impact = entry - vel.normalize() * 29.0;
        let start = impact - vel * 0.004;
        let p = contact_at(start, impact, vel);
        let verdict = p.evaluate(&Tuning::default());
        assert!(verdict.is_sink(), "{verdict:?}");
        assert!(p.mouth_entry().unwrap().distance(entry) < 1e-3);
    }

    #[test]
    fn test_slow_drop_bounces() {
        // Centered and from above, but too slow
        let p = contact_at(Vec2::new(0.0, -31.0), Vec2::new(0.0, -29.0), Vec2::new(0.0, 120.0));
        let verdict = p.evaluate(&Tuning::default());
        assert!(!verdict.downward);
        assert!(verdict.from_above && verdict.centered);
        assert!(!verdict.is_sink());
    }

    #[test]
    fn test_rim_graze_bounces() {
        // Fast and from above, but enters the mouth at 19 > 0.92 * 20
        let p = contact_at(Vec2::new(19.0, -23.0), Vec2::new(19.0, -21.9), Vec2::new(0.0, 500.0));
        let verdict = p.evaluate(&Tuning::default());
        assert!(verdict.downward && verdict.from_above);
        assert!(!verdict.centered);
        assert!(!verdict.is_sink());
    }

    #[test]
    fn test_from_below_bounces() {
        // Fast, downward and centered, but the substep started below the rim
        let p = contact_at(Vec2::new(0.0, 5.0), Vec2::new(0.0, 29.0), Vec2::new(0.0, 500.0));
        let verdict = p.evaluate(&Tuning::default());
        assert!(verdict.downward && verdict.centered);
        assert!(!verdict.from_above);
        assert!(!verdict.is_sink());
    }

    #[test]
    fn test_side_skim_at_rim_line_bounces() {
        // Fast and flat: the path crosses the mouth near center, but contact is
        // level with the rim on the side of the cup
        let vel = Vec2::new(2000.0, 150.0);
        let impact = Vec2::new(-(29.0f32 * 29.0 - 1.0).sqrt(), -1.0);
        let p = contact_at(impact - vel * 0.001, impact, vel);
        let verdict = p.evaluate(&Tuning::default());
        assert!(verdict.downward && verdict.centered, "{verdict:?}");
        assert!(!verdict.from_above);
        assert!(!verdict.is_sink());
    }

    #[test]
    fn test_rim_band_rejects_part_of_the_contact_circle() {
        // Every contact on the collision circle from a start above center
        let tuning = Tuning::default();
        let vel = Vec2::new(0.0, 500.0);
        let mut rejected = 0;
        for i in 0..360 {
            let angle = (i as f32).to_radians();
            let impact = Vec2::new(angle.cos(), angle.sin()) * 29.0;
            let p = contact_at(Vec2::new(impact.x, -40.0), impact, vel);
            if !p.evaluate(&tuning).from_above {
                rejected += 1;
            }
        }
        // Everything at or below the band just above the rim line
        assert!(rejected > 180, "{rejected}");
        assert!(rejected < 360);
    }

    #[test]
    fn test_upward_strike_never_sinks() {
        for x in [0.0, 5.0, 15.0, 25.0] {
            let p = contact_at(Vec2::new(x, 30.0), Vec2::new(x, 25.0), Vec2::new(0.0, -600.0));
            let verdict = p.evaluate(&Tuning::default());
            assert!(!verdict.downward);
            assert!(!verdict.is_sink());
            assert!(p.mouth_entry().is_none());
        }
    }
}
