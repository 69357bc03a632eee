//! Simulation module
//!
//! All physics lives here. This module is pure and single-owner:
//! - State is a plain value advanced by `advance`
//! - Outcomes are returned as events, never pushed to callbacks
//! - No rendering, timer or platform dependencies

pub mod collision;
pub mod preview;
pub mod sink;
pub mod state;
pub mod tick;

pub use collision::{Contact, bounce_with_impulse, earliest_contact, segment_circle_hit};
pub use preview::trajectory_preview;
pub use sink::{SinkContact, SinkVerdict};
pub use state::{Ball, Cup, GamePhase, World, pyramid_layout};
pub use tick::{SimEvent, advance};
