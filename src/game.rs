//! Practice game state machine
//!
//! Idle -> Flying on a throw, back to Idle after a short delay once the throw ends,
//! and Won (latched) once every cup is sunk. The game exclusively owns the world;
//! hosts only set the aim, request throws/resets, and read snapshots.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_ANGLE_DEG, DEFAULT_POWER, MAX_ANGLE_DEG, MAX_POWER};
use crate::launch_velocity;
use crate::scheduler::{FrameClock, OneShot};
use crate::sim::{GamePhase, SimEvent, World, advance, trajectory_preview};
use crate::tuning::Tuning;

/// Aim inputs, read only when a throw starts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AimState {
    /// Degrees above horizontal, 0-80
    pub angle_deg: f32,
    /// 0-100
    pub power: f32,
}

impl Default for AimState {
    fn default() -> Self {
        Self {
            angle_deg: DEFAULT_ANGLE_DEG,
            power: DEFAULT_POWER,
        }
    }
}

impl AimState {
    pub fn new(angle_deg: f32, power: f32) -> Self {
        Self { angle_deg, power }
    }

    /// Clamp to the documented ranges; non-finite values fall back to defaults
    pub fn clamped(&self) -> Self {
        let defaults = Self::default();
        let angle_deg = if self.angle_deg.is_finite() {
            self.angle_deg.clamp(0.0, MAX_ANGLE_DEG)
        } else {
            defaults.angle_deg
        };
        let power = if self.power.is_finite() {
            self.power.clamp(0.0, MAX_POWER)
        } else {
            defaults.power
        };
        Self { angle_deg, power }
    }

    /// Initial ball velocity for this aim (after clamping)
    pub fn velocity(&self) -> Vec2 {
        let aim = self.clamped();
        launch_velocity(aim.angle_deg, aim.power)
    }
}

/// Read-only view of the ball for the renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BallView {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub active: bool,
}

/// Read-only view of a cup for the renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CupView {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub hit: bool,
    pub vanish: f32,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub ball: BallView,
    pub cups: Vec<CupView>,
    pub phase: GamePhase,
    pub remaining: usize,
}

type WinCallback = Box<dyn FnMut()>;

/// One running instance of the practice game
pub struct Game {
    world: World,
    tuning: Tuning,
    aim: AimState,
    phase: GamePhase,
    /// Returns the ball to the launch point after a throw ends
    reset_timer: OneShot,
    /// Enters Won shortly after the last cup is sunk
    win_timer: OneShot,
    /// Latched once `on_win` has fired for the current layout
    win_fired: bool,
    running: bool,
    clock: FrameClock,
    on_win: Option<WinCallback>,
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("phase", &self.phase)
            .field("aim", &self.aim)
            .field("remaining", &self.world.remaining())
            .field("reset_pending", &self.reset_timer.is_pending())
            .field("win_pending", &self.win_timer.is_pending())
            .field("running", &self.running)
            .finish_non_exhaustive()
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new(Tuning::default())
    }
}

impl Game {
    /// Create a running game with a fresh layout
    pub fn new(tuning: Tuning) -> Self {
        Self {
            world: World::new(&tuning),
            tuning,
            aim: AimState::default(),
            phase: GamePhase::Idle,
            reset_timer: OneShot::default(),
            win_timer: OneShot::default(),
            win_fired: false,
            running: true,
            clock: FrameClock::new(),
            on_win: None,
        }
    }

    /// Register the callback fired once per cleared layout
    pub fn set_on_win(&mut self, callback: impl FnMut() + 'static) {
        self.on_win = Some(Box::new(callback));
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn aim(&self) -> AimState {
        self.aim
    }

    pub fn remaining(&self) -> usize {
        self.world.remaining()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Whether the win event is scheduled but has not fired yet
    pub fn win_pending(&self) -> bool {
        self.win_timer.is_pending()
    }

    /// Takes effect at the next throw
    pub fn set_angle(&mut self, angle_deg: f32) {
        self.aim.angle_deg = angle_deg;
    }

    /// Takes effect at the next throw
    pub fn set_power(&mut self, power: f32) {
        self.aim.power = power;
    }

    pub fn set_aim(&mut self, aim: AimState) {
        self.aim = aim;
    }

    /// Aim guide for the current aim
    pub fn preview(&self) -> Vec<Vec2> {
        let aim = self.aim.clamped();
        trajectory_preview(
            self.tuning.launch_point(),
            aim.angle_deg,
            aim.power,
            self.tuning.gravity,
        )
    }

    /// Launch the ball; ignored unless Idle. Returns whether a throw started.
    pub fn throw_ball(&mut self) -> bool {
        if self.phase != GamePhase::Idle {
            log::debug!("Throw ignored in {:?}", self.phase);
            return false;
        }

        let aim = self.aim.clamped();
        self.world.ball.launch(aim.velocity());
        self.phase = GamePhase::Flying;
        log::info!(
            "Throw: angle {:.1}°, power {:.0}",
            aim.angle_deg,
            aim.power
        );
        true
    }

    /// Rebuild the layout: all cups standing, ball at launch, Won cleared
    ///
    /// Valid in any phase. Cancels pending deferred transitions.
    pub fn reset(&mut self) {
        self.reset_timer.cancel();
        self.win_timer.cancel();
        self.world = World::new(&self.tuning);
        self.phase = GamePhase::Idle;
        self.win_fired = false;
        log::info!("Layout reset");
    }

    /// Stop reacting to frames and cancel pending timers
    pub fn stop(&mut self) {
        self.running = false;
        self.reset_timer.cancel();
        self.win_timer.cancel();
        self.clock.reset();
        log::info!("Game stopped");
    }

    /// Resume after `stop`
    ///
    /// A throw interrupted by `stop` is finished immediately; a win that was
    /// cancelled is scheduled again.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        self.clock.reset();

        if self.phase == GamePhase::Flying && !self.reset_timer.is_pending() {
            self.finish_throw();
        }
        if self.world.all_hit() && !self.win_fired && !self.win_timer.is_pending() {
            self.win_timer.schedule(self.tuning.win_delay);
        }
        log::info!("Game started");
    }

    /// Frame callback with a host timestamp in milliseconds
    pub fn frame(&mut self, timestamp_ms: f64) -> Vec<SimEvent> {
        if !self.running {
            return Vec::new();
        }
        let dt = self.clock.tick(timestamp_ms);
        self.step(dt)
    }

    /// Advance by `dt` seconds of wall-clock time
    ///
    /// Timers see the full delta; physics sees it clamped.
    pub fn step(&mut self, dt: f32) -> Vec<SimEvent> {
        if !self.running {
            return Vec::new();
        }

        let elapsed = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        if self.reset_timer.advance(elapsed) {
            self.finish_throw();
        }
        if self.win_timer.advance(elapsed) {
            self.declare_win();
        }

        let events = advance(&mut self.world, &self.tuning, dt);
        for event in &events {
            self.handle_event(event);
        }
        events
    }

    pub fn snapshot(&self) -> Snapshot {
        let ball = &self.world.ball;
        Snapshot {
            ball: BallView {
                x: ball.pos.x,
                y: ball.pos.y,
                radius: ball.radius,
                active: ball.active,
            },
            cups: self
                .world
                .cups
                .iter()
                .map(|c| CupView {
                    id: c.id,
                    x: c.pos.x,
                    y: c.pos.y,
                    radius: c.radius,
                    hit: c.hit,
                    vanish: c.vanish,
                })
                .collect(),
            phase: self.phase,
            remaining: self.world.remaining(),
        }
    }

    fn handle_event(&mut self, event: &SimEvent) {
        match *event {
            SimEvent::Sunk { cup_id, .. } => {
                log::info!("Sunk cup {} ({} left)", cup_id, self.world.remaining());
                self.reset_timer.schedule(self.tuning.sink_reset_delay);
                if self.world.all_hit() && !self.win_fired {
                    self.win_timer.schedule(self.tuning.win_delay);
                }
            }
            SimEvent::Settled { .. } => {
                log::info!("Throw settled on the table");
                self.reset_timer.schedule(self.tuning.settle_reset_delay);
            }
            SimEvent::OutOfBounds => {
                log::info!("Throw left the table");
                self.reset_timer.schedule(self.tuning.settle_reset_delay);
            }
            SimEvent::TableBounce { .. } | SimEvent::CupBounce { .. } => {}
        }
    }

    /// Deferred end of a throw: ball back to launch, aim live again
    fn finish_throw(&mut self) {
        self.world.ball.return_to_launch();
        if self.phase == GamePhase::Flying {
            self.phase = GamePhase::Idle;
        }
    }

    fn declare_win(&mut self) {
        if self.win_fired {
            return;
        }
        self.win_fired = true;
        self.phase = GamePhase::Won;
        log::info!("All cups cleared!");
        if let Some(on_win) = self.on_win.as_mut() {
            on_win();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::FixedStepRunner;
    use proptest::prelude::*;
    use std::cell::Cell;
    use std::rc::Rc;

    const FRAME: f32 = 1.0 / 60.0;

    fn win_counter(game: &mut Game) -> Rc<Cell<u32>> {
        let count = Rc::new(Cell::new(0));
        let inner = count.clone();
        game.set_on_win(move || inner.set(inner.get() + 1));
        count
    }

    /// Step until the ball stops, returning the terminal event
    fn fly(game: &mut Game) -> SimEvent {
        for _ in 0..600 {
            if let Some(event) = game.step(FRAME).into_iter().find(SimEvent::is_terminal) {
                return event;
            }
        }
        panic!("throw never ended");
    }

    #[test]
    fn test_new_game_is_idle() {
        let game = Game::default();
        assert_eq!(game.phase(), GamePhase::Idle);
        assert_eq!(game.remaining(), 10);
        assert!(!game.world().ball.active);
        assert_eq!(game.aim(), AimState::default());
    }

    #[test]
    fn test_throw_only_from_idle() {
        let mut game = Game::default();
        assert!(game.throw_ball());
        assert_eq!(game.phase(), GamePhase::Flying);
        assert!(game.world().ball.active);

        let vel = game.world().ball.vel;
        assert!(!game.throw_ball(), "second throw while flying is ignored");
        assert_eq!(game.world().ball.vel, vel);
    }

    #[test]
    fn test_aim_is_clamped_at_throw() {
        let mut game = Game::default();
        game.set_angle(200.0);
        game.set_power(-50.0);
        game.throw_ball();
        assert_eq!(game.world().ball.vel, launch_velocity(MAX_ANGLE_DEG, 0.0));
        // Raw inputs are kept until the next throw
        assert_eq!(game.aim().angle_deg, 200.0);
    }

    #[test]
    fn test_centered_throw_sinks_front_cup() {
        let mut game = Game::default();
        game.set_aim(AimState::new(22.0, 86.0));
        game.throw_ball();

        let event = fly(&mut game);
        assert!(matches!(event, SimEvent::Sunk { cup_id: 0, .. }), "{event:?}");
        assert!(game.world().cups[0].hit);
        assert!(game.world().cups[1..].iter().all(|c| !c.hit));
        assert_eq!(game.remaining(), 9);

        // Still Flying while the reset is pending
        assert_eq!(game.phase(), GamePhase::Flying);
        assert!(!game.throw_ball());

        FixedStepRunner::default().run_for(&mut game, 0.7);
        assert_eq!(game.phase(), GamePhase::Idle);
        assert_eq!(game.world().ball.pos, game.tuning().launch_point());
        assert_eq!(game.world().cups[0].vanish, 1.0);
    }

    #[test]
    fn test_short_arena_throw_starts_in_play() {
        let tuning = Tuning::from_json(r#"{ "height": 400.0, "table_y": 300.0 }"#).unwrap();
        let mut game = Game::new(tuning);
        assert!(game.throw_ball());

        let events = game.step(FRAME);
        assert!(!events.contains(&SimEvent::OutOfBounds), "{events:?}");
        assert!(game.world().ball.active);
        assert!(game.world().ball.pos.y < 300.0);
        assert_eq!(game.preview()[0], game.tuning().launch_point());
    }

    #[test]
    fn test_wild_throw_returns_to_idle() {
        let mut game = Game::default();
        game.set_aim(AimState::new(0.0, 0.0));
        game.throw_ball();

        let event = fly(&mut game);
        assert!(matches!(
            event,
            SimEvent::OutOfBounds | SimEvent::Settled { .. }
        ));
        assert_eq!(game.remaining(), 10);

        FixedStepRunner::default().run_for(&mut game, 0.5);
        assert_eq!(game.phase(), GamePhase::Flying, "reset waits 0.6s");
        FixedStepRunner::default().run_for(&mut game, 0.2);
        assert_eq!(game.phase(), GamePhase::Idle);
        assert!(game.throw_ball());
    }

    #[test]
    fn test_last_cup_wins_once() {
        let mut game = Game::default();
        let wins = win_counter(&mut game);
        for cup in &mut game.world.cups[..9] {
            cup.sink();
        }

        game.set_aim(AimState::new(49.0, 94.0));
        game.throw_ball();
        let event = fly(&mut game);
        assert!(matches!(event, SimEvent::Sunk { cup_id: 9, .. }), "{event:?}");
        assert!(game.win_pending());
        assert_eq!(wins.get(), 0, "win waits for the sink to read");

        FixedStepRunner::default().run_for(&mut game, 0.35);
        assert_eq!(game.phase(), GamePhase::Won);
        assert_eq!(wins.get(), 1);

        // Further frames and the ball's own reset keep the win latched
        FixedStepRunner::default().run_for(&mut game, 3.0);
        assert_eq!(game.phase(), GamePhase::Won);
        assert_eq!(wins.get(), 1);
        assert!(!game.throw_ball());

        game.reset();
        assert_eq!(game.phase(), GamePhase::Idle);
        assert_eq!(game.remaining(), 10);
        assert_eq!(wins.get(), 1);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut game = Game::default();
        game.set_aim(AimState::new(22.0, 86.0));
        game.throw_ball();
        fly(&mut game);

        game.reset();
        let once = (game.world().clone(), game.phase());
        game.reset();
        let twice = (game.world().clone(), game.phase());

        assert_eq!(once, twice);
        assert_eq!(once.0, World::new(game.tuning()));
        assert_eq!(once.1, GamePhase::Idle);
    }

    #[test]
    fn test_reset_cancels_pending_timers() {
        let mut game = Game::default();
        let wins = win_counter(&mut game);
        for cup in &mut game.world.cups[..9] {
            cup.sink();
        }
        game.set_aim(AimState::new(49.0, 94.0));
        game.throw_ball();
        fly(&mut game);
        assert!(game.win_pending());

        game.reset();
        assert!(!game.win_pending());
        FixedStepRunner::default().run_for(&mut game, 2.0);
        assert_eq!(wins.get(), 0);
        assert_eq!(game.phase(), GamePhase::Idle);
    }

    #[test]
    fn test_stop_freezes_and_start_finishes_throw() {
        let mut game = Game::default();
        game.set_aim(AimState::new(22.0, 86.0));
        game.throw_ball();
        fly(&mut game);

        game.stop();
        assert!(!game.is_running());
        assert!(game.step(1.0).is_empty());
        assert_eq!(game.phase(), GamePhase::Flying);

        game.start();
        assert_eq!(game.phase(), GamePhase::Idle);
        assert_eq!(game.remaining(), 9);
    }

    #[test]
    fn test_frame_uses_host_timestamps() {
        let mut game = Game::default();
        game.throw_ball();
        let start = game.world().ball.pos;

        // First frame only primes the clock
        game.frame(1000.0);
        assert_eq!(game.world().ball.pos, start);

        game.frame(1016.0);
        assert_ne!(game.world().ball.pos, start);
    }

    #[test]
    fn test_snapshot_mirrors_world() {
        let mut game = Game::default();
        game.world.cups[2].sink();
        let snap = game.snapshot();
        assert_eq!(snap.cups.len(), 10);
        assert_eq!(snap.remaining, 9);
        assert!(snap.cups[2].hit);
        assert_eq!(snap.phase, GamePhase::Idle);
        assert!(!snap.ball.active);

        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["phase"], "Idle");
        assert_eq!(json["cups"][2]["hit"], true);
    }

    proptest! {
        #[test]
        fn prop_any_aim_launches_finite_velocity(angle in any::<f32>(), power in any::<f32>()) {
            let aim = AimState::new(angle, power).clamped();
            prop_assert!((0.0..=MAX_ANGLE_DEG).contains(&aim.angle_deg));
            prop_assert!((0.0..=MAX_POWER).contains(&aim.power));
            let vel = AimState::new(angle, power).velocity();
            prop_assert!(vel.is_finite());
            // Never thrown downward
            prop_assert!(vel.y <= 0.0);
        }
    }
}
