//! Browser binding
//!
//! Exposes the game to JavaScript and drives it with `requestAnimationFrame`.
//! Rendering stays in the page: it reads `snapshot()` each frame.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::game::Game;
use crate::tuning::Tuning;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    // Ignore a second init when several handles share one page
    let _ = console_log::init_with_level(log::Level::Info);
}

struct WebState {
    game: Game,
    /// Outstanding animation frame request
    raf_id: Option<i32>,
    on_win: Option<js_sys::Function>,
    /// Set by the game's win callback; JS is called after the borrow ends
    won: Rc<Cell<bool>>,
}

/// Handle owned by the page
#[wasm_bindgen]
pub struct CupTossHandle {
    state: Rc<RefCell<WebState>>,
}

#[wasm_bindgen]
impl CupTossHandle {
    /// Create a game, optionally overriding tuning with a JSON document
    #[wasm_bindgen(constructor)]
    pub fn new(tuning_json: Option<String>) -> Result<CupTossHandle, JsValue> {
        let tuning = match tuning_json {
            Some(json) => Tuning::from_json(&json).map_err(|e| JsValue::from_str(&e.to_string()))?,
            None => Tuning::default(),
        };

        let won = Rc::new(Cell::new(false));
        let mut game = Game::new(tuning);
        let flag = won.clone();
        game.set_on_win(move || flag.set(true));
        // Frames only flow after `start`
        game.stop();

        Ok(Self {
            state: Rc::new(RefCell::new(WebState {
                game,
                raf_id: None,
                on_win: None,
                won,
            })),
        })
    }

    /// Begin the frame loop
    pub fn start(&self) {
        {
            let mut s = self.state.borrow_mut();
            if s.game.is_running() {
                return;
            }
            s.game.start();
        }
        request_frame(&self.state);
    }

    /// Cancel the pending frame and any deferred reset/win
    pub fn stop(&self) {
        let mut s = self.state.borrow_mut();
        s.game.stop();
        if let Some(id) = s.raf_id.take() {
            if let Some(window) = web_sys::window() {
                let _ = window.cancel_animation_frame(id);
            }
        }
    }

    #[wasm_bindgen(js_name = setAngle)]
    pub fn set_angle(&self, degrees: f32) {
        self.state.borrow_mut().game.set_angle(degrees);
    }

    #[wasm_bindgen(js_name = setPower)]
    pub fn set_power(&self, power: f32) {
        self.state.borrow_mut().game.set_power(power);
    }

    /// Returns false when the throw was ignored (not idle)
    #[wasm_bindgen(js_name = throwBall)]
    pub fn throw_ball(&self) -> bool {
        self.state.borrow_mut().game.throw_ball()
    }

    pub fn reset(&self) {
        self.state.borrow_mut().game.reset();
    }

    #[wasm_bindgen(js_name = onWin)]
    pub fn on_win(&self, callback: js_sys::Function) {
        self.state.borrow_mut().on_win = Some(callback);
    }

    /// Current ball, cups, phase and remaining count as JSON
    pub fn snapshot(&self) -> Result<String, JsValue> {
        let s = self.state.borrow();
        serde_json::to_string(&s.game.snapshot()).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Aim guide points as a JSON array of `[x, y]`
    pub fn preview(&self) -> Result<String, JsValue> {
        let s = self.state.borrow();
        serde_json::to_string(&s.game.preview()).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl Drop for CupTossHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

fn request_frame(state: &Rc<RefCell<WebState>>) {
    let Some(window) = web_sys::window() else {
        log::error!("No window; frame loop not started");
        return;
    };

    // Weak so a dropped handle does not keep the loop alive
    let weak = Rc::downgrade(state);
    let closure = Closure::once(move |time: f64| {
        if let Some(state) = weak.upgrade() {
            frame_loop(state, time);
        }
    });
    match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
        Ok(id) => state.borrow_mut().raf_id = Some(id),
        Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
    }
    closure.forget();
}

fn frame_loop(state: Rc<RefCell<WebState>>, time: f64) {
    let notify = {
        let mut s = state.borrow_mut();
        s.raf_id = None;
        if !s.game.is_running() {
            return;
        }
        s.game.frame(time);
        if s.won.replace(false) {
            s.on_win.clone()
        } else {
            None
        }
    };

    if let Some(callback) = notify {
        if let Err(e) = callback.call0(&JsValue::NULL) {
            log::warn!("onWin callback threw: {:?}", e);
        }
    }

    // The callback may have stopped the game
    if state.borrow().game.is_running() {
        request_frame(&state);
    }
}
