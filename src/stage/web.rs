//! Browser bindings
//!
//! Exposes a session to JavaScript. The page owns the render loop: it
//! forwards pointer events and calls `tick` once per animation frame.

use wasm_bindgen::prelude::*;

use super::LogStage;
use crate::sim::{Session, TickInput, tick};
use crate::tuning::Tuning;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialised".into());
    }
    log::info!("Platform Hop starting...");
}

/// A running game, driven from JavaScript
#[wasm_bindgen]
pub struct WebGame {
    session: Session<LogStage>,
    idle_mode: bool,
}

#[wasm_bindgen]
impl WebGame {
    /// New game; a seed of 0 picks one from the clock
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64) -> Result<WebGame, JsValue> {
        let seed = if seed == 0 {
            js_sys::Date::now() as u64
        } else {
            seed
        };
        let session = Session::with_stage(Tuning::load(), seed, LogStage)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        log::info!("Game initialized with seed: {}", seed);
        Ok(WebGame {
            session,
            idle_mode: false,
        })
    }

    pub fn press(&mut self) {
        self.step(
            TickInput {
                press: true,
                ..Default::default()
            },
            0.0,
        );
    }

    /// Release toward a world-space direction
    pub fn release(&mut self, x: f32, y: f32, z: f32) {
        self.step(
            TickInput {
                release: Some(glam::Vec3::new(x, y, z)),
                ..Default::default()
            },
            0.0,
        );
    }

    #[wasm_bindgen(js_name = releaseTowardTarget)]
    pub fn release_toward_target(&mut self) {
        self.step(
            TickInput {
                release_toward_target: true,
                ..Default::default()
            },
            0.0,
        );
    }

    /// Advance by `dt` ms of wall-clock time
    pub fn tick(&mut self, dt: f32) {
        self.step(TickInput::default(), dt);
    }

    pub fn reset(&mut self) {
        self.step(
            TickInput {
                reset: true,
                ..Default::default()
            },
            0.0,
        );
    }

    #[wasm_bindgen(js_name = setIdleMode)]
    pub fn set_idle_mode(&mut self, enabled: bool) {
        self.idle_mode = enabled;
        log::info!("Idle mode: {}", enabled);
    }

    pub fn status(&self) -> String {
        format!("{:?}", self.session.status())
    }

    /// Role position as `[x, y, z]`
    pub fn position(&self) -> Vec<f32> {
        self.session.role_position().to_array().to_vec()
    }

    pub fn score(&self) -> u64 {
        self.session.score()
    }

    #[wasm_bindgen(js_name = bestScore)]
    pub fn best_score(&self) -> u64 {
        self.session.best_score()
    }

    #[wasm_bindgen(js_name = snapshotJson)]
    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        self.session
            .snapshot_json()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Events since the last call, as a JSON array
    #[wasm_bindgen(js_name = drainEvents)]
    pub fn drain_events(&mut self) -> Result<String, JsValue> {
        let events = self.session.drain_events();
        serde_json::to_string(&events).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl WebGame {
    fn step(&mut self, mut input: TickInput, dt: f32) {
        input.idle_mode = self.idle_mode;
        tick(&mut self.session, &input, dt);
    }
}
