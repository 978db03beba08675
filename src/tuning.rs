//! Data-driven game balance
//!
//! Every constant that shapes how the game feels lives here. Defaults match
//! [`crate::consts`]; a partial JSON document overrides only the fields it names.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::JumpError;

/// Game tuning knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === World ===
    /// Height the role stands at when grounded
    pub ground_y: f32,
    /// Footprint side length shared by every platform
    pub table_size: f32,
    /// Role footprint diameter
    pub role_size: f32,
    /// Role spawn point
    pub role_spawn: Vec3,
    /// Departure platform of a fresh session
    pub first_table: Vec3,
    /// Target platform of a fresh session
    pub second_table: Vec3,

    // === Physics ===
    /// Gravity magnitude (units/ms²)
    pub gravity: f32,
    pub horizontal_speed_per_ms: f32,
    pub horizontal_speed_max: f32,
    pub vertical_speed_per_ms: f32,
    pub vertical_speed_max: f32,
    /// Largest integration sub-step (ms)
    pub max_step_ms: f32,
    /// Largest frame delta accepted by a tick (ms)
    pub max_frame_ms: f32,

    // === Difficulty ===
    /// Shortest gap to the next platform
    pub table_distance_min: f32,
    /// Number of integer distance increments above the minimum
    pub table_distance_steps: u32,

    // === Timing ===
    /// Pause between landing and hit resolution (ms)
    pub settle_delay_ms: f32,
    pub teeter_ms: f32,
    pub die_vertical_ms: f32,
    pub die_rotate_ms: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            ground_y: GROUND_Y,
            table_size: TABLE_SIZE,
            role_size: ROLE_SIZE,
            role_spawn: Vec3::from_array(ROLE_SPAWN),
            first_table: Vec3::from_array(FIRST_TABLE),
            second_table: Vec3::from_array(SECOND_TABLE),

            gravity: GRAVITY,
            horizontal_speed_per_ms: HORIZONTAL_SPEED_PER_MS,
            horizontal_speed_max: HORIZONTAL_SPEED_MAX,
            vertical_speed_per_ms: VERTICAL_SPEED_PER_MS,
            vertical_speed_max: VERTICAL_SPEED_MAX,
            max_step_ms: MAX_STEP_MS,
            max_frame_ms: MAX_FRAME_MS,

            table_distance_min: TABLE_DISTANCE_MIN,
            table_distance_steps: TABLE_DISTANCE_STEPS,

            settle_delay_ms: SETTLE_DELAY_MS,
            teeter_ms: TEETER_MS,
            die_vertical_ms: DIE_VERTICAL_MS,
            die_rotate_ms: DIE_ROTATE_MS,
        }
    }
}

impl Tuning {
    /// Parse and validate a JSON tuning document
    pub fn from_json(json: &str) -> Result<Self, JumpError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String, JumpError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject setups the simulation cannot run with
    pub fn validate(&self) -> Result<(), JumpError> {
        let positive = [
            ("table_size", self.table_size),
            ("gravity", self.gravity),
            ("max_step_ms", self.max_step_ms),
            ("max_frame_ms", self.max_frame_ms),
            ("table_distance_min", self.table_distance_min),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(JumpError::InvalidTuning(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }

        let non_negative = [
            ("role_size", self.role_size),
            ("horizontal_speed_per_ms", self.horizontal_speed_per_ms),
            ("horizontal_speed_max", self.horizontal_speed_max),
            ("vertical_speed_per_ms", self.vertical_speed_per_ms),
            ("vertical_speed_max", self.vertical_speed_max),
            ("settle_delay_ms", self.settle_delay_ms),
            ("teeter_ms", self.teeter_ms),
            ("die_vertical_ms", self.die_vertical_ms),
            ("die_rotate_ms", self.die_rotate_ms),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(JumpError::InvalidTuning(format!(
                    "{name} must be non-negative, got {value}"
                )));
            }
        }

        if self.table_distance_steps == 0 {
            return Err(JumpError::InvalidTuning(
                "table_distance_steps must be at least 1".to_string(),
            ));
        }

        let points = [
            ("role_spawn", self.role_spawn),
            ("first_table", self.first_table),
            ("second_table", self.second_table),
        ];
        for (name, point) in points {
            if !point.is_finite() {
                return Err(JumpError::InvalidTuning(format!(
                    "{name} must be finite, got {point}"
                )));
            }
        }
        if !self.ground_y.is_finite() {
            return Err(JumpError::InvalidTuning(format!(
                "ground_y must be finite, got {}",
                self.ground_y
            )));
        }

        Ok(())
    }

    /// Charge duration after which both launch speeds are saturated
    pub fn saturation_ms(&self) -> f32 {
        let h = if self.horizontal_speed_per_ms > 0.0 {
            self.horizontal_speed_max / self.horizontal_speed_per_ms
        } else {
            0.0
        };
        let v = if self.vertical_speed_per_ms > 0.0 {
            self.vertical_speed_max / self.vertical_speed_per_ms
        } else {
            0.0
        };
        h.max(v)
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "platform_hop_tuning";

    /// Load tuning overrides from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(tuning) => {
                        log::info!("Loaded tuning from LocalStorage");
                        return tuning;
                    }
                    Err(e) => log::warn!("Ignoring stored tuning: {e}"),
                }
            }
        }

        log::info!("Using default tuning");
        Self::default()
    }

    /// Native: defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}
