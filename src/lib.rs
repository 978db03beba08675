//! Platform Hop - A charge-and-jump platform hopping game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (kinematics, trajectory, hit resolution, session)
//! - `stage`: Presentation collaborator abstraction (rendering lives outside this crate)
//! - `tuning`: Data-driven game balance
//! - `error`: Error taxonomy for the jump controller and session

pub mod error;
pub mod sim;
pub mod stage;
pub mod tuning;

pub use error::{DomainError, JumpError};
pub use tuning::Tuning;

use glam::{Vec2, Vec3};

/// Reference game constants (defaults for [`Tuning`])
pub mod consts {
    /// Platform height (the box the role stands on)
    pub const TABLE_HEIGHT: f32 = 5.0 / 3.0;
    /// Platform footprint side length
    pub const TABLE_SIZE: f32 = 8.0 / 3.0;
    /// World height the role stands at when grounded (top of a platform)
    pub const GROUND_Y: f32 = TABLE_HEIGHT;

    /// Role spawn point (centre of the first platform, on its top face)
    pub const ROLE_SPAWN: [f32; 3] = [-2.5, GROUND_Y, 0.0];
    /// Role footprint diameter used by hit classification
    pub const ROLE_SIZE: f32 = 0.1;

    /// First two platforms of every session
    pub const FIRST_TABLE: [f32; 3] = [-2.5, 0.0, 0.0];
    pub const SECOND_TABLE: [f32; 3] = [4.2, 0.0, 0.0];

    /// Gravity (units/ms²)
    pub const GRAVITY: f32 = 0.0001;

    /// Charge-to-speed coefficients (units/ms per ms of charge) and caps (units/ms).
    /// Both saturate at 2000 ms of charge.
    pub const HORIZONTAL_SPEED_PER_MS: f32 = 0.02 / 2000.0;
    pub const HORIZONTAL_SPEED_MAX: f32 = 0.02;
    pub const VERTICAL_SPEED_PER_MS: f32 = 0.04 / 2000.0;
    pub const VERTICAL_SPEED_MAX: f32 = 0.04;

    /// Next-platform distance: MIN + floor(random * STEPS)
    pub const TABLE_DISTANCE_MIN: f32 = 3.2;
    pub const TABLE_DISTANCE_STEPS: u32 = 7;

    /// Delay between landing and hit resolution (lets the landing settle)
    pub const SETTLE_DELAY_MS: f32 = 300.0;
    /// Cosmetic durations
    pub const TEETER_MS: f32 = 400.0;
    pub const DIE_VERTICAL_MS: f32 = 500.0;
    pub const DIE_ROTATE_MS: f32 = 800.0;

    /// Largest integration sub-step (one 60 Hz frame)
    pub const MAX_STEP_MS: f32 = 1000.0 / 60.0;
    /// Frames longer than this are clamped (tab switch, debugger pause)
    pub const MAX_FRAME_MS: f32 = 250.0;
}

/// Distance between two points projected onto the ground (X/Z) plane
#[inline]
pub fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    planar(a - b).length()
}

/// Project a world-space vector onto the ground plane as (x, z)
#[inline]
pub fn planar(v: Vec3) -> Vec2 {
    Vec2::new(v.x, v.z)
}

/// Lift a ground-plane (x, z) vector back into world space at height `y`
#[inline]
pub fn unplanar(v: Vec2, y: f32) -> Vec3 {
    Vec3::new(v.x, y, v.y)
}
