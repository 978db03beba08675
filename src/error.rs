//! Error taxonomy
//!
//! State-machine guard failures are reported but absorbed by the session as
//! no-ops; domain errors reject the action and are handed back to the caller.

use thiserror::Error;

use crate::sim::RoleStatus;

/// Impossible physical setup for a flight-time computation
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum DomainError {
    #[error("gravity must be positive and finite, got {0}")]
    NonPositiveGravity(f32),

    #[error("launch speed must be non-negative and finite, got {0}")]
    InvalidLaunchSpeed(f32),

    #[error("height delta must be finite, got {0}")]
    InvalidHeight(f32),

    /// The landing surface is above the apex of the arc
    #[error("landing height unreachable: {height} above launch, apex only {apex}")]
    Unreachable { height: f32, apex: f32 },
}

/// Jump controller and session errors
#[derive(Error, Debug)]
pub enum JumpError {
    #[error("cannot {op} while {status:?}")]
    InvalidStateTransition { op: &'static str, status: RoleStatus },

    #[error("landing is still being resolved")]
    ResolutionPending,

    #[error("release direction has no horizontal component")]
    InvalidDirection,

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("platform size must be positive and finite, got {0}")]
    InvalidPlatformSize(f32),

    #[error("invalid tuning: {0}")]
    InvalidTuning(String),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

impl JumpError {
    /// Guard failures that the session treats as "input ignored"
    pub fn is_ignorable(&self) -> bool {
        matches!(
            self,
            JumpError::InvalidStateTransition { .. } | JumpError::ResolutionPending
        )
    }
}
