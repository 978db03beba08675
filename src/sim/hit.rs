//! Landing classification
//!
//! A landing is judged on the ground plane only: the planar distance between
//! the role and a platform centre against the platform half-size and the role
//! half-size. Both boundaries are inclusive on the "decided" side: exactly
//! `size / 2` is Inner, exactly `size / 2 + role_size / 2` is Outer.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::platform::Platform;
use crate::planar_distance;

/// Where the role ended up relative to one platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitResult {
    /// Safely on top
    Inner,
    /// Straddling the edge
    EdgeOut,
    /// Missed entirely
    Outer,
}

/// Classify `role_pos` against `platform`
pub fn classify(platform: &Platform, role_pos: Vec3, role_size: f32) -> HitResult {
    let distance = planar_distance(platform.position(), role_pos);
    let half = platform.half_size();

    if distance <= half {
        HitResult::Inner
    } else if distance >= half + role_size / 2.0 {
        HitResult::Outer
    } else {
        HitResult::EdgeOut
    }
}

/// What a landing means for the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    /// Came back down on the departure platform; nothing happens
    StayedOnCurrent,
    /// Near-miss on the departure platform's edge; tolerated
    TeeterOnCurrent,
    /// Landed on the target
    Advance,
    /// Caught the target's edge and tips off
    FallFromEdge,
    /// Dropped into the gap
    FallStraight,
}

impl Resolution {
    pub fn is_failure(self) -> bool {
        matches!(self, Resolution::FallFromEdge | Resolution::FallStraight)
    }
}

/// Two-stage judgement of a landing
///
/// The target is only consulted once the role has cleared the departure
/// platform entirely.
pub fn resolve(current: &Platform, target: &Platform, role_pos: Vec3, role_size: f32) -> Resolution {
    match classify(current, role_pos, role_size) {
        HitResult::Inner => Resolution::StayedOnCurrent,
        HitResult::EdgeOut => Resolution::TeeterOnCurrent,
        HitResult::Outer => match classify(target, role_pos, role_size) {
            HitResult::Inner => Resolution::Advance,
            HitResult::EdgeOut => Resolution::FallFromEdge,
            HitResult::Outer => Resolution::FallStraight,
        },
    }
}
