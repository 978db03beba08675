//! Charge-to-launch mapping and ballistic flight time
//!
//! Launch speeds are capped-linear in the charge duration: both grow with
//! the time the press was held and saturate at their tuned maxima. All
//! quantities are in world units and milliseconds.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::tuning::Tuning;

/// Launch speeds derived from one charge
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LaunchSpeeds {
    /// Ground-plane speed (units/ms)
    pub horizontal: f32,
    /// Initial upward speed (units/ms)
    pub vertical: f32,
}

#[inline]
fn charge(charge_ms: f32) -> f32 {
    // NaN and negative durations count as no charge
    if charge_ms > 0.0 { charge_ms } else { 0.0 }
}

/// Horizontal launch speed for a charge of `charge_ms`
pub fn horizontal_speed(charge_ms: f32, tuning: &Tuning) -> f32 {
    (tuning.horizontal_speed_per_ms * charge(charge_ms)).min(tuning.horizontal_speed_max)
}

/// Vertical launch speed for a charge of `charge_ms`
pub fn vertical_speed(charge_ms: f32, tuning: &Tuning) -> f32 {
    (tuning.vertical_speed_per_ms * charge(charge_ms)).min(tuning.vertical_speed_max)
}

pub fn launch_speeds(charge_ms: f32, tuning: &Tuning) -> LaunchSpeeds {
    LaunchSpeeds {
        horizontal: horizontal_speed(charge_ms, tuning),
        vertical: vertical_speed(charge_ms, tuning),
    }
}

/// Height of the apex above the launch plane
#[inline]
pub fn apex_height(v0: f32, g: f32) -> f32 {
    v0 * v0 / (2.0 * g)
}

/// Total flight time of a ballistic arc
///
/// `v0` is the initial upward speed, `g` the gravity magnitude and `h` the
/// launch height above the landing surface (positive when landing below the
/// launch plane). The result is the symmetric arc `2 * v0 / g` plus the extra
/// time spent falling the remaining `h`.
pub fn time_to_land(v0: f32, g: f32, h: f32) -> Result<f32, DomainError> {
    if !(g.is_finite() && g > 0.0) {
        return Err(DomainError::NonPositiveGravity(g));
    }
    if !(v0.is_finite() && v0 >= 0.0) {
        return Err(DomainError::InvalidLaunchSpeed(v0));
    }
    if !h.is_finite() {
        return Err(DomainError::InvalidHeight(h));
    }

    let symmetric = 2.0 * v0 / g;
    if h == 0.0 {
        return Ok(symmetric);
    }

    let discriminant = v0 * v0 + 2.0 * g * h;
    if discriminant < 0.0 {
        return Err(DomainError::Unreachable {
            height: -h,
            apex: apex_height(v0, g),
        });
    }

    let below_launch = (discriminant.sqrt() - v0) / g;
    Ok((symmetric + below_launch).max(0.0))
}

/// Ground distance covered by a jump charged for `charge_ms`
pub fn reach(charge_ms: f32, tuning: &Tuning, h: f32) -> Result<f32, DomainError> {
    let speeds = launch_speeds(charge_ms, tuning);
    let flight = time_to_land(speeds.vertical, tuning.gravity, h)?;
    Ok(speeds.horizontal * flight)
}

/// Shortest charge whose jump covers at least `distance`
///
/// Returns `None` when even a saturated charge falls short.
pub fn charge_for_reach(distance: f32, tuning: &Tuning, h: f32) -> Option<f32> {
    if !distance.is_finite() {
        return None;
    }
    if distance <= 0.0 {
        return Some(0.0);
    }

    // Charges too weak to clear a raised landing surface reach nothing
    let reach_at = |ms: f32| reach(ms, tuning, h).unwrap_or(0.0);

    let mut hi = tuning.saturation_ms();
    if reach_at(hi) < distance {
        return None;
    }

    let mut lo = 0.0_f32;
    for _ in 0..48 {
        let mid = 0.5 * (lo + hi);
        if reach_at(mid) < distance {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    Some(hi)
}
