//! Idle/demo mode: plays the game by itself
//!
//! Aims at the target centre and holds the press for exactly as long as the
//! kinematics say that distance needs.

use super::kinematics::charge_for_reach;
use super::role::RoleStatus;
use super::session::Session;
use super::tick::TickInput;
use crate::planar_distance;
use crate::stage::Stage;

/// Charge duration (ms) that carries the role onto the target centre
pub fn planned_charge<S: Stage>(session: &Session<S>) -> Option<f32> {
    let role = session.role();
    let distance = planar_distance(role.position(), session.target().position());
    let height = role.position().y - session.tuning().ground_y;
    charge_for_reach(distance, session.tuning(), height)
}

/// Fill in the press/release inputs for this tick
pub fn drive<S: Stage>(session: &Session<S>, input: &mut TickInput) {
    match session.status() {
        RoleStatus::Idle if !session.resolution_pending() => {
            input.press = true;
        }
        RoleStatus::Charging => {
            let held = session
                .role()
                .charge_elapsed(session.clock_ms())
                .unwrap_or(0.0);
            // Out of reach: jump as far as possible anyway
            let wanted = planned_charge(session).unwrap_or_else(|| session.tuning().saturation_ms());
            if held >= wanted {
                input.release_toward_target = true;
            }
        }
        _ => {}
    }
}
