//! Per-frame simulation tick
//!
//! Advances the session clock, applies the frame's input, flies the role and
//! runs the deferred hit-check once the settle delay has elapsed.

use glam::Vec3;

use super::autopilot;
use super::role::{CosmeticKind, RoleEvent};
use super::session::Session;
use crate::error::JumpError;
use crate::stage::Stage;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer went down
    pub press: bool,
    /// Pointer went up, with a world-space jump direction
    pub release: Option<Vec3>,
    /// Pointer went up; jump toward the target platform
    pub release_toward_target: bool,
    /// Restart the session
    pub reset: bool,
    /// Idle/demo mode - autopilot plays the game
    pub idle_mode: bool,
}

/// Input errors never stop the frame; guard failures are expected noise
fn absorb<T>(result: Result<T, JumpError>) {
    match result {
        Ok(_) => {}
        Err(e) if e.is_ignorable() => log::debug!("Input ignored: {}", e),
        Err(e) => log::warn!("Input rejected: {}", e),
    }
}

/// Advance the session by one frame of `dt` ms
pub fn tick<S: Stage>(session: &mut Session<S>, input: &TickInput, dt: f32) {
    let dt = if dt.is_finite() && dt > 0.0 {
        dt.min(session.tuning.max_frame_ms)
    } else {
        0.0
    };

    if input.reset {
        session.reset();
        return;
    }

    session.clock_ms += f64::from(dt);

    // Hit-check scheduled by an earlier landing
    if let Some(remaining) = session.pending_check_ms {
        let remaining = remaining - dt;
        if remaining <= 0.0 {
            session.resolve_landing();
        } else {
            session.pending_check_ms = Some(remaining);
        }
    }

    let mut input = input.clone();
    if input.idle_mode {
        autopilot::drive(session, &mut input);
    }

    if input.press {
        absorb(session.press());
    }
    if let Some(direction) = input.release {
        absorb(session.release(direction));
    } else if input.release_toward_target {
        absorb(session.release_toward_target());
    }

    for event in session.role.tick(dt) {
        match event {
            RoleEvent::Landed(landing) => session.on_landed(landing),
            RoleEvent::CosmeticFinished(CosmeticKind::DieVertical | CosmeticKind::DieRotate) => {
                session.game_over();
                // The old role's remaining events belong to the previous game
                break;
            }
            RoleEvent::CosmeticFinished(_) => {}
        }
    }
}
