//! Presentation collaborator abstraction
//!
//! The simulation never renders. It tells a [`Stage`] what happened and the
//! stage decides how to show it: meshes for platforms, tweens for cosmetics,
//! camera moves for focus changes. Every method has a no-op default, so a
//! stage only implements what it draws.

#[cfg(target_arch = "wasm32")]
pub mod web;

use crate::sim::{CosmeticKind, Platform};

/// Receiver of presentation requests from a session
pub trait Stage {
    /// A platform now exists and should be shown
    fn platform_spawned(&mut self, _platform: &Platform) {}

    /// Start a cosmetic animation lasting `duration_ms`
    fn cosmetic_started(&mut self, _kind: CosmeticKind, _duration_ms: f32) {}

    /// Frame the camera between the platform being left and the next one
    fn focus(&mut self, _current: &Platform, _target: &Platform) {}

    /// The session was reset: drop every platform and running animation
    fn cleared(&mut self) {}
}

/// Stage that shows nothing (headless simulation, tests)
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStage;

impl Stage for NoopStage {}

/// Stage that logs every request
#[derive(Debug, Clone, Copy, Default)]
pub struct LogStage;

impl Stage for LogStage {
    fn platform_spawned(&mut self, platform: &Platform) {
        log::info!(
            "Platform #{} at {} (size {:.2})",
            platform.id(),
            platform.position(),
            platform.size()
        );
    }

    fn cosmetic_started(&mut self, kind: CosmeticKind, duration_ms: f32) {
        log::debug!("Cosmetic {:?} for {:.0} ms", kind, duration_ms);
    }

    fn focus(&mut self, current: &Platform, target: &Platform) {
        let midpoint = (current.position() + target.position()) / 2.0;
        log::debug!("Camera focus {}", midpoint);
    }

    fn cleared(&mut self) {
        log::info!("Stage cleared");
    }
}
