//! Game session: platforms, score, and the landing verdict
//!
//! The session owns the current/target platform pair and decides what a
//! landing means. Hit resolution is deferred by the settle delay after the
//! role touches down; a session reset cancels a pending resolution.

use std::collections::VecDeque;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::hit::{self, Resolution};
use super::observer::{ObserverId, Observers};
use super::platform::{Platform, PlatformGenerator};
use super::role::{CosmeticKind, Landing, Launch, Role, RoleSnapshot, RoleStatus};
use crate::error::JumpError;
use crate::stage::{NoopStage, Stage};
use crate::tuning::Tuning;

/// Maximum undrained events kept by a session
pub const MAX_PENDING_EVENTS: usize = 256;

/// Observable session events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ChargeStarted { at_ms: f64 },
    Launched(Launch),
    /// Role touched down; the verdict follows after the settle delay
    JumpComplete(Landing),
    Resolved(Resolution),
    PlatformSpawned { id: u32, position: Vec3, size: f32 },
    Advanced { score: u64 },
    GameOver { score: u64, best_score: u64 },
    Reset,
}

/// Serializable view of a session, for debugging and inspection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub seed: u64,
    pub clock_ms: f64,
    pub score: u64,
    pub best_score: u64,
    pub jumps: u64,
    pub current: Platform,
    pub target: Platform,
    pub role: RoleSnapshot,
    pub pending_check_ms: Option<f32>,
    pub last_resolution: Option<Resolution>,
}

/// One running game
#[derive(Debug)]
pub struct Session<S: Stage = NoopStage> {
    pub(crate) tuning: Tuning,
    seed: u64,
    pub(crate) role: Role,
    generator: PlatformGenerator,
    current: Platform,
    target: Platform,
    score: u64,
    best_score: u64,
    jumps: u64,
    /// Session clock (ms), advanced by ticks
    pub(crate) clock_ms: f64,
    /// Time left before the pending hit-check runs
    pub(crate) pending_check_ms: Option<f32>,
    last_resolution: Option<Resolution>,
    events: VecDeque<GameEvent>,
    observers: Observers<GameEvent>,
    stage: S,
}

impl Session<NoopStage> {
    /// Headless session
    pub fn new(tuning: Tuning, seed: u64) -> Result<Self, JumpError> {
        Self::with_stage(tuning, seed, NoopStage)
    }
}

impl<S: Stage> Session<S> {
    pub fn with_stage(tuning: Tuning, seed: u64, stage: S) -> Result<Self, JumpError> {
        tuning.validate()?;

        let mut generator = PlatformGenerator::new(&tuning, seed)?;
        let current = generator.create_at(tuning.first_table);
        let target = generator.create_at(tuning.second_table);

        let mut session = Self {
            role: Role::new(&tuning),
            tuning,
            seed,
            generator,
            current,
            target,
            score: 0,
            best_score: 0,
            jumps: 0,
            clock_ms: 0.0,
            pending_check_ms: None,
            last_resolution: None,
            events: VecDeque::with_capacity(MAX_PENDING_EVENTS),
            observers: Observers::new(),
            stage,
        };
        session.show_platforms();

        log::info!("Session started with seed {}", seed);
        Ok(session)
    }

    // === Queries ===

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn role(&self) -> &Role {
        &self.role
    }

    /// Mutable role access, for jump-complete observers and placement
    pub fn role_mut(&mut self) -> &mut Role {
        &mut self.role
    }

    pub fn status(&self) -> RoleStatus {
        self.role.status()
    }

    pub fn role_position(&self) -> Vec3 {
        self.role.position()
    }

    /// Platform being departed
    pub fn current(&self) -> &Platform {
        &self.current
    }

    /// Platform being jumped toward
    pub fn target(&self) -> &Platform {
        &self.target
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn best_score(&self) -> u64 {
        self.best_score
    }

    pub fn jumps(&self) -> u64 {
        self.jumps
    }

    pub fn clock_ms(&self) -> f64 {
        self.clock_ms
    }

    pub fn resolution_pending(&self) -> bool {
        self.pending_check_ms.is_some()
    }

    pub fn last_resolution(&self) -> Option<Resolution> {
        self.last_resolution
    }

    pub fn stage(&self) -> &S {
        &self.stage
    }

    pub fn stage_mut(&mut self) -> &mut S {
        &mut self.stage
    }

    /// Ground-plane direction from the role to the target centre
    pub fn aim(&self) -> Vec3 {
        let to_target = self.target.position() - self.role.position();
        Vec3::new(to_target.x, 0.0, to_target.z)
    }

    // === Events ===

    /// Subscribe to every session event
    pub fn subscribe(&mut self, callback: impl FnMut(&GameEvent) + 'static) -> ObserverId {
        self.observers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Take the events queued since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain(..).collect()
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.observers.notify(&event);
        if self.events.len() >= MAX_PENDING_EVENTS {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    // === Input ===

    /// Start charging at the current session time
    pub fn press(&mut self) -> Result<(), JumpError> {
        if self.pending_check_ms.is_some() {
            return Err(JumpError::ResolutionPending);
        }
        self.role.press(self.clock_ms)?;
        self.emit(GameEvent::ChargeStarted {
            at_ms: self.clock_ms,
        });
        Ok(())
    }

    /// Release toward an arbitrary world-space direction
    pub fn release(&mut self, direction: Vec3) -> Result<Launch, JumpError> {
        let launch = self.role.release(direction, self.clock_ms)?;
        self.jumps += 1;
        self.stage
            .cosmetic_started(CosmeticKind::JumpRotate, launch.flight_ms);
        self.emit(GameEvent::Launched(launch));
        Ok(launch)
    }

    /// Release toward the target platform centre
    pub fn release_toward_target(&mut self) -> Result<Launch, JumpError> {
        self.release(self.aim())
    }

    // === Flow ===

    /// Fresh platforms, role back at spawn, score cleared
    ///
    /// Cancels any pending hit-check and running cosmetics.
    pub fn reset(&mut self) {
        self.pending_check_ms = None;
        self.last_resolution = None;
        self.score = 0;
        self.role.reset();
        self.current = self.generator.create_at(self.tuning.first_table);
        self.target = self.generator.create_at(self.tuning.second_table);

        self.stage.cleared();
        self.show_platforms();
        self.emit(GameEvent::Reset);
        log::info!("Session reset");
    }

    /// Announce the starting pair of platforms
    fn show_platforms(&mut self) {
        let current = self.current.clone();
        let target = self.target.clone();
        self.spawned(&current);
        self.spawned(&target);
        self.stage.focus(&self.current, &self.target);
    }

    fn spawned(&mut self, platform: &Platform) {
        self.stage.platform_spawned(platform);
        self.emit(GameEvent::PlatformSpawned {
            id: platform.id(),
            position: platform.position(),
            size: platform.size(),
        });
    }

    /// Touchdown: schedule the hit-check after the settle delay
    pub(crate) fn on_landed(&mut self, landing: Landing) {
        self.emit(GameEvent::JumpComplete(landing));
        let delay = self.tuning.settle_delay_ms;
        if delay > 0.0 {
            self.pending_check_ms = Some(delay);
        } else {
            self.resolve_landing();
        }
    }

    /// Judge the role's position now and act on the verdict
    pub fn resolve_landing(&mut self) -> Resolution {
        self.pending_check_ms = None;

        let resolution = hit::resolve(
            &self.current,
            &self.target,
            self.role.position(),
            self.role.size(),
        );
        log::debug!("Landing at {} resolved as {:?}", self.role.position(), resolution);
        self.last_resolution = Some(resolution);
        self.emit(GameEvent::Resolved(resolution));

        match resolution {
            Resolution::StayedOnCurrent => {}
            Resolution::TeeterOnCurrent => {
                self.role.teeter(None);
                self.stage
                    .cosmetic_started(CosmeticKind::Teeter, self.tuning.teeter_ms);
            }
            Resolution::Advance => self.advance(),
            Resolution::FallFromEdge => {
                self.role.die_rotate(self.target.position(), None);
                self.stage
                    .cosmetic_started(CosmeticKind::DieRotate, self.tuning.die_rotate_ms);
            }
            Resolution::FallStraight => {
                self.role.die_vertical(None);
                self.stage
                    .cosmetic_started(CosmeticKind::DieVertical, self.tuning.die_vertical_ms);
            }
        }
        resolution
    }

    /// The target becomes the current platform and a new target appears
    fn advance(&mut self) {
        self.score += 1;
        self.best_score = self.best_score.max(self.score);

        let next = self.generator.create_next(&self.target);
        self.current = std::mem::replace(&mut self.target, next.clone());

        self.spawned(&next);
        self.stage.focus(&self.current, &self.target);
        self.emit(GameEvent::Advanced { score: self.score });
    }

    /// A fall animation finished
    pub(crate) fn game_over(&mut self) {
        log::info!("Game over: score {} (best {})", self.score, self.best_score);
        self.emit(GameEvent::GameOver {
            score: self.score,
            best_score: self.best_score,
        });
        self.reset();
    }

    // === Introspection ===

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            seed: self.seed,
            clock_ms: self.clock_ms,
            score: self.score,
            best_score: self.best_score,
            jumps: self.jumps,
            current: self.current.clone(),
            target: self.target.clone(),
            role: self.role.snapshot(),
            pending_check_ms: self.pending_check_ms,
            last_resolution: self.last_resolution,
        }
    }

    pub fn snapshot_json(&self) -> Result<String, JumpError> {
        Ok(serde_json::to_string_pretty(&self.snapshot())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(Tuning::default(), 12345).unwrap()
    }

    #[test]
    fn test_new_session_layout() {
        let session = session();
        let tuning = Tuning::default();
        assert_eq!(session.current().position(), tuning.first_table);
        assert_eq!(session.target().position(), tuning.second_table);
        assert_eq!(session.role_position(), tuning.role_spawn);
        assert_eq!(session.status(), RoleStatus::Idle);
        assert_eq!(session.score(), 0);
        assert!(!session.resolution_pending());
    }

    #[test]
    fn test_starting_platforms_are_announced() {
        let mut session = session();
        let positions = |events: &[GameEvent]| {
            events
                .iter()
                .filter_map(|e| match e {
                    GameEvent::PlatformSpawned { position, .. } => Some(*position),
                    _ => None,
                })
                .collect::<Vec<_>>()
        };
        let tuning = Tuning::default();
        let pair = vec![tuning.first_table, tuning.second_table];

        assert_eq!(positions(&session.drain_events()[..]), pair);

        let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let sink = std::rc::Rc::clone(&seen);
        session.subscribe(move |e| sink.borrow_mut().push(e.clone()));
        session.reset();
        assert_eq!(positions(&seen.borrow()[..]), pair);
        assert_eq!(seen.borrow().last(), Some(&GameEvent::Reset));
    }

    #[test]
    fn test_event_queue_keeps_newest() {
        let mut session = session();
        session.drain_events();
        for _ in 0..MAX_PENDING_EVENTS + 10 {
            session.emit(GameEvent::Reset);
        }
        session.emit(GameEvent::Advanced { score: 9 });

        let events = session.drain_events();
        assert_eq!(events.len(), MAX_PENDING_EVENTS);
        assert_eq!(events.last(), Some(&GameEvent::Advanced { score: 9 }));
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn test_invalid_tuning_rejected() {
        let tuning = Tuning {
            gravity: -1.0,
            ..Tuning::default()
        };
        assert!(matches!(
            Session::new(tuning, 1),
            Err(JumpError::InvalidTuning(_))
        ));
    }

    #[test]
    fn test_aim_points_at_target_on_ground_plane() {
        let session = session();
        let aim = session.aim();
        assert_eq!(aim.y, 0.0);
        assert!((aim.x - 6.7).abs() < 1e-5);
        assert_eq!(aim.z, 0.0);
    }

    #[test]
    fn test_advance_moves_platform_window() {
        let mut session = session();
        let old_target = session.target().clone();
        session
            .role_mut()
            .set_position(old_target.position())
            .unwrap();

        assert_eq!(session.resolve_landing(), Resolution::Advance);
        assert_eq!(session.score(), 1);
        assert_eq!(session.best_score(), 1);
        assert_eq!(session.current(), &old_target);
        assert_ne!(session.target().id(), old_target.id());

        let events = session.drain_events();
        assert!(events.contains(&GameEvent::Advanced { score: 1 }));
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn test_teeter_on_departure_edge_keeps_playing() {
        let mut session = session();
        let edge = session.current().position() + Vec3::new(1.36, 0.0, 0.0);
        session.role_mut().set_position(edge).unwrap();

        assert_eq!(session.resolve_landing(), Resolution::TeeterOnCurrent);
        assert_eq!(session.status(), RoleStatus::Idle);
        assert_eq!(session.role().cosmetics()[0].kind, CosmeticKind::Teeter);
        assert!(session.press().is_ok());
    }

    #[test]
    fn test_press_refused_while_resolution_pending() {
        let mut session = session();
        session.pending_check_ms = Some(100.0);
        assert!(matches!(session.press(), Err(JumpError::ResolutionPending)));
        assert_eq!(session.status(), RoleStatus::Idle);
    }

    #[test]
    fn test_reset_clears_pending_check_and_score() {
        let mut session = session();
        let target = session.target().position();
        session.role_mut().set_position(target).unwrap();
        session.resolve_landing();
        session.pending_check_ms = Some(250.0);

        session.reset();
        assert_eq!(session.score(), 0);
        assert_eq!(session.best_score(), 1);
        assert!(!session.resolution_pending());
        assert_eq!(session.current().position(), session.tuning().first_table);
        assert_eq!(session.drain_events().last(), Some(&GameEvent::Reset));
    }

    #[test]
    fn test_snapshot_json_round_trips() {
        let session = session();
        let json = session.snapshot_json().unwrap();
        let parsed: SessionSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, session.snapshot());
    }
}
