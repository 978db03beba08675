//! The jumping character and its state machine
//!
//! ```text
//! Idle --press--> Charging --release--> Airborne --landing--> Idle
//!   any --die_vertical / die_rotate--> Dead
//!   any --reset--> Idle
//! ```
//!
//! There is no cancel path out of Charging: a charge always ends in a release.

use std::fmt;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::kinematics::{LaunchSpeeds, launch_speeds, time_to_land};
use super::observer::{ObserverId, Observers};
use super::trajectory::{FlightStep, TIME_EPSILON_MS, Trajectory};
use crate::error::JumpError;
use crate::planar;
use crate::tuning::Tuning;

/// Role state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoleStatus {
    /// Standing, waiting for a press
    Idle,
    /// Press held, building up jump power
    Charging,
    /// In flight
    Airborne,
    /// Fell off; nothing but a reset brings it back
    Dead,
}

/// Presentation-only animations whose completion drives the game flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CosmeticKind {
    /// Somersault over the course of a jump
    JumpRotate,
    /// Wobble on the edge of the departure platform
    Teeter,
    /// Straight drop into a gap
    DieVertical,
    /// Tip over the edge of the target platform
    DieRotate,
}

/// Callback run when a cosmetic finishes
pub type Completion = Box<dyn FnOnce()>;

/// A running cosmetic
pub struct Cosmetic {
    pub kind: CosmeticKind,
    pub duration_ms: f32,
    pub remaining_ms: f32,
    /// Ground-plane axis the animation tilts along (unit or zero)
    pub axis: Vec2,
    on_complete: Option<Completion>,
}

impl Cosmetic {
    /// Fraction completed, 0..=1
    pub fn progress(&self) -> f32 {
        if self.duration_ms <= 0.0 {
            1.0
        } else {
            (1.0 - self.remaining_ms / self.duration_ms).clamp(0.0, 1.0)
        }
    }

    fn is_finished(&self) -> bool {
        self.remaining_ms <= TIME_EPSILON_MS
    }
}

impl fmt::Debug for Cosmetic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cosmetic")
            .field("kind", &self.kind)
            .field("duration_ms", &self.duration_ms)
            .field("remaining_ms", &self.remaining_ms)
            .field("axis", &self.axis)
            .field("has_callback", &self.on_complete.is_some())
            .finish()
    }
}

/// Result of a successful release
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Launch {
    pub charge_ms: f32,
    pub speeds: LaunchSpeeds,
    pub heading: Vec2,
    pub flight_ms: f32,
    pub origin: Vec3,
    /// Predicted touchdown point
    pub landing: Vec3,
}

/// Jump-complete notification payload
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landing {
    pub position: Vec3,
    pub flight_ms: f32,
}

/// Things that happened during a role tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RoleEvent {
    Landed(Landing),
    CosmeticFinished(CosmeticKind),
}

/// Serializable view of the role, for debugging
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleSnapshot {
    pub status: RoleStatus,
    pub position: Vec3,
    pub heading: Vec2,
    pub vertical_velocity: f32,
    pub horizontal_speed: f32,
    pub elapsed_ms: f32,
    pub total_ms: f32,
    pub charge_started_ms: Option<f64>,
    pub cosmetics: Vec<(CosmeticKind, f32)>,
}

/// The jump controller
#[derive(Debug)]
pub struct Role {
    tuning: Tuning,
    status: RoleStatus,
    position: Vec3,
    spawn: Vec3,
    /// Charge start, present only while Charging
    charge_started_ms: Option<f64>,
    /// Heading of the last release
    heading: Vec2,
    trajectory: Option<Trajectory>,
    last_flight_ms: f32,
    cosmetics: Vec<Cosmetic>,
    jump_complete: Observers<Landing>,
}

impl Role {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            tuning: tuning.clone(),
            status: RoleStatus::Idle,
            position: tuning.role_spawn,
            spawn: tuning.role_spawn,
            charge_started_ms: None,
            heading: Vec2::ZERO,
            trajectory: None,
            last_flight_ms: 0.0,
            cosmetics: Vec::new(),
            jump_complete: Observers::new(),
        }
    }

    pub fn status(&self) -> RoleStatus {
        self.status
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn spawn(&self) -> Vec3 {
        self.spawn
    }

    /// Footprint diameter used by hit classification
    pub fn size(&self) -> f32 {
        self.tuning.role_size
    }

    pub fn heading(&self) -> Vec2 {
        self.heading
    }

    pub fn trajectory(&self) -> Option<&Trajectory> {
        self.trajectory.as_ref()
    }

    pub fn cosmetics(&self) -> &[Cosmetic] {
        &self.cosmetics
    }

    /// How long the press has been held, if charging
    pub fn charge_elapsed(&self, now_ms: f64) -> Option<f32> {
        self.charge_started_ms
            .map(|start| (now_ms - start).max(0.0) as f32)
    }

    /// Move the role (presentation-driven placement). Not allowed mid-flight.
    pub fn set_position(&mut self, position: Vec3) -> Result<(), JumpError> {
        if self.status == RoleStatus::Airborne {
            return Err(self.refuse("set position"));
        }
        self.position = position;
        Ok(())
    }

    /// Register a jump-complete observer
    pub fn on_jump_complete(&mut self, callback: impl FnMut(&Landing) + 'static) -> ObserverId {
        self.jump_complete.subscribe(callback)
    }

    pub fn remove_jump_observer(&mut self, id: ObserverId) -> bool {
        self.jump_complete.unsubscribe(id)
    }

    fn refuse(&self, op: &'static str) -> JumpError {
        JumpError::InvalidStateTransition {
            op,
            status: self.status,
        }
    }

    /// Start charging
    pub fn press(&mut self, now_ms: f64) -> Result<(), JumpError> {
        if self.status != RoleStatus::Idle {
            return Err(self.refuse("press"));
        }
        self.status = RoleStatus::Charging;
        self.charge_started_ms = Some(now_ms);
        Ok(())
    }

    /// Release the charge and jump along `direction` (Y is ignored)
    ///
    /// On any error the role stays Charging so the release can be retried.
    pub fn release(&mut self, direction: Vec3, now_ms: f64) -> Result<Launch, JumpError> {
        if self.status != RoleStatus::Charging {
            return Err(self.refuse("release"));
        }
        let Some(started) = self.charge_started_ms else {
            return Err(self.refuse("release"));
        };

        let heading = planar(direction)
            .try_normalize()
            .ok_or(JumpError::InvalidDirection)?;

        let charge_ms = (now_ms - started).max(0.0) as f32;
        let speeds = launch_speeds(charge_ms, &self.tuning);
        let height = self.position.y - self.tuning.ground_y;
        let flight_ms = time_to_land(speeds.vertical, self.tuning.gravity, height)?;

        let trajectory = Trajectory::launch(
            self.position,
            heading,
            speeds,
            flight_ms,
            self.tuning.gravity,
            self.tuning.ground_y,
        );
        let launch = Launch {
            charge_ms,
            speeds,
            heading,
            flight_ms,
            origin: self.position,
            landing: trajectory.landing_point(),
        };

        self.charge_started_ms = None;
        self.heading = heading;
        self.trajectory = Some(trajectory);
        self.last_flight_ms = flight_ms;
        self.status = RoleStatus::Airborne;
        self.jump_rotate(None);

        log::debug!(
            "Launch: charge {:.0} ms, speeds ({:.4}, {:.4}), flight {:.0} ms",
            charge_ms,
            speeds.horizontal,
            speeds.vertical,
            flight_ms
        );
        Ok(launch)
    }

    fn start_cosmetic(
        &mut self,
        kind: CosmeticKind,
        duration_ms: f32,
        axis: Vec2,
        on_complete: Option<Completion>,
    ) {
        let duration_ms = duration_ms.max(0.0);
        self.cosmetics.push(Cosmetic {
            kind,
            duration_ms,
            remaining_ms: duration_ms,
            axis,
            on_complete,
        });
    }

    /// Somersault along the current heading, lasting one flight
    pub fn jump_rotate(&mut self, on_complete: Option<Completion>) {
        let duration = self
            .trajectory
            .as_ref()
            .map_or(self.last_flight_ms, |t| t.total_ms);
        self.start_cosmetic(CosmeticKind::JumpRotate, duration, self.heading, on_complete);
    }

    /// Wobble on an edge without falling
    pub fn teeter(&mut self, on_complete: Option<Completion>) {
        let duration = self.tuning.teeter_ms;
        self.start_cosmetic(CosmeticKind::Teeter, duration, self.heading, on_complete);
    }

    /// Drop straight down. The role is dead from now on.
    pub fn die_vertical(&mut self, on_complete: Option<Completion>) {
        self.kill();
        let duration = self.tuning.die_vertical_ms;
        self.start_cosmetic(CosmeticKind::DieVertical, duration, Vec2::ZERO, on_complete);
    }

    /// Tip over the edge, leaning away from `platform_center`
    pub fn die_rotate(&mut self, platform_center: Vec3, on_complete: Option<Completion>) {
        self.kill();
        let lean = planar(self.position - platform_center).normalize_or_zero();
        let duration = self.tuning.die_rotate_ms;
        self.start_cosmetic(CosmeticKind::DieRotate, duration, lean, on_complete);
    }

    fn kill(&mut self) {
        self.status = RoleStatus::Dead;
        self.charge_started_ms = None;
        self.trajectory = None;
    }

    /// Back to spawn, idle, all motion cleared
    ///
    /// Running cosmetics are dropped without invoking their callbacks.
    pub fn reset(&mut self) {
        self.status = RoleStatus::Idle;
        self.position = self.spawn;
        self.charge_started_ms = None;
        self.heading = Vec2::ZERO;
        self.trajectory = None;
        self.last_flight_ms = 0.0;
        self.cosmetics.clear();
    }

    /// Advance flight and cosmetics by `dt` ms
    pub fn tick(&mut self, dt: f32) -> Vec<RoleEvent> {
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        let mut events = Vec::new();

        if self.status == RoleStatus::Airborne {
            if let Some(trajectory) = self.trajectory.as_mut() {
                let step = trajectory.advance(dt, self.tuning.max_step_ms);
                self.position = trajectory.position;
                if step == FlightStep::Landed {
                    let landing = Landing {
                        position: self.position,
                        flight_ms: trajectory.total_ms,
                    };
                    self.trajectory = None;
                    self.status = RoleStatus::Idle;
                    self.jump_complete.notify(&landing);
                    events.push(RoleEvent::Landed(landing));
                }
            }
        }

        for cosmetic in &mut self.cosmetics {
            cosmetic.remaining_ms -= dt;
        }
        let (finished, running): (Vec<_>, Vec<_>) = std::mem::take(&mut self.cosmetics)
            .into_iter()
            .partition(Cosmetic::is_finished);
        self.cosmetics = running;

        for mut cosmetic in finished {
            if let Some(callback) = cosmetic.on_complete.take() {
                callback();
            }
            events.push(RoleEvent::CosmeticFinished(cosmetic.kind));
        }

        events
    }

    pub fn snapshot(&self) -> RoleSnapshot {
        let (vertical_velocity, horizontal_speed, elapsed_ms, total_ms) = self
            .trajectory
            .as_ref()
            .map_or((0.0, 0.0, 0.0, 0.0), |t| {
                (t.vertical_velocity, t.horizontal_speed, t.elapsed_ms, t.total_ms)
            });
        RoleSnapshot {
            status: self.status,
            position: self.position,
            heading: self.heading,
            vertical_velocity,
            horizontal_speed,
            elapsed_ms,
            total_ms,
            charge_started_ms: self.charge_started_ms,
            cosmetics: self
                .cosmetics
                .iter()
                .map(|c| (c.kind, c.remaining_ms))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DomainError;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn role() -> Role {
        Role::new(&Tuning::default())
    }

    fn fly(role: &mut Role) -> Vec<RoleEvent> {
        let mut events = Vec::new();
        for _ in 0..10_000 {
            events.extend(role.tick(16.0));
            if role.status() != RoleStatus::Airborne {
                break;
            }
        }
        events
    }

    #[test]
    fn test_press_only_from_idle() {
        let mut role = role();
        assert!(role.press(0.0).is_ok());
        assert_eq!(role.status(), RoleStatus::Charging);

        // Double press keeps the original start time
        let err = role.press(100.0).unwrap_err();
        assert!(err.is_ignorable());
        assert_eq!(role.charge_elapsed(300.0), Some(300.0));
    }

    #[test]
    fn test_release_requires_charge() {
        let mut role = role();
        let err = role.release(Vec3::X, 10.0).unwrap_err();
        assert!(matches!(
            err,
            JumpError::InvalidStateTransition {
                status: RoleStatus::Idle,
                ..
            }
        ));
        assert_eq!(role.status(), RoleStatus::Idle);
    }

    #[test]
    fn test_zero_direction_keeps_charging() {
        let mut role = role();
        role.press(0.0).unwrap();

        assert!(matches!(
            role.release(Vec3::ZERO, 400.0),
            Err(JumpError::InvalidDirection)
        ));
        // Purely vertical input has no heading either
        assert!(matches!(
            role.release(Vec3::Y, 400.0),
            Err(JumpError::InvalidDirection)
        ));
        assert_eq!(role.status(), RoleStatus::Charging);

        // Retry succeeds and uses the original press time
        let launch = role.release(Vec3::new(0.0, 0.0, -1.0), 500.0).unwrap();
        assert_eq!(launch.heading, Vec2::new(0.0, -1.0));
        assert_eq!(launch.charge_ms, 500.0);
    }

    #[test]
    fn test_unreachable_landing_keeps_charging() {
        let mut role = role();
        let spawn = role.spawn();
        // Ground is a full unit above the role: no charge clears it
        role.set_position(spawn - Vec3::Y).unwrap();
        role.press(0.0).unwrap();

        let err = role.release(Vec3::X, 500.0).unwrap_err();
        assert!(matches!(
            err,
            JumpError::Domain(DomainError::Unreachable { .. })
        ));
        assert!(!err.is_ignorable());
        assert_eq!(role.status(), RoleStatus::Charging);
        assert!(role.trajectory().is_none());
        assert!(role.cosmetics().is_empty());

        role.set_position(spawn).unwrap();
        let launch = role.release(Vec3::X, 500.0).unwrap();
        assert_eq!(launch.charge_ms, 500.0);
        assert_eq!(role.status(), RoleStatus::Airborne);
    }

    #[test]
    fn test_release_after_500ms() {
        let mut role = role();
        role.press(0.0).unwrap();
        let launch = role.release(Vec3::new(1.0, 0.0, 0.0), 500.0).unwrap();

        assert!((launch.speeds.horizontal - 0.005).abs() < 1e-9);
        assert!((launch.speeds.vertical - 0.01).abs() < 1e-9);
        assert!(launch.flight_ms.is_finite() && launch.flight_ms > 0.0);
        assert_eq!(role.status(), RoleStatus::Airborne);
        assert_eq!(role.cosmetics()[0].kind, CosmeticKind::JumpRotate);
    }

    #[test]
    fn test_release_ignores_vertical_component() {
        let mut role = role();
        role.press(0.0).unwrap();
        let launch = role.release(Vec3::new(3.0, 7.0, 4.0), 1000.0).unwrap();
        assert!((launch.heading - Vec2::new(0.6, 0.8)).length() < 1e-6);
    }

    #[test]
    fn test_landing_notifies_every_observer() {
        let mut role = role();
        let first = Rc::new(RefCell::new(Vec::new()));
        let second = Rc::new(Cell::new(0));

        let f = Rc::clone(&first);
        role.on_jump_complete(move |landing| f.borrow_mut().push(landing.position));
        let s = Rc::clone(&second);
        let id = role.on_jump_complete(move |_| s.set(s.get() + 1));

        role.press(0.0).unwrap();
        let launch = role.release(Vec3::X, 1000.0).unwrap();
        let events = fly(&mut role);

        assert_eq!(role.status(), RoleStatus::Idle);
        assert_eq!(role.position().y, Tuning::default().ground_y);
        assert!((role.position() - launch.landing).length() < 1e-3);
        assert!(events.iter().any(|e| matches!(e, RoleEvent::Landed(_))));
        assert!(events.contains(&RoleEvent::CosmeticFinished(CosmeticKind::JumpRotate)));
        assert_eq!(first.borrow().len(), 1);
        assert_eq!(second.get(), 1);

        // Unsubscribed observers miss the next jump, others still see it
        assert!(role.remove_jump_observer(id));
        role.press(2000.0).unwrap();
        role.release(Vec3::X, 2300.0).unwrap();
        fly(&mut role);
        assert_eq!(first.borrow().len(), 2);
        assert_eq!(second.get(), 1);
    }

    #[test]
    fn test_dead_rejects_input_until_reset() {
        let mut role = role();
        role.press(0.0).unwrap();
        role.die_vertical(None);

        assert_eq!(role.status(), RoleStatus::Dead);
        assert!(role.press(10.0).unwrap_err().is_ignorable());
        assert!(role.release(Vec3::X, 20.0).unwrap_err().is_ignorable());

        role.reset();
        assert_eq!(role.status(), RoleStatus::Idle);
        assert!(role.press(30.0).is_ok());
    }

    #[test]
    fn test_die_completion_callback_runs_once() {
        let mut role = role();
        let done = Rc::new(Cell::new(0));
        let d = Rc::clone(&done);
        role.die_rotate(Vec3::new(5.0, 0.0, 0.0), Some(Box::new(move || d.set(d.get() + 1))));

        let duration = Tuning::default().die_rotate_ms;
        let mut events = role.tick(duration / 2.0);
        assert_eq!(done.get(), 0);
        events.extend(role.tick(duration / 2.0));
        events.extend(role.tick(duration));

        assert_eq!(done.get(), 1);
        assert_eq!(
            events,
            vec![RoleEvent::CosmeticFinished(CosmeticKind::DieRotate)]
        );
        assert_eq!(role.status(), RoleStatus::Dead);
    }

    #[test]
    fn test_die_rotate_leans_away_from_platform() {
        let mut role = role();
        role.set_position(Vec3::new(6.3, 0.0, 0.0)).unwrap();
        role.die_rotate(Vec3::new(5.0, 0.0, 0.0), None);
        assert!((role.cosmetics()[0].axis - Vec2::X).length() < 1e-6);
    }

    #[test]
    fn test_reset_mid_fall_restores_spawn() {
        let mut role = role();
        let ran = Rc::new(Cell::new(false));

        role.press(0.0).unwrap();
        role.release(Vec3::X, 900.0).unwrap();
        role.tick(50.0);
        let r = Rc::clone(&ran);
        role.die_vertical(Some(Box::new(move || r.set(true))));
        role.tick(Tuning::default().die_vertical_ms / 3.0);

        role.reset();
        let snapshot = role.snapshot();
        assert_eq!(snapshot.status, RoleStatus::Idle);
        assert_eq!(snapshot.position, Tuning::default().role_spawn);
        assert_eq!(snapshot.charge_started_ms, None);
        assert_eq!(snapshot.elapsed_ms, 0.0);
        assert_eq!(snapshot.total_ms, 0.0);
        assert_eq!(snapshot.vertical_velocity, 0.0);
        assert_eq!(snapshot.horizontal_speed, 0.0);
        assert_eq!(snapshot.heading, Vec2::ZERO);
        assert!(snapshot.cosmetics.is_empty());

        // Preempted cosmetics never complete
        role.tick(10_000.0);
        assert!(!ran.get());
    }

    #[test]
    fn test_set_position_refused_mid_flight() {
        let mut role = role();
        role.press(0.0).unwrap();
        role.release(Vec3::X, 800.0).unwrap();
        assert!(role.set_position(Vec3::ZERO).is_err());
    }
}
