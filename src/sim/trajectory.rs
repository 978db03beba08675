//! Ballistic flight of a single body
//!
//! Explicit Euler on the vertical axis, constant speed on the ground plane.
//! A frame is split into sub-steps no longer than `max_step_ms`, and the last
//! sub-step is clamped to the remaining flight time, so the landing point does
//! not depend on the frame rate.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::kinematics::LaunchSpeeds;

/// Tolerance when comparing accumulated flight time against the predicted total
pub const TIME_EPSILON_MS: f32 = 1e-3;

/// Outcome of advancing a trajectory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlightStep {
    InFlight,
    /// Flight time reached; position has been snapped to the ground
    Landed,
}

/// An in-flight body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    /// Where the flight started
    pub origin: Vec3,
    pub position: Vec3,
    /// Unit heading in the ground plane, as (x, z)
    pub heading: Vec2,
    pub vertical_velocity: f32,
    pub horizontal_speed: f32,
    pub elapsed_ms: f32,
    pub total_ms: f32,
    pub gravity: f32,
    pub ground_y: f32,
    landed: bool,
}

impl Trajectory {
    pub fn launch(
        origin: Vec3,
        heading: Vec2,
        speeds: LaunchSpeeds,
        total_ms: f32,
        gravity: f32,
        ground_y: f32,
    ) -> Self {
        Self {
            origin,
            position: origin,
            heading,
            vertical_velocity: speeds.vertical,
            horizontal_speed: speeds.horizontal,
            elapsed_ms: 0.0,
            total_ms,
            gravity,
            ground_y,
            landed: false,
        }
    }

    pub fn is_landed(&self) -> bool {
        self.landed
    }

    pub fn remaining_ms(&self) -> f32 {
        (self.total_ms - self.elapsed_ms).max(0.0)
    }

    /// Where the body will touch down
    pub fn landing_point(&self) -> Vec3 {
        let travel = self.heading * (self.horizontal_speed * self.total_ms);
        Vec3::new(
            self.origin.x + travel.x,
            self.ground_y,
            self.origin.z + travel.y,
        )
    }

    /// Single integration step of `dt` ms
    fn step(&mut self, dt: f32) {
        let vertical_delta = self.vertical_velocity * dt;
        let horizontal_delta = self.horizontal_speed * dt;

        // Gravity keeps decelerating past the apex, producing the fall
        self.vertical_velocity -= self.gravity * dt;

        self.position.y += vertical_delta;
        self.position.x += horizontal_delta * self.heading.x;
        self.position.z += horizontal_delta * self.heading.y;

        self.elapsed_ms += dt;
    }

    fn land(&mut self) {
        self.position.y = self.ground_y;
        self.landed = true;
    }

    /// Advance the flight by a frame of `dt` ms
    pub fn advance(&mut self, dt: f32, max_step_ms: f32) -> FlightStep {
        if self.landed {
            return FlightStep::Landed;
        }

        let mut budget = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        let max_step = if max_step_ms.is_finite() && max_step_ms > 0.0 {
            max_step_ms
        } else {
            budget
        };

        loop {
            if self.elapsed_ms + TIME_EPSILON_MS >= self.total_ms {
                self.land();
                return FlightStep::Landed;
            }
            if budget <= 0.0 {
                return FlightStep::InFlight;
            }
            let step = budget.min(max_step).min(self.total_ms - self.elapsed_ms);
            self.step(step);
            budget -= step;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::kinematics::{launch_speeds, time_to_land};
    use crate::tuning::Tuning;
    use proptest::prelude::*;

    fn flight(charge_ms: f32) -> Trajectory {
        let tuning = Tuning::default();
        let speeds = launch_speeds(charge_ms, &tuning);
        let total = time_to_land(speeds.vertical, tuning.gravity, 0.0).unwrap();
        Trajectory::launch(
            tuning.role_spawn,
            Vec2::X,
            speeds,
            total,
            tuning.gravity,
            tuning.ground_y,
        )
    }

    #[test]
    fn test_rises_then_falls() {
        let mut t = flight(800.0);
        let start_y = t.position.y;
        t.advance(16.0, 16.0);
        assert!(t.position.y > start_y);
        assert!(t.vertical_velocity < 0.016);

        let mut peak = t.position.y;
        while t.advance(16.0, 16.0) == FlightStep::InFlight {
            peak = peak.max(t.position.y);
        }
        assert!(peak > start_y);
        assert_eq!(t.position.y, t.ground_y);
    }

    #[test]
    fn test_landing_tick_performs_landing() {
        let mut t = flight(500.0); // 200 ms flight
        assert_eq!(t.advance(150.0, 1000.0), FlightStep::InFlight);
        assert_eq!(t.advance(100.0, 1000.0), FlightStep::Landed);
        assert!(t.is_landed());
        assert_eq!(t.position.y, t.ground_y);
    }

    #[test]
    fn test_one_tick_and_many_ticks_land_together() {
        let mut once = flight(1200.0);
        let mut many = once.clone();
        let total = once.total_ms;

        assert_eq!(once.advance(total, 16.0), FlightStep::Landed);

        let slices = 37;
        let mut step = FlightStep::InFlight;
        for _ in 0..slices {
            step = many.advance(total / slices as f32, 16.0);
        }
        assert_eq!(step, FlightStep::Landed);

        assert_eq!(once.position.y, once.ground_y);
        assert_eq!(many.position.y, many.ground_y);
        assert!((once.position - many.position).length() < 1e-3);
        assert!((once.position - once.landing_point()).length() < 1e-3);
    }

    #[test]
    fn test_degenerate_dt_is_ignored() {
        let mut t = flight(500.0);
        let before = t.clone();
        assert_eq!(t.advance(-5.0, 16.0), FlightStep::InFlight);
        assert_eq!(t.advance(f32::NAN, 16.0), FlightStep::InFlight);
        assert_eq!(t, before);
    }

    #[test]
    fn test_zero_charge_lands_immediately() {
        let mut t = flight(0.0);
        assert_eq!(t.advance(0.0, 16.0), FlightStep::Landed);
        assert_eq!(t.position, t.origin);
    }

    proptest! {
        #[test]
        fn landing_point_is_frame_rate_independent(
            charge in 50.0f32..2500.0,
            frame in 1.0f32..120.0,
        ) {
            let mut t = flight(charge);
            let mut guard = 0;
            while t.advance(frame, 1000.0 / 60.0) == FlightStep::InFlight {
                guard += 1;
                prop_assert!(guard < 100_000);
            }
            prop_assert_eq!(t.position.y, t.ground_y);
            prop_assert!((t.position - t.landing_point()).length() < 5e-3);
        }
    }
}
