//! Platforms and the next-platform policy
//!
//! Each new platform is placed along +X or -Z from the current one, at an
//! integer-stepped distance above a minimum gap. The gap range is the main
//! difficulty knob.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::error::JumpError;
use crate::tuning::Tuning;

/// A landing surface with a square footprint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    id: u32,
    position: Vec3,
    size: f32,
}

impl Platform {
    pub fn new(id: u32, position: Vec3, size: f32) -> Result<Self, JumpError> {
        if !(size.is_finite() && size > 0.0) {
            return Err(JumpError::InvalidPlatformSize(size));
        }
        Ok(Self { id, position, size })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Footprint side length
    pub fn size(&self) -> f32 {
        self.size
    }

    #[inline]
    pub fn half_size(&self) -> f32 {
        self.size / 2.0
    }
}

/// Direction a new platform extends in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    PosX,
    NegZ,
}

impl Axis {
    pub fn unit(self) -> Vec3 {
        match self {
            Axis::PosX => Vec3::X,
            Axis::NegZ => Vec3::NEG_Z,
        }
    }
}

/// Seeded platform factory
#[derive(Debug, Clone)]
pub struct PlatformGenerator {
    rng: Pcg32,
    next_id: u32,
    size: f32,
    distance_min: f32,
    distance_steps: u32,
}

impl PlatformGenerator {
    pub fn new(tuning: &Tuning, seed: u64) -> Result<Self, JumpError> {
        if !(tuning.table_size.is_finite() && tuning.table_size > 0.0) {
            return Err(JumpError::InvalidPlatformSize(tuning.table_size));
        }
        Ok(Self {
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
            size: tuning.table_size,
            distance_min: tuning.table_distance_min,
            distance_steps: tuning.table_distance_steps.max(1),
        })
    }

    /// Reseed and restart ids (new session)
    pub fn reseed(&mut self, seed: u64) {
        self.rng = Pcg32::seed_from_u64(seed);
        self.next_id = 1;
    }

    fn allocate_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Platform at a fixed position
    pub fn create_at(&mut self, position: Vec3) -> Platform {
        Platform {
            id: self.allocate_id(),
            position,
            size: self.size,
        }
    }

    /// Shortest and longest gap `create_next` can produce, both inclusive
    pub fn distance_range(&self) -> (f32, f32) {
        (
            self.distance_min,
            self.distance_min + self.distance_steps.saturating_sub(1) as f32,
        )
    }

    /// Next platform after `current`
    pub fn create_next(&mut self, current: &Platform) -> Platform {
        let axis = if self.rng.random_bool(0.5) {
            Axis::PosX
        } else {
            Axis::NegZ
        };
        let distance = self.distance_min + self.rng.random_range(0..self.distance_steps) as f32;
        let position = current.position + axis.unit() * distance;

        log::debug!(
            "Next platform {:?} at distance {:.1} -> {}",
            axis,
            distance,
            position
        );
        self.create_at(position)
    }
}
