//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only advances through `tick`
//! - Seeded RNG only
//! - No rendering or platform dependencies; presentation goes through a `Stage`

pub mod autopilot;
pub mod hit;
pub mod kinematics;
pub mod observer;
pub mod platform;
pub mod role;
pub mod session;
pub mod tick;
pub mod trajectory;

pub use hit::{HitResult, Resolution, classify, resolve};
pub use kinematics::{LaunchSpeeds, launch_speeds, time_to_land};
pub use observer::{ObserverId, Observers};
pub use platform::{Axis, Platform, PlatformGenerator};
pub use role::{Cosmetic, CosmeticKind, Landing, Launch, Role, RoleEvent, RoleSnapshot, RoleStatus};
pub use session::{GameEvent, Session, SessionSnapshot};
pub use tick::{TickInput, tick};
pub use trajectory::{FlightStep, Trajectory};
