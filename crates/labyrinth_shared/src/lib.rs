//! # LABYRINTH Shared
//!
//! Math vocabulary used by both the generator core and the host.
//!
//! ## Conventions
//!
//! - Right-handed, Y up
//! - A pose's forward axis is local `+Z`
//! - Rotations are unit quaternions; angles at API edges are degrees

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
pub mod math;

pub use constants::{BOUNDS_SHRINK, DEFAULT_COINCIDENCE_EPSILON_SQ, FACING_FLIP, MAX_FRAME_DELTA};
pub use math::{Aabb, OrientedBox, Pose};

pub use glam::{EulerRot, Quat, Vec3};
