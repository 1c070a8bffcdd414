//! # Generation Constants
//!
//! Tuning values shared by the generator and the host.
//!
//! **NOTE:** Changing `BOUNDS_SHRINK` or `FACING_FLIP` changes every level
//! produced from a given seed.

use glam::Quat;

// =============================================================================
// BOUNDS
// =============================================================================

/// Amount every precomputed bounding box is shrunk on each side.
///
/// Lets two parts sit flush against each other without the overlap
/// query reporting a hit on the shared face.
pub const BOUNDS_SHRINK: f32 = 0.01;

/// Squared distance under which two open connectors count as coincident.
pub const DEFAULT_COINCIDENCE_EPSILON_SQ: f32 = 1e-2;

// =============================================================================
// PLACEMENT
// =============================================================================

/// Half turn about local up.
///
/// An inbound connector faces *into* its part while the outbound connector
/// it attaches to faces *out of* its own part, so one of them is flipped.
pub const FACING_FLIP: Quat = Quat::from_xyzw(0.0, 1.0, 0.0, 0.0);

// =============================================================================
// HOST TIMING
// =============================================================================

/// Largest frame delta (seconds) a step driver will account for.
pub const MAX_FRAME_DELTA: f32 = 0.1;
