//! # LABYRINTH
//!
//! Host side of level generation: how a game drives the generator.
//!
//! ## Modules
//!
//! - `driver`: Steps-per-second generation inside a frame loop
//! - `benchmark`: Seed timing sweep
//! - `telemetry`: Logging bootstrap for the binaries

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod benchmark;
pub mod driver;
pub mod error;
pub mod telemetry;

// Re-export the core
pub use labyrinth_procedural as procedural;
pub use labyrinth_shared as shared;

pub use benchmark::{run_seed_benchmark, BenchmarkReport, SeedTiming};
pub use driver::{is_outside_level, FrameReport, StepDriver, SIMULATED_FRAME_DELTA};
pub use error::{HostError, HostResult};
pub use telemetry::init_logging;
