//! # LABYRINTH Procedural
//!
//! Assembles 3D levels from a fixed library of prefabricated parts by
//! matching connector sockets.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: Same seed always produces the same level
//! 2. **Overlap-free**: Every placement is gated by a box-overlap query
//! 3. **Steppable**: One connector or one phase transition per step
//! 4. **Engine-agnostic**: Geometry lives behind the [`Scene`] trait
//!
//! ## Core Components
//!
//! - `PartLibrary`: validated part prototypes with per-connector bounds
//! - `Generator`: phased growth state machine
//! - `Scene`: instantiate / destroy / overlap seam, `MemoryScene` headless impl
//! - `Level`: TOML level files
//!
//! ## Example
//!
//! ```rust,ignore
//! use labyrinth_procedural::{Level, MemoryScene};
//!
//! let level = Level::from_file("assets/levels/catacombs.toml")?;
//! let mut generator = level.into_generator(MemoryScene::new());
//!
//! generator.generate(Some(42), true)?;
//! println!("{} parts", generator.instances().len());
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod connector;
pub mod error;
pub mod events;
pub mod generator;
pub mod library;
pub mod phase;
pub mod placement;
pub mod prototype;
pub mod scene;
pub mod stream;

pub use config::{Level, LevelFile};
pub use connector::{Connector, ConnectorId, ConnectorRef};
pub use error::{GenerationError, GenerationResult};
pub use events::{EventReceiver, GenerationEvent, GenerationSummary};
pub use generator::{Generator, GeneratorConfig, Link, PartInstance, PhaseProgress};
pub use library::{PartLibrary, PrototypeId};
pub use phase::{PhaseConfig, PhaseStatus};
pub use placement::{collides_at, placement_box, placement_pose, spin_about_outbound};
pub use prototype::{Anchor, PartDefinition, PartPrototype, Surface};
pub use scene::{BodyHandle, MemoryScene, Scene};
pub use stream::RandomStream;
