//! # Level Files
//!
//! Levels are static game data: a part library, the phase list and the
//! generation settings, loaded once from TOML at startup.
//!
//! ```toml
//! [generation]
//! seed = 42
//! start_parts = ["hub"]
//!
//! [[parts]]
//! name = "corridor"
//! boxes = [{ center = [0, 1, 2], size = [2, 2, 4] }]
//! connectors = [
//!   { tag = "door", rotation = [0, 180, 0], allow_outbound = false },
//!   { tag = "door", position = [0, 0, 4], allow_inbound = false },
//! ]
//!
//! [[phases]]
//! name = "main"
//! budget = 20
//! pool = ["corridor"]
//! ```
//!
//! Rotations are Euler angles in degrees, applied yaw, pitch, roll.

use std::path::Path;

use glam::Vec3;
use labyrinth_shared::{Pose, DEFAULT_COINCIDENCE_EPSILON_SQ};
use serde::Deserialize;

use crate::connector::Connector;
use crate::error::{GenerationError, GenerationResult};
use crate::generator::{Generator, GeneratorConfig};
use crate::library::{PartLibrary, PrototypeId};
use crate::phase::PhaseConfig;
use crate::prototype::{Anchor, PartDefinition, Surface};
use crate::scene::Scene;

fn yes() -> bool {
    true
}

fn default_epsilon_sq() -> f32 {
    DEFAULT_COINCIDENCE_EPSILON_SQ
}

/// Position plus Euler rotation in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PoseEntry {
    /// Position.
    #[serde(default)]
    pub position: Vec3,
    /// Yaw/pitch/roll as `[x, y, z]` degrees.
    #[serde(default)]
    pub rotation: Vec3,
}

impl PoseEntry {
    fn to_pose(self, what: &str) -> GenerationResult<Pose> {
        if !self.position.is_finite() || !self.rotation.is_finite() {
            return Err(GenerationError::InvalidConfig(format!("{what}: non-finite pose")));
        }
        Ok(Pose::from_euler_degrees(self.position, self.rotation))
    }
}

/// `[generation]` table.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationEntry {
    /// Fixed seed.
    #[serde(default)]
    pub seed: u64,
    /// Draw an OS seed per run.
    #[serde(default)]
    pub randomize_seed: bool,
    /// Connector coincidence threshold (squared distance).
    #[serde(default = "default_epsilon_sq")]
    pub coincidence_epsilon_sq: f32,
    /// Start part names. Empty means every `can_be_start` part.
    #[serde(default)]
    pub start_parts: Vec<String>,
    /// Start part pose.
    #[serde(default)]
    pub origin: PoseEntry,
}

impl Default for GenerationEntry {
    fn default() -> Self {
        Self {
            seed: 0,
            randomize_seed: false,
            coincidence_epsilon_sq: DEFAULT_COINCIDENCE_EPSILON_SQ,
            start_parts: Vec::new(),
            origin: PoseEntry::default(),
        }
    }
}

/// Solid box of a part.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoxEntry {
    /// Center in part space.
    pub center: Vec3,
    /// Full size.
    pub size: Vec3,
}

/// Connector of a part.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectorEntry {
    /// Matching tag.
    pub tag: String,
    /// Position in part space.
    #[serde(default)]
    pub position: Vec3,
    /// Euler degrees.
    #[serde(default)]
    pub rotation: Vec3,
    /// May grow new parts.
    #[serde(default = "yes")]
    pub allow_outbound: bool,
    /// May be attached through.
    #[serde(default = "yes")]
    pub allow_inbound: bool,
    /// Random spin about the joint.
    #[serde(default)]
    pub random_rotation: bool,
}

/// Anchor of a part.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnchorEntry {
    /// Lookup tag.
    pub tag: String,
    /// Position in part space.
    #[serde(default)]
    pub position: Vec3,
    /// Euler degrees.
    #[serde(default)]
    pub rotation: Vec3,
}

/// `[[parts]]` entry.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartEntry {
    /// Unique name.
    pub name: String,
    /// May seed a level.
    #[serde(default)]
    pub can_be_start: bool,
    /// Never rejected by overlap tests.
    #[serde(default)]
    pub skip_bounds_check: bool,
    /// Extra placement clearance.
    #[serde(default)]
    pub bounds_margin: f32,
    /// Solid geometry.
    #[serde(default)]
    pub boxes: Vec<BoxEntry>,
    /// Sockets.
    #[serde(default)]
    pub connectors: Vec<ConnectorEntry>,
    /// Decoration anchors.
    #[serde(default)]
    pub anchors: Vec<AnchorEntry>,
}

impl PartEntry {
    fn to_definition(&self) -> GenerationResult<PartDefinition> {
        let mut definition = PartDefinition::new(self.name.clone()).with_bounds_margin(self.bounds_margin);
        definition.can_be_start = self.can_be_start;
        definition.skip_bounds_check = self.skip_bounds_check;

        for b in &self.boxes {
            if b.size.min_element() < 0.0 {
                return Err(GenerationError::invalid_part(&self.name, "box size is negative"));
            }
            definition = definition.with_surface(Surface::cuboid(b.center, b.size));
        }
        for c in &self.connectors {
            let pose = PoseEntry {
                position: c.position,
                rotation: c.rotation,
            }
            .to_pose(&self.name)?;
            let mut connector = Connector::new(c.tag.clone(), pose);
            connector.allow_outbound = c.allow_outbound;
            connector.allow_inbound = c.allow_inbound;
            connector.random_rotation = c.random_rotation;
            definition = definition.with_connector(connector);
        }
        for a in &self.anchors {
            let pose = PoseEntry {
                position: a.position,
                rotation: a.rotation,
            }
            .to_pose(&self.name)?;
            definition = definition.with_anchor(Anchor::new(a.tag.clone(), pose));
        }
        Ok(definition)
    }
}

/// `[[phases]]` entry.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PhaseEntry {
    /// Display name.
    pub name: String,
    /// Maximum placements.
    pub budget: u32,
    /// Part names to draw from.
    #[serde(default)]
    pub pool: Vec<String>,
}

/// A level file as written on disk.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LevelFile {
    /// Generation settings.
    #[serde(default)]
    pub generation: GenerationEntry,
    /// Part definitions.
    #[serde(default)]
    pub parts: Vec<PartEntry>,
    /// Phases in run order.
    #[serde(default)]
    pub phases: Vec<PhaseEntry>,
}

impl LevelFile {
    /// Parses a level document.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::Parse`] on malformed TOML.
    pub fn from_toml_str(source: &str) -> GenerationResult<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Reads and parses a level file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> GenerationResult<Self> {
        let source = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&source)
    }

    /// Validates the file and builds the library and generator config.
    ///
    /// # Errors
    ///
    /// Returns error on invalid parts, duplicate or unknown names, or
    /// non-finite values.
    pub fn build(&self) -> GenerationResult<Level> {
        let mut library = PartLibrary::new();
        for part in &self.parts {
            library.register(part.to_definition()?)?;
        }

        let resolve = |names: &[String]| -> GenerationResult<Vec<PrototypeId>> {
            names
                .iter()
                .map(|name| {
                    library
                        .id_of(name)
                        .ok_or_else(|| GenerationError::UnknownPartName(name.clone()))
                })
                .collect()
        };

        let generation = &self.generation;
        let start_parts = resolve(&generation.start_parts)?;
        let phases = self
            .phases
            .iter()
            .map(|p| Ok(PhaseConfig::new(p.name.clone(), p.budget, resolve(&p.pool)?)))
            .collect::<GenerationResult<Vec<_>>>()?;

        if !generation.coincidence_epsilon_sq.is_finite() || generation.coincidence_epsilon_sq < 0.0 {
            return Err(GenerationError::InvalidConfig(
                "coincidence_epsilon_sq must be finite and non-negative".into(),
            ));
        }

        let config = GeneratorConfig {
            start_parts,
            phases,
            seed: generation.seed,
            randomize_seed: generation.randomize_seed,
            coincidence_epsilon_sq: generation.coincidence_epsilon_sq,
            origin: generation.origin.to_pose("origin")?,
        };

        tracing::info!(
            "Loaded level: {} parts, {} phases",
            library.len(),
            config.phases.len()
        );
        Ok(Level { library, config })
    }
}

/// A ready-to-run level.
#[derive(Clone, Debug)]
pub struct Level {
    /// Validated parts.
    pub library: PartLibrary,
    /// Generation settings.
    pub config: GeneratorConfig,
}

impl Level {
    /// Parses and builds a level document.
    ///
    /// # Errors
    ///
    /// See [`LevelFile::from_toml_str`] and [`LevelFile::build`].
    pub fn from_toml_str(source: &str) -> GenerationResult<Self> {
        LevelFile::from_toml_str(source)?.build()
    }

    /// Reads, parses and builds a level file.
    ///
    /// # Errors
    ///
    /// See [`LevelFile::from_file`] and [`LevelFile::build`].
    pub fn from_file(path: impl AsRef<Path>) -> GenerationResult<Self> {
        LevelFile::from_file(path)?.build()
    }

    /// Hands the level to a generator building into `scene`.
    #[must_use]
    pub fn into_generator<S: Scene>(self, scene: S) -> Generator<S> {
        Generator::new(self.library, self.config, scene)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEVEL: &str = r#"
[generation]
seed = 42
start_parts = ["room"]

[[parts]]
name = "corridor"
boxes = [{ center = [0, 1, 2], size = [2, 2, 4] }]
connectors = [
  { tag = "door", rotation = [0, 180, 0], allow_outbound = false },
  { tag = "door", position = [0, 0, 4], allow_inbound = false },
]
anchors = [{ tag = "shrine", position = [0, 0, 2] }]

[[parts]]
name = "room"
can_be_start = true
boxes = [{ center = [0, 2, 0], size = [8, 4, 8] }]
connectors = [
  { tag = "door", position = [0, 0, 4] },
  { tag = "door", position = [0, 0, -4], rotation = [0, 180, 0] },
]

[[phases]]
name = "main"
budget = 20
pool = ["corridor", "room"]
"#;

    #[test]
    fn test_parse_and_build() {
        let level = Level::from_toml_str(LEVEL).unwrap();
        assert_eq!(level.library.len(), 2);

        let room = level.library.id_of("room").unwrap();
        assert_eq!(level.config.start_parts, vec![room]);
        assert_eq!(level.config.seed, 42);
        assert!(!level.config.randomize_seed);
        assert_eq!(level.config.coincidence_epsilon_sq, DEFAULT_COINCIDENCE_EPSILON_SQ);
        assert_eq!(level.config.phases.len(), 1);
        assert_eq!(level.config.phases[0].part_pool.len(), 2);

        let corridor = level.library.prototype(level.library.id_of("corridor").unwrap());
        assert!(!corridor.connectors()[0].allow_outbound);
        assert!(corridor.connectors()[0].allow_inbound);
        assert!(corridor.connectors()[1].allow_outbound);
        assert!(!corridor.connectors()[1].allow_inbound);
        assert_eq!(corridor.anchors().len(), 1);
    }

    #[test]
    fn test_unknown_part_name() {
        let source = LEVEL.replace(r#"pool = ["corridor", "room"]"#, r#"pool = ["corridor", "vault"]"#);
        assert!(matches!(
            Level::from_toml_str(&source),
            Err(GenerationError::UnknownPartName(name)) if name == "vault"
        ));
    }

    #[test]
    fn test_duplicate_part_name() {
        let source = LEVEL.replace(r#"name = "room""#, r#"name = "corridor""#);
        assert!(matches!(
            Level::from_toml_str(&source),
            Err(GenerationError::DuplicatePart(_))
        ));
    }

    #[test]
    fn test_invalid_values() {
        let empty_tag = LEVEL.replace(r#"{ tag = "door", position = [0, 0, 4] }"#, r#"{ tag = "", position = [0, 0, 4] }"#);
        assert!(matches!(
            Level::from_toml_str(&empty_tag),
            Err(GenerationError::InvalidPart { .. })
        ));

        let negative_margin = LEVEL.replace("can_be_start = true", "can_be_start = true\nbounds_margin = -1.0");
        assert!(matches!(
            Level::from_toml_str(&negative_margin),
            Err(GenerationError::InvalidPart { .. })
        ));

        let infinite = LEVEL.replace("seed = 42", "seed = 42\ncoincidence_epsilon_sq = inf");
        assert!(matches!(
            Level::from_toml_str(&infinite),
            Err(GenerationError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(
            Level::from_toml_str("[[parts]]\nname = "),
            Err(GenerationError::Parse(_))
        ));
        assert!(matches!(
            Level::from_toml_str("[generation]\nsed = 4"),
            Err(GenerationError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            Level::from_file("/nonexistent/level.toml"),
            Err(GenerationError::Io(_))
        ));
    }

    #[test]
    fn test_builds_runnable_generator() {
        let mut generator = Level::from_toml_str(LEVEL)
            .unwrap()
            .into_generator(crate::scene::MemoryScene::new());
        assert_eq!(generator.generate(None, true).unwrap(), 42);
        assert!(generator.instances().len() > 1);
        assert!(generator.scene().overlapping_pairs().is_empty());
    }
}
