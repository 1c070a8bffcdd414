//! # Generator
//!
//! The phased growth state machine.
//!
//! ## Lifecycle
//!
//! ```text
//!        generate()                    step_generation() == false
//! Idle ─────────────> Generating ───────────────────────────────> Idle
//!   ^                     │
//!   └──── clear() ────────┘
//! ```
//!
//! Each call to [`Generator::step_generation`] does exactly one of:
//!
//! 1. Resolve one open connector of the current phase (place a part or
//!    defer the connector).
//! 2. Move to the next phase, carrying every unresolved connector along.
//! 3. Finish: go idle and emit [`GenerationEvent::Completed`].
//!
//! A host calls it at whatever rate it likes; synchronous generation is
//! the same loop run to completion.

use labyrinth_shared::{Aabb, Pose, DEFAULT_COINCIDENCE_EPSILON_SQ};

use crate::connector::{Connector, ConnectorRef};
use crate::error::{GenerationError, GenerationResult};
use crate::events::{EventBus, EventReceiver, EventSender, GenerationEvent, GenerationSummary};
use crate::library::{PartLibrary, PrototypeId};
use crate::phase::{PhaseConfig, PhaseStatus};
use crate::placement::{collides_at, placement_pose, spin_about_outbound};
use crate::scene::Scene;
use crate::stream::{entropy_seed, RandomStream};

/// In-memory generator configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratorConfig {
    /// Start part candidates. Empty means every `can_be_start` prototype.
    pub start_parts: Vec<PrototypeId>,
    /// Phases in the order they run.
    pub phases: Vec<PhaseConfig>,
    /// Seed used when no override is given and `randomize_seed` is off.
    pub seed: u64,
    /// Draw a fresh OS seed when no override is given.
    pub randomize_seed: bool,
    /// Squared distance under which two compatible connectors count as joined.
    pub coincidence_epsilon_sq: f32,
    /// World pose of the start part.
    pub origin: Pose,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            start_parts: Vec::new(),
            phases: Vec::new(),
            seed: 0,
            randomize_seed: false,
            coincidence_epsilon_sq: DEFAULT_COINCIDENCE_EPSILON_SQ,
            origin: Pose::IDENTITY,
        }
    }
}

impl GeneratorConfig {
    /// Adds a start part candidate.
    #[must_use]
    pub fn with_start_part(mut self, id: PrototypeId) -> Self {
        self.start_parts.push(id);
        self
    }

    /// Appends a phase.
    #[must_use]
    pub fn with_phase(mut self, phase: PhaseConfig) -> Self {
        self.phases.push(phase);
        self
    }

    /// Sets the fixed seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Draws a fresh seed per run instead of the fixed one.
    #[must_use]
    pub fn randomized(mut self) -> Self {
        self.randomize_seed = true;
        self
    }

    /// Sets the connector coincidence threshold (squared distance).
    #[must_use]
    pub fn with_coincidence_epsilon_sq(mut self, epsilon_sq: f32) -> Self {
        self.coincidence_epsilon_sq = epsilon_sq;
        self
    }

    /// Sets the start part pose.
    #[must_use]
    pub fn with_origin(mut self, origin: Pose) -> Self {
        self.origin = origin;
        self
    }
}

/// A placed part.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PartInstance<H> {
    /// Prototype it was instantiated from.
    pub prototype: PrototypeId,
    /// World pose.
    pub pose: Pose,
    /// Scene handle.
    pub handle: H,
    /// Phase that placed it. `None` for the start part.
    pub phase: Option<usize>,
}

/// A joined pair of connectors.
///
/// For a placement, `outbound` is the socket grown from and `inbound` the
/// socket the new part attached through. For an incidental link, `outbound`
/// is the previously unresolved socket and `inbound` the new part's socket
/// that landed on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Link {
    /// Existing side.
    pub outbound: ConnectorRef,
    /// New part's side.
    pub inbound: ConnectorRef,
    /// Closed by coincidence rather than by a placement.
    pub incidental: bool,
}

/// Read-only view of the current phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseProgress<'a> {
    /// Position in the phase list.
    pub index: usize,
    /// Phase name.
    pub name: &'a str,
    /// Placements left.
    pub remaining_budget: u32,
    /// Placements made.
    pub placed: u32,
    /// Connectors waiting in this phase.
    pub open: usize,
    /// Connectors deferred to the next phase.
    pub failed: usize,
}

/// The socket a placement grows from.
struct Outbound<'l> {
    at: ConnectorRef,
    connector: &'l Connector,
    world: Pose,
}

struct Session<H> {
    seed: u64,
    stream: RandomStream,
    phase: PhaseStatus,
    instances: Vec<PartInstance<H>>,
    links: Vec<Link>,
    generating: bool,
    steps: u64,
}

impl<H: Copy> Session<H> {
    fn unresolved(&self) -> usize {
        self.phase.open.len() + self.phase.failed.len()
    }

    fn summary(&self) -> GenerationSummary {
        GenerationSummary {
            seed: self.seed,
            instances: self.instances.len(),
            links: self.links.len(),
            incidental_links: self.links.iter().filter(|l| l.incidental).count(),
            open_connectors: self.unresolved(),
            steps: self.steps,
        }
    }

    /// World pose and definition of a live connector.
    fn connector_world<'l>(&self, library: &'l PartLibrary, at: ConnectorRef) -> (Pose, &'l Connector) {
        let instance = &self.instances[at.instance];
        let connector = &library.prototype(instance.prototype).connectors()[at.connector];
        (instance.pose.mul_pose(&connector.local_pose), connector)
    }

    /// Works one open connector. Returns true if a part was placed.
    fn resolve_next<S: Scene<Handle = H>>(
        &mut self,
        library: &PartLibrary,
        scene: &mut S,
        epsilon_sq: f32,
    ) -> bool {
        let Some(pick) = self.stream.pick_index(self.phase.open.len()) else {
            return false;
        };
        let target = self.phase.open.remove(pick);
        let (world, connector) = self.connector_world(library, target);
        let outbound = Outbound {
            at: target,
            connector,
            world,
        };

        self.stream.shuffle(&mut self.phase.pool);

        for slot in 0..self.phase.pool.len() {
            let candidate_id = self.phase.pool[slot];
            let candidate = library.prototype(candidate_id);
            if !candidate.has_inbound_tag(&outbound.connector.tag) {
                continue;
            }
            if self.try_place(library, scene, candidate_id, &outbound, epsilon_sq) {
                self.phase.remaining_budget -= 1;
                self.phase.placed += 1;
                return true;
            }
        }

        tracing::debug!(
            "Deferred connector {}:{} ('{}'), no part fits",
            target.instance,
            target.connector,
            outbound.connector.tag
        );
        self.phase.failed.push(target);
        false
    }

    fn try_place<S: Scene<Handle = H>>(
        &mut self,
        library: &PartLibrary,
        scene: &mut S,
        candidate_id: PrototypeId,
        outbound: &Outbound<'_>,
        epsilon_sq: f32,
    ) -> bool {
        let candidate = library.prototype(candidate_id);
        let mut inbound = candidate.inbound_connectors_for(outbound.connector);
        assert!(
            !inbound.is_empty(),
            "part '{}' declares inbound tag '{}' but no connector accepts it",
            candidate.name(),
            outbound.connector.tag
        );
        self.stream.shuffle(&mut inbound);

        let accepted = inbound.into_iter().find(|&id| {
            let blocked = collides_at(&*scene, candidate, id, &outbound.world);
            if blocked {
                tracing::trace!("'{}' via connector {} collides", candidate.name(), id);
            }
            !blocked
        });
        let Some(inbound_id) = accepted else {
            return false;
        };
        let inbound_connector = &candidate.connectors()[inbound_id];

        let mut pose = placement_pose(&outbound.world, &inbound_connector.local_pose);
        if outbound.connector.random_rotation || inbound_connector.random_rotation {
            let degrees = self.stream.angle_degrees();
            pose = spin_about_outbound(&pose, &outbound.world, degrees);
        }

        let handle = scene.instantiate(candidate, &pose);
        let index = self.instances.len();
        self.instances.push(PartInstance {
            prototype: candidate_id,
            pose,
            handle,
            phase: Some(self.phase.index),
        });
        self.links.push(Link {
            outbound: outbound.at,
            inbound: ConnectorRef::new(index, inbound_id),
            incidental: false,
        });

        tracing::debug!(
            "Placed '{}' as instance {} at {:?} (phase {})",
            candidate.name(),
            index,
            pose.position,
            self.phase.index
        );

        let fresh: Vec<ConnectorRef> = candidate
            .outbound_connectors()
            .filter(|&id| id != inbound_id)
            .map(|id| ConnectorRef::new(index, id))
            .collect();
        for new_ref in fresh {
            if !self.close_incidental(library, new_ref, epsilon_sq) {
                self.phase.open.push(new_ref);
            }
        }
        true
    }

    /// Joins `new_ref` with an unresolved connector sitting on top of it.
    fn close_incidental(&mut self, library: &PartLibrary, new_ref: ConnectorRef, epsilon_sq: f32) -> bool {
        let (new_world, new_connector) = self.connector_world(library, new_ref);

        let matches = |queue: &[ConnectorRef]| {
            queue.iter().position(|&other| {
                if other.instance == new_ref.instance {
                    return false;
                }
                let (other_world, other_connector) = self.connector_world(library, other);
                new_connector.can_connect_to(other_connector)
                    && new_world.position.distance_squared(other_world.position) < epsilon_sq
            })
        };

        let in_open = matches(self.phase.open.as_slice());
        let in_failed = if in_open.is_none() {
            matches(self.phase.failed.as_slice())
        } else {
            None
        };
        let existing = match (in_open, in_failed) {
            (Some(i), _) => self.phase.open.remove(i),
            (None, Some(i)) => self.phase.failed.remove(i),
            (None, None) => return false,
        };

        tracing::debug!(
            "Closed incidental link {}:{} <-> {}:{}",
            existing.instance,
            existing.connector,
            new_ref.instance,
            new_ref.connector
        );
        self.links.push(Link {
            outbound: existing,
            inbound: new_ref,
            incidental: true,
        });
        true
    }
}

/// Grows levels from a [`PartLibrary`] into a [`Scene`].
pub struct Generator<S: Scene> {
    library: PartLibrary,
    config: GeneratorConfig,
    scene: S,
    session: Option<Session<S::Handle>>,
    events: EventBus,
    sender: EventSender,
}

impl<S: Scene> Generator<S> {
    /// Creates an idle generator.
    #[must_use]
    pub fn new(library: PartLibrary, config: GeneratorConfig, scene: S) -> Self {
        let events = EventBus::default();
        let sender = events.sender();
        Self {
            library,
            config,
            scene,
            session: None,
            events,
            sender,
        }
    }

    /// Part library.
    #[must_use]
    pub fn library(&self) -> &PartLibrary {
        &self.library
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Replaces the configuration. Clears the current session.
    pub fn reconfigure(&mut self, config: GeneratorConfig) {
        self.clear();
        self.config = config;
    }

    /// Scene the generator builds into.
    #[must_use]
    pub fn scene(&self) -> &S {
        &self.scene
    }

    /// Lifecycle event stream.
    ///
    /// Holds the current session's events only: [`Self::generate`] drops
    /// whatever the previous session left unread.
    #[must_use]
    pub fn events(&self) -> EventReceiver {
        self.events.receiver()
    }

    fn validate(&self) -> GenerationResult<Vec<PrototypeId>> {
        let starts = if self.config.start_parts.is_empty() {
            self.library.start_candidates()
        } else {
            self.config.start_parts.clone()
        };
        if starts.is_empty() {
            return Err(GenerationError::NoStartParts);
        }
        if self.config.phases.is_empty() {
            return Err(GenerationError::NoPhases);
        }
        self.library.check_ids(&starts)?;
        for phase in &self.config.phases {
            self.library.check_ids(&phase.part_pool)?;
        }

        let epsilon_sq = self.config.coincidence_epsilon_sq;
        if !epsilon_sq.is_finite() || epsilon_sq < 0.0 {
            return Err(GenerationError::InvalidConfig(format!(
                "coincidence_epsilon_sq must be finite and non-negative, got {epsilon_sq}"
            )));
        }
        if !self.config.origin.is_finite() {
            return Err(GenerationError::InvalidConfig("origin is not finite".into()));
        }
        Ok(starts)
    }

    /// Starts a new session.
    ///
    /// Any previous session is cleared first. With `synchronous` the whole
    /// level is built before returning; otherwise the caller drives
    /// [`Self::step_generation`].
    ///
    /// Returns the seed the session runs with.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if there are no start parts or no
    /// phases, an id is unknown, or no OS seed is available. The generator
    /// stays idle.
    pub fn generate(&mut self, seed_override: Option<u64>, synchronous: bool) -> GenerationResult<u64> {
        let starts = self.validate()?;
        let seed = match seed_override {
            Some(seed) => seed,
            None if self.config.randomize_seed => entropy_seed()?,
            None => self.config.seed,
        };

        self.clear();

        let mut stream = RandomStream::from_seed(seed);
        let pick = stream.pick_index(starts.len()).unwrap_or(0);
        let start_id = starts[pick];
        let start = self.library.prototype(start_id);
        let origin = self.config.origin;
        let handle = self.scene.instantiate(start, &origin);

        let open: Vec<ConnectorRef> = start
            .outbound_connectors()
            .map(|id| ConnectorRef::new(0, id))
            .collect();
        let first = &self.config.phases[0];
        let phase = PhaseStatus::enter(0, first, open);

        let stale = self.events.discard_pending();
        if stale > 0 {
            tracing::debug!("Discarded {} unread events from the previous session", stale);
        }

        tracing::info!(
            "Generating from '{}' with seed {} ({} phases)",
            start.name(),
            seed,
            self.config.phases.len()
        );
        self.sender.send(GenerationEvent::Started { seed });
        self.sender.send(GenerationEvent::PhaseEntered {
            index: 0,
            name: first.name.clone(),
            open_connectors: phase.open.len(),
        });

        self.session = Some(Session {
            seed,
            stream,
            phase,
            instances: vec![PartInstance {
                prototype: start_id,
                pose: origin,
                handle,
                phase: None,
            }],
            links: Vec::new(),
            generating: true,
            steps: 0,
        });

        if synchronous {
            while self.step_generation() {}
        }
        Ok(seed)
    }

    /// Advances the session by one unit of work.
    ///
    /// Returns `true` while there is more to do. Returns `false` on the step
    /// that finishes the level and on every call while idle.
    pub fn step_generation(&mut self) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if !session.generating {
            return false;
        }
        session.steps += 1;

        if session.phase.has_work() {
            session.resolve_next(&self.library, &mut self.scene, self.config.coincidence_epsilon_sq);
            return true;
        }

        let next = session.phase.index + 1;
        if let Some(config) = self.config.phases.get(next) {
            let finished = std::mem::take(&mut session.phase);
            let placed = finished.placed();
            let carried = finished.into_carried();
            tracing::info!(
                "Phase '{}' done ({} placed), entering '{}' with {} connectors",
                self.config.phases[next - 1].name,
                placed,
                config.name,
                carried.len()
            );
            session.phase = PhaseStatus::enter(next, config, carried);
            self.sender.send(GenerationEvent::PhaseEntered {
                index: next,
                name: config.name.clone(),
                open_connectors: session.phase.open.len(),
            });
            return true;
        }

        session.generating = false;
        let summary = session.summary();
        tracing::info!(
            "Generation complete: {} parts, {} links ({} incidental), {} open connectors, {} steps",
            summary.instances,
            summary.links,
            summary.incidental_links,
            summary.open_connectors,
            summary.steps
        );
        self.sender.send(GenerationEvent::Completed(summary));
        false
    }

    /// Destroys every placed instance and drops the session.
    ///
    /// Scenes that tear objects down lazily must finish doing so before the
    /// next [`Self::generate`]; otherwise stale geometry takes part in the
    /// next run's overlap queries.
    pub fn clear(&mut self) {
        if let Some(session) = self.session.take() {
            for instance in &session.instances {
                self.scene.destroy(instance.handle);
            }
            tracing::debug!("Cleared {} instances", session.instances.len());
        }
    }

    /// Whether a session is still growing.
    #[must_use]
    pub fn is_generating(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.generating)
    }

    /// Seed of the current session.
    #[must_use]
    pub fn seed(&self) -> Option<u64> {
        self.session.as_ref().map(|s| s.seed)
    }

    /// Placed instances, start part first.
    #[must_use]
    pub fn instances(&self) -> &[PartInstance<S::Handle>] {
        self.session.as_ref().map(|s| s.instances.as_slice()).unwrap_or_default()
    }

    /// Graph edges in the order they were made.
    #[must_use]
    pub fn links(&self) -> &[Link] {
        self.session.as_ref().map(|s| s.links.as_slice()).unwrap_or_default()
    }

    /// Steps taken in the current session.
    #[must_use]
    pub fn steps(&self) -> u64 {
        self.session.as_ref().map_or(0, |s| s.steps)
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> Option<PhaseProgress<'_>> {
        let session = self.session.as_ref()?;
        let status = &session.phase;
        Some(PhaseProgress {
            index: status.index(),
            name: &self.config.phases[status.index()].name,
            remaining_budget: status.remaining_budget(),
            placed: status.placed(),
            open: status.open().len(),
            failed: status.failed().len(),
        })
    }

    /// Totals so far.
    #[must_use]
    pub fn summary(&self) -> Option<GenerationSummary> {
        self.session.as_ref().map(Session::summary)
    }

    /// World envelope of every placed part. `None` before generation.
    #[must_use]
    pub fn current_bounds(&self) -> Option<Aabb> {
        self.instances()
            .iter()
            .map(|i| self.library.prototype(i.prototype).part_bounds().transformed(&i.pose))
            .reduce(|acc, b| acc.union(&b))
    }

    /// Pose of the start part.
    #[must_use]
    pub fn spawn_pose(&self) -> Option<Pose> {
        self.instances().first().map(|i| i.pose)
    }

    /// World poses of every anchor tagged `tag`, in placement order.
    #[must_use]
    pub fn anchors(&self, tag: &str) -> Vec<Pose> {
        self.instances()
            .iter()
            .flat_map(|i| {
                self.library
                    .prototype(i.prototype)
                    .anchors()
                    .iter()
                    .filter(move |a| a.tag == tag)
                    .map(move |a| i.pose.mul_pose(&a.local_pose))
            })
            .collect()
    }

    /// Unresolved outbound connectors with their world poses.
    #[must_use]
    pub fn open_connectors(&self) -> Vec<(ConnectorRef, Pose)> {
        let Some(session) = self.session.as_ref() else {
            return Vec::new();
        };
        session
            .phase
            .open
            .iter()
            .chain(&session.phase.failed)
            .map(|&at| (at, session.connector_world(&self.library, at).0))
            .collect()
    }

    /// World pose of a live connector.
    #[must_use]
    pub fn connector_pose(&self, at: ConnectorRef) -> Option<Pose> {
        let instance = self.instances().get(at.instance)?;
        let connector = self.library.get(instance.prototype)?.connector(at.connector)?;
        Some(instance.pose.mul_pose(&connector.local_pose))
    }
}
