//! # Part Prototypes
//!
//! Immutable templates the generator copies into the level.
//!
//! A prototype is built once from a [`PartDefinition`] when it is
//! registered. Building validates the definition, numbers the connectors
//! and precomputes the bounding volumes:
//!
//! - `part_bounds`: the part-local envelope of all surfaces, registered
//!   with the scene as the instance's solid volume.
//! - one box per connector, expressed in the frame the part will have
//!   relative to an outbound connector when attached through that socket.
//!   The overlap test for a candidate placement is then simply "this box,
//!   at the outbound connector's world pose".

use std::collections::HashMap;

use glam::Vec3;
use labyrinth_shared::{Aabb, Pose, BOUNDS_SHRINK, FACING_FLIP};

use crate::connector::{Connector, ConnectorId};
use crate::error::{GenerationError, GenerationResult};

/// A point cloud of render/collision geometry in part-local space.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Surface {
    /// Vertices, part-local.
    pub vertices: Vec<Vec3>,
}

impl Surface {
    /// Creates a surface from vertices.
    #[must_use]
    pub fn new(vertices: Vec<Vec3>) -> Self {
        Self { vertices }
    }

    /// The eight corners of an axis-aligned cuboid.
    #[must_use]
    pub fn cuboid(center: Vec3, size: Vec3) -> Self {
        Self::new(Aabb::from_center_size(center, size).corners().to_vec())
    }

    /// Moves every vertex by `pose`.
    #[must_use]
    pub fn transformed(mut self, pose: &Pose) -> Self {
        for v in &mut self.vertices {
            *v = pose.transform_point(*v);
        }
        self
    }
}

/// A tagged attachment pose for downstream decoration (shrines, spawns).
#[derive(Clone, Debug, PartialEq)]
pub struct Anchor {
    /// Lookup tag.
    pub tag: String,
    /// Pose relative to the owning part.
    pub local_pose: Pose,
}

impl Anchor {
    /// Creates a new anchor.
    #[must_use]
    pub fn new(tag: impl Into<String>, local_pose: Pose) -> Self {
        Self {
            tag: tag.into(),
            local_pose,
        }
    }
}

/// Raw, unvalidated description of a part.
#[derive(Clone, Debug, Default)]
pub struct PartDefinition {
    /// Unique name.
    pub name: String,
    /// Sockets, in order. Ids are reassigned from this order.
    pub connectors: Vec<Connector>,
    /// Geometry the bounds are computed from.
    pub surfaces: Vec<Surface>,
    /// Decoration anchors.
    pub anchors: Vec<Anchor>,
    /// May seed a level.
    pub can_be_start: bool,
    /// Never rejected by the overlap test.
    pub skip_bounds_check: bool,
    /// Extra clearance added around connector bounds (not toward the joint).
    pub bounds_margin: f32,
}

impl PartDefinition {
    /// Starts a definition.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds a connector.
    #[must_use]
    pub fn with_connector(mut self, connector: Connector) -> Self {
        self.connectors.push(connector);
        self
    }

    /// Adds a surface.
    #[must_use]
    pub fn with_surface(mut self, surface: Surface) -> Self {
        self.surfaces.push(surface);
        self
    }

    /// Adds an anchor.
    #[must_use]
    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchors.push(anchor);
        self
    }

    /// Marks the part as a start candidate.
    #[must_use]
    pub fn start(mut self) -> Self {
        self.can_be_start = true;
        self
    }

    /// Disables the overlap test for this part.
    #[must_use]
    pub fn skip_bounds_check(mut self) -> Self {
        self.skip_bounds_check = true;
        self
    }

    /// Sets the connector bounds margin.
    #[must_use]
    pub fn with_bounds_margin(mut self, margin: f32) -> Self {
        self.bounds_margin = margin;
        self
    }
}

/// Box enclosing `vertices` as seen from a connector the part attaches through.
///
/// Each vertex is moved into the connector's frame and turned half a
/// revolution about up, so the box lines up with the *outbound* connector
/// the part will be attached to. The margin grows every side except the
/// joint face (`-Z`); the result is shrunk by [`BOUNDS_SHRINK`].
///
/// Returns `None` when there are no vertices.
#[must_use]
pub fn connector_local_bounds(vertices: &[Vec3], connector_pose: &Pose, margin: f32) -> Option<Aabb> {
    let local = vertices
        .iter()
        .map(|&v| FACING_FLIP * connector_pose.inverse_transform_point(v));
    let mut bounds = Aabb::from_points(local)?;

    bounds.min -= Vec3::new(margin, margin, 0.0);
    bounds.max += Vec3::splat(margin);

    Some(bounds.shrunk(BOUNDS_SHRINK))
}

/// A validated, immutable part template.
#[derive(Clone, Debug)]
pub struct PartPrototype {
    name: String,
    connectors: Vec<Connector>,
    anchors: Vec<Anchor>,
    can_be_start: bool,
    skip_bounds_check: bool,
    part_bounds: Aabb,
    connector_bounds: Vec<Aabb>,
    inbound_by_tag: HashMap<String, Vec<ConnectorId>>,
}

impl PartPrototype {
    /// Validates a definition and precomputes its bounds.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::InvalidPart`] if the name or a tag is
    /// empty, a pose or vertex is not finite, the margin is negative, or
    /// the part has no geometry.
    pub fn build(definition: PartDefinition) -> GenerationResult<Self> {
        let PartDefinition {
            name,
            mut connectors,
            surfaces,
            anchors,
            can_be_start,
            skip_bounds_check,
            bounds_margin,
        } = definition;

        if name.trim().is_empty() {
            return Err(GenerationError::invalid_part(&name, "name is empty"));
        }
        if !bounds_margin.is_finite() || bounds_margin < 0.0 {
            return Err(GenerationError::invalid_part(
                &name,
                format!("bounds margin must be a non-negative number, got {bounds_margin}"),
            ));
        }

        let vertices: Vec<Vec3> = surfaces.into_iter().flat_map(|s| s.vertices).collect();
        if vertices.iter().any(|v| !v.is_finite()) {
            return Err(GenerationError::invalid_part(&name, "surface vertex is not finite"));
        }
        let part_bounds = Aabb::from_points(vertices.iter().copied())
            .ok_or_else(|| GenerationError::invalid_part(&name, "part has no geometry"))?
            .shrunk(BOUNDS_SHRINK);

        let mut connector_bounds = Vec::with_capacity(connectors.len());
        let mut inbound_by_tag: HashMap<String, Vec<ConnectorId>> = HashMap::new();

        for (id, connector) in connectors.iter_mut().enumerate() {
            if connector.tag.trim().is_empty() {
                return Err(GenerationError::invalid_part(
                    &name,
                    format!("connector {id} has an empty tag"),
                ));
            }
            if !connector.local_pose.is_finite() {
                return Err(GenerationError::invalid_part(
                    &name,
                    format!("connector {id} pose is not finite"),
                ));
            }

            connector.id = id;
            connector.local_pose.rotation = connector.local_pose.rotation.normalize();

            if connector.allow_inbound {
                inbound_by_tag.entry(connector.tag.clone()).or_default().push(id);
            }

            // Non-empty vertices were checked above.
            let bounds = connector_local_bounds(&vertices, &connector.local_pose, bounds_margin)
                .unwrap_or(part_bounds);
            connector_bounds.push(bounds);
        }

        let mut anchors = anchors;
        for anchor in &mut anchors {
            if !anchor.local_pose.is_finite() {
                return Err(GenerationError::invalid_part(
                    &name,
                    format!("anchor '{}' pose is not finite", anchor.tag),
                ));
            }
            anchor.local_pose.rotation = anchor.local_pose.rotation.normalize();
        }

        Ok(Self {
            name,
            connectors,
            anchors,
            can_be_start,
            skip_bounds_check,
            part_bounds,
            connector_bounds,
            inbound_by_tag,
        })
    }

    /// Part name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All connectors, in id order.
    #[must_use]
    pub fn connectors(&self) -> &[Connector] {
        &self.connectors
    }

    /// Connector by id.
    #[must_use]
    pub fn connector(&self, id: ConnectorId) -> Option<&Connector> {
        self.connectors.get(id)
    }

    /// Ids of every connector that may grow new parts.
    pub fn outbound_connectors(&self) -> impl Iterator<Item = ConnectorId> + '_ {
        self.connectors
            .iter()
            .filter(|c| c.allow_outbound)
            .map(|c| c.id)
    }

    /// Ids of every connector the part may attach through.
    pub fn inbound_connectors(&self) -> impl Iterator<Item = ConnectorId> + '_ {
        self.connectors
            .iter()
            .filter(|c| c.allow_inbound)
            .map(|c| c.id)
    }

    /// Ids of inbound connectors able to attach onto `outbound`.
    #[must_use]
    pub fn inbound_connectors_for(&self, outbound: &Connector) -> Vec<ConnectorId> {
        if !outbound.allow_outbound {
            return Vec::new();
        }
        self.inbound_by_tag
            .get(&outbound.tag)
            .cloned()
            .unwrap_or_default()
    }

    /// Whether any inbound connector carries `tag`.
    #[must_use]
    pub fn has_inbound_tag(&self, tag: &str) -> bool {
        self.inbound_by_tag.contains_key(tag)
    }

    /// Decoration anchors.
    #[must_use]
    pub fn anchors(&self) -> &[Anchor] {
        &self.anchors
    }

    /// May seed a level.
    #[must_use]
    pub fn can_be_start(&self) -> bool {
        self.can_be_start
    }

    /// Never rejected by the overlap test.
    #[must_use]
    pub fn skips_bounds_check(&self) -> bool {
        self.skip_bounds_check
    }

    /// Part-local solid envelope.
    #[must_use]
    pub fn part_bounds(&self) -> &Aabb {
        &self.part_bounds
    }

    /// Placement box for attaching through `id`, in the outbound connector's frame.
    #[must_use]
    pub fn connector_bounds(&self, id: ConnectorId) -> Option<&Aabb> {
        self.connector_bounds.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    /// 2 x 2 x 4 corridor along +Z, door in at z=0 facing back, door out at z=4.
    fn corridor() -> PartDefinition {
        PartDefinition::new("corridor")
            .with_surface(Surface::cuboid(Vec3::new(0.0, 1.0, 2.0), Vec3::new(2.0, 2.0, 4.0)))
            .with_connector(
                Connector::new("door", Pose::from_euler_degrees(Vec3::ZERO, Vec3::new(0.0, 180.0, 0.0)))
                    .inbound_only(),
            )
            .with_connector(
                Connector::new("door", Pose::from_position(Vec3::new(0.0, 0.0, 4.0))).outbound_only(),
            )
    }

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_build_assigns_ids_and_indexes_inbound() {
        let proto = PartPrototype::build(corridor()).unwrap();
        assert_eq!(proto.connectors()[0].id, 0);
        assert_eq!(proto.connectors()[1].id, 1);
        assert_eq!(proto.inbound_connectors().collect::<Vec<_>>(), vec![0]);
        assert_eq!(proto.outbound_connectors().collect::<Vec<_>>(), vec![1]);
        assert!(proto.has_inbound_tag("door"));
        assert!(!proto.has_inbound_tag("hatch"));

        let out = proto.connector(1).unwrap();
        assert_eq!(proto.inbound_connectors_for(out), vec![0]);
    }

    #[test]
    fn test_part_bounds_shrunk() {
        let proto = PartPrototype::build(corridor()).unwrap();
        let b = proto.part_bounds();
        assert!(approx(b.min, Vec3::new(-0.99, 0.01, 0.01)));
        assert!(approx(b.max, Vec3::new(0.99, 1.99, 3.99)));
    }

    #[test]
    fn test_connector_bounds_face_away_from_joint() {
        let proto = PartPrototype::build(corridor()).unwrap();
        // Attached through the back door the corridor extends along +Z
        // of the outbound connector it joins.
        let b = proto.connector_bounds(0).unwrap();
        assert!(approx(b.min, Vec3::new(-0.99, 0.01, 0.01)));
        assert!(approx(b.max, Vec3::new(0.99, 1.99, 3.99)));

        // Attached through the front door the body lies on the same side.
        let b = proto.connector_bounds(1).unwrap();
        assert!(approx(b.min, Vec3::new(-0.99, 0.01, 0.01)));
        assert!(approx(b.max, Vec3::new(0.99, 1.99, 3.99)));
    }

    #[test]
    fn test_margin_does_not_grow_toward_joint() {
        let vertices = Surface::cuboid(Vec3::new(0.0, 0.0, 1.0), Vec3::splat(2.0)).vertices;
        let pose = Pose::new(Vec3::ZERO, Quat::from_rotation_y(std::f32::consts::PI));
        let b = connector_local_bounds(&vertices, &pose, 0.5).unwrap();
        assert!((b.min.z - 0.01).abs() < 1e-4, "joint face untouched by margin");
        assert!((b.max.z - 2.49).abs() < 1e-4);
        assert!((b.min.x + 1.49).abs() < 1e-4);
        assert!((b.max.y - 1.49).abs() < 1e-4);
    }

    #[test]
    fn test_rejects_bad_definitions() {
        let no_geometry = PartDefinition::new("ghost")
            .with_connector(Connector::new("door", Pose::IDENTITY));
        assert!(matches!(
            PartPrototype::build(no_geometry),
            Err(GenerationError::InvalidPart { .. })
        ));

        let empty_tag = corridor().with_connector(Connector::new("", Pose::IDENTITY));
        assert!(PartPrototype::build(empty_tag).is_err());

        let negative_margin = corridor().with_bounds_margin(-1.0);
        assert!(PartPrototype::build(negative_margin).is_err());

        let unnamed = PartDefinition { name: "  ".into(), ..corridor() };
        assert!(PartPrototype::build(unnamed).is_err());
    }

    #[test]
    fn test_outbound_only_socket_offers_nothing_to_attach_through() {
        let proto = PartPrototype::build(corridor()).unwrap();
        let inbound = proto.connector(0).unwrap().clone();
        assert!(proto.inbound_connectors_for(&inbound).is_empty());
    }
}
