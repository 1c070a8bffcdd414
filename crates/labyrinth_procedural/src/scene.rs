//! # Scene Seam
//!
//! The generator never owns geometry. It asks a [`Scene`] to instantiate
//! and destroy part instances and to answer box-overlap queries against
//! everything committed so far.
//!
//! A game engine implements [`Scene`] on top of its own object and physics
//! layers. [`MemoryScene`] is the headless implementation used by the
//! tools, tests and benchmarks: every instance contributes one oriented
//! box (its prototype's `part_bounds` at the instance pose).

use std::cell::Cell;
use std::fmt::Debug;

use glam::Vec3;
use labyrinth_shared::{Aabb, OrientedBox, Pose};

use crate::prototype::PartPrototype;

/// Engine layer consumed by the generator.
pub trait Scene {
    /// Opaque handle to an instantiated part.
    type Handle: Copy + Eq + Debug;

    /// Creates an instance of `prototype` at `pose` and commits its solid
    /// geometry, so later overlap queries see it.
    fn instantiate(&mut self, prototype: &PartPrototype, pose: &Pose) -> Self::Handle;

    /// Removes an instance and its geometry.
    fn destroy(&mut self, handle: Self::Handle);

    /// Whether a box centered at `pose` with `half_extents` overlaps any
    /// committed geometry.
    fn overlap_box(&self, pose: &Pose, half_extents: Vec3) -> bool;
}

/// Handle issued by [`MemoryScene`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(u32);

impl BodyHandle {
    /// Raw id.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

#[derive(Clone, Copy, Debug)]
struct Body {
    handle: BodyHandle,
    shape: OrientedBox,
    /// Broad-phase envelope.
    bounds: Aabb,
}

/// Headless scene: a flat list of oriented boxes.
#[derive(Clone, Debug, Default)]
pub struct MemoryScene {
    bodies: Vec<Body>,
    next_handle: u32,
    overlap_queries: Cell<u64>,
}

impl MemoryScene {
    /// Creates an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Returns true if nothing is instantiated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Solid box of a live instance.
    #[must_use]
    pub fn shape(&self, handle: BodyHandle) -> Option<&OrientedBox> {
        self.bodies
            .iter()
            .find(|b| b.handle == handle)
            .map(|b| &b.shape)
    }

    /// Overlap queries answered since creation.
    #[must_use]
    pub fn overlap_queries(&self) -> u64 {
        self.overlap_queries.get()
    }

    /// Pairs of live instances whose boxes overlap.
    #[must_use]
    pub fn overlapping_pairs(&self) -> Vec<(BodyHandle, BodyHandle)> {
        let mut pairs = Vec::new();
        for (i, a) in self.bodies.iter().enumerate() {
            for b in &self.bodies[i + 1..] {
                if a.bounds.intersects(&b.bounds) && a.shape.intersects(&b.shape) {
                    pairs.push((a.handle, b.handle));
                }
            }
        }
        pairs
    }
}

impl Scene for MemoryScene {
    type Handle = BodyHandle;

    fn instantiate(&mut self, prototype: &PartPrototype, pose: &Pose) -> BodyHandle {
        let handle = BodyHandle(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);

        let shape = OrientedBox::from_local(pose, prototype.part_bounds());
        self.bodies.push(Body {
            handle,
            shape,
            bounds: shape.bounds(),
        });
        handle
    }

    fn destroy(&mut self, handle: BodyHandle) {
        self.bodies.retain(|b| b.handle != handle);
    }

    fn overlap_box(&self, pose: &Pose, half_extents: Vec3) -> bool {
        self.overlap_queries.set(self.overlap_queries.get() + 1);

        let probe = OrientedBox::new(pose.position, pose.rotation, half_extents);
        let probe_bounds = probe.bounds();
        self.bodies
            .iter()
            .any(|b| b.bounds.intersects(&probe_bounds) && b.shape.intersects(&probe))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::Connector;
    use crate::prototype::{PartDefinition, Surface};
    use glam::Quat;

    fn cube() -> PartPrototype {
        PartPrototype::build(
            PartDefinition::new("cube")
                .with_surface(Surface::cuboid(Vec3::ZERO, Vec3::splat(2.0)))
                .with_connector(Connector::new("door", Pose::IDENTITY)),
        )
        .unwrap()
    }

    #[test]
    fn test_instantiate_and_destroy() {
        let proto = cube();
        let mut scene = MemoryScene::new();
        let a = scene.instantiate(&proto, &Pose::IDENTITY);
        let b = scene.instantiate(&proto, &Pose::from_position(Vec3::new(5.0, 0.0, 0.0)));
        assert_ne!(a, b);
        assert_eq!(scene.len(), 2);

        scene.destroy(a);
        assert_eq!(scene.len(), 1);
        assert!(scene.shape(a).is_none());
        assert!(scene.shape(b).is_some());
    }

    #[test]
    fn test_overlap_query() {
        let proto = cube();
        let mut scene = MemoryScene::new();
        scene.instantiate(&proto, &Pose::IDENTITY);

        assert!(scene.overlap_box(&Pose::from_position(Vec3::new(1.5, 0.0, 0.0)), Vec3::ONE));
        assert!(!scene.overlap_box(&Pose::from_position(Vec3::new(2.5, 0.0, 0.0)), Vec3::ONE));

        // Rotated probe reaching back into the cube.
        let rotated = Pose::new(Vec3::new(2.3, 0.0, 0.0), Quat::from_rotation_y(std::f32::consts::FRAC_PI_4));
        assert!(scene.overlap_box(&rotated, Vec3::ONE));
        assert_eq!(scene.overlap_queries(), 3);
    }

    #[test]
    fn test_overlapping_pairs() {
        let proto = cube();
        let mut scene = MemoryScene::new();
        let a = scene.instantiate(&proto, &Pose::IDENTITY);
        let _far = scene.instantiate(&proto, &Pose::from_position(Vec3::new(10.0, 0.0, 0.0)));
        let c = scene.instantiate(&proto, &Pose::from_position(Vec3::new(1.0, 0.0, 0.0)));
        assert_eq!(scene.overlapping_pairs(), vec![(a, c)]);
    }
}
