//! Rigid poses and boxes.
//!
//! These are the canonical representations used by the generator, the
//! scene layer and every downstream consumer of a finished level.

use glam::{EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Position + rotation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Position
    pub position: Vec3,
    /// Rotation
    pub rotation: Quat,
}

impl Pose {
    /// Identity pose
    pub const IDENTITY: Self = Self::new(Vec3::ZERO, Quat::IDENTITY);

    /// Creates a new pose
    #[must_use]
    pub const fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Pure translation
    #[must_use]
    pub const fn from_position(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }

    /// Builds a pose from a position and Euler angles in degrees.
    ///
    /// Angles are applied yaw (Y) first, then pitch (X), then roll (Z).
    #[must_use]
    pub fn from_euler_degrees(position: Vec3, degrees: Vec3) -> Self {
        let rotation = Quat::from_euler(
            EulerRot::YXZ,
            degrees.y.to_radians(),
            degrees.x.to_radians(),
            degrees.z.to_radians(),
        );
        Self::new(position, rotation)
    }

    /// Local `+Z` in the parent frame
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    /// Local `+Y` in the parent frame
    #[must_use]
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Maps a point from this pose's local frame to the parent frame.
    #[must_use]
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.position + self.rotation * point
    }

    /// Maps a point from the parent frame into this pose's local frame.
    #[must_use]
    pub fn inverse_transform_point(&self, point: Vec3) -> Vec3 {
        self.rotation.inverse() * (point - self.position)
    }

    /// Composes `self` (parent) with `local` (child expressed in `self`).
    #[must_use]
    pub fn mul_pose(&self, local: &Pose) -> Pose {
        Pose::new(
            self.transform_point(local.position),
            (self.rotation * local.rotation).normalize(),
        )
    }

    /// Inverse transform
    #[must_use]
    pub fn inverse(&self) -> Pose {
        let rotation = self.rotation.inverse();
        Pose::new(rotation * -self.position, rotation)
    }

    /// Rotates this pose by `rotation` about an axis through `pivot`.
    #[must_use]
    pub fn rotated_about(&self, pivot: Vec3, rotation: Quat) -> Pose {
        Pose::new(
            pivot + rotation * (self.position - pivot),
            (rotation * self.rotation).normalize(),
        )
    }

    /// Returns true if every component is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.rotation.is_finite()
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

// ============================================================================
// AABB (Axis-Aligned Bounding Box)
// ============================================================================

/// Axis-Aligned Bounding Box.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Aabb {
    /// Creates a new AABB.
    #[must_use]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Creates an AABB from a center and full size.
    #[must_use]
    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let half = size.abs() * 0.5;
        Self::new(center - half, center + half)
    }

    /// Envelope of a set of points. `None` when the iterator is empty.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut aabb = Self::new(first, first);
        for p in points {
            aabb.encapsulate(p);
        }
        Some(aabb)
    }

    /// Grows the box to contain `point`.
    pub fn encapsulate(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Smallest box containing both.
    #[must_use]
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// Center point
    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Full size on each axis
    #[must_use]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Half size on each axis
    #[must_use]
    pub fn half_extents(&self) -> Vec3 {
        self.size() * 0.5
    }

    /// Shrinks every side by `amount`, collapsing to the center instead of
    /// inverting on axes thinner than `2 * amount`.
    #[must_use]
    pub fn shrunk(&self, amount: f32) -> Aabb {
        let center = self.center();
        let half = (self.half_extents() - Vec3::splat(amount)).max(Vec3::ZERO);
        Aabb::new(center - half, center + half)
    }

    /// Checks if this AABB intersects another (touching faces do not count).
    #[must_use]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    /// Checks if a point is inside (inclusive).
    #[must_use]
    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// The eight corners.
    #[must_use]
    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(a.x, b.y, b.z),
            Vec3::new(b.x, b.y, b.z),
        ]
    }

    /// World-space envelope of this box placed at `pose`.
    #[must_use]
    pub fn transformed(&self, pose: &Pose) -> Aabb {
        let mut out = Aabb::new(Vec3::splat(f32::MAX), Vec3::splat(f32::MIN));
        for corner in self.corners() {
            out.encapsulate(pose.transform_point(corner));
        }
        out
    }
}

// ============================================================================
// ORIENTED BOX
// ============================================================================

/// A box with its own rotation, used for overlap queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrientedBox {
    /// World center
    pub center: Vec3,
    /// World rotation
    pub rotation: Quat,
    /// Half size along each local axis
    pub half_extents: Vec3,
}

impl OrientedBox {
    /// Parallel-edge cutoff for cross-product axes.
    const AXIS_EPSILON: f32 = 1e-6;

    /// Creates a new oriented box.
    #[must_use]
    pub const fn new(center: Vec3, rotation: Quat, half_extents: Vec3) -> Self {
        Self { center, rotation, half_extents }
    }

    /// Places a box expressed in `pose`'s local frame.
    #[must_use]
    pub fn from_local(pose: &Pose, local: &Aabb) -> Self {
        Self::new(
            pose.transform_point(local.center()),
            pose.rotation,
            local.half_extents(),
        )
    }

    /// The box's world pose (center + rotation).
    #[must_use]
    pub fn pose(&self) -> Pose {
        Pose::new(self.center, self.rotation)
    }

    fn axes(&self) -> [Vec3; 3] {
        [
            self.rotation * Vec3::X,
            self.rotation * Vec3::Y,
            self.rotation * Vec3::Z,
        ]
    }

    fn projected_radius(&self, axes: &[Vec3; 3], axis: Vec3) -> f32 {
        self.half_extents.x * axes[0].dot(axis).abs()
            + self.half_extents.y * axes[1].dot(axis).abs()
            + self.half_extents.z * axes[2].dot(axis).abs()
    }

    /// Separating-axis overlap test. Touching faces do not count.
    #[must_use]
    pub fn intersects(&self, other: &OrientedBox) -> bool {
        let a_axes = self.axes();
        let b_axes = other.axes();
        let offset = other.center - self.center;

        let separated = |axis: Vec3| {
            let distance = offset.dot(axis).abs();
            distance >= self.projected_radius(&a_axes, axis) + other.projected_radius(&b_axes, axis)
        };

        if a_axes.iter().chain(b_axes.iter()).any(|&axis| separated(axis)) {
            return false;
        }

        for a in a_axes {
            for b in b_axes {
                let axis = a.cross(b);
                if axis.length_squared() < Self::AXIS_EPSILON {
                    continue;
                }
                if separated(axis.normalize()) {
                    return false;
                }
            }
        }

        true
    }

    /// World-space envelope.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        Aabb::new(-self.half_extents, self.half_extents).transformed(&self.pose())
    }
}
