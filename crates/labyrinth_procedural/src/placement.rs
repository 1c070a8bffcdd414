//! # Placement Law
//!
//! The single transform rule every connection uses, plus the collision
//! gate in front of it.
//!
//! ```text
//!   rotation = halfTurn(about outbound up) * outbound.rotation * inverse(inbound.local_rotation)
//!   position = outbound.position - rotation * inbound.local_position
//! ```
//!
//! After placement the inbound connector sits exactly on the outbound
//! connector, facing it.

use std::f32::consts::PI;

use glam::Quat;
use labyrinth_shared::{OrientedBox, Pose};

use crate::connector::ConnectorId;
use crate::prototype::PartPrototype;
use crate::scene::Scene;

/// World pose for a part attached through a connector at `inbound_local`
/// onto an outbound connector at `outbound_world`.
#[must_use]
pub fn placement_pose(outbound_world: &Pose, inbound_local: &Pose) -> Pose {
    let flip = Quat::from_axis_angle(outbound_world.up(), PI);
    let rotation =
        (flip * outbound_world.rotation * inbound_local.rotation.inverse()).normalize();
    let position = outbound_world.position - rotation * inbound_local.position;
    Pose::new(position, rotation)
}

/// Spins a placed part about the outbound connector's forward axis.
///
/// The joint stays where it is; only the part turns around it.
#[must_use]
pub fn spin_about_outbound(part_pose: &Pose, outbound_world: &Pose, degrees: f32) -> Pose {
    let spin = Quat::from_axis_angle(outbound_world.forward(), degrees.to_radians());
    part_pose.rotated_about(outbound_world.position, spin)
}

/// The box a candidate occupies when attached through `inbound` onto an
/// outbound connector at `outbound_world`. `None` for an unknown id.
#[must_use]
pub fn placement_box(
    prototype: &PartPrototype,
    inbound: ConnectorId,
    outbound_world: &Pose,
) -> Option<OrientedBox> {
    prototype
        .connector_bounds(inbound)
        .map(|bounds| OrientedBox::from_local(outbound_world, bounds))
}

/// Whether the candidate would overlap already committed geometry.
///
/// Prototypes flagged `skip_bounds_check` never collide.
#[must_use]
pub fn collides_at<S: Scene>(
    scene: &S,
    prototype: &PartPrototype,
    inbound: ConnectorId,
    outbound_world: &Pose,
) -> bool {
    if prototype.skips_bounds_check() {
        return false;
    }
    match placement_box(prototype, inbound, outbound_world) {
        Some(candidate) => scene.overlap_box(&candidate.pose(), candidate.half_extents),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::Connector;
    use crate::prototype::{PartDefinition, Surface};
    use crate::scene::MemoryScene;
    use glam::Vec3;
    use labyrinth_shared::FACING_FLIP;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    fn same_rotation(a: Quat, b: Quat) -> bool {
        a.dot(b).abs() > 1.0 - 1e-5
    }

    fn corridor() -> PartPrototype {
        PartPrototype::build(
            PartDefinition::new("corridor")
                .with_surface(Surface::cuboid(Vec3::new(0.0, 1.0, 2.0), Vec3::new(2.0, 2.0, 4.0)))
                .with_connector(
                    Connector::new("door", Pose::from_euler_degrees(Vec3::ZERO, Vec3::new(0.0, 180.0, 0.0)))
                        .inbound_only(),
                )
                .with_connector(
                    Connector::new("door", Pose::from_position(Vec3::new(0.0, 0.0, 4.0))).outbound_only(),
                ),
        )
        .unwrap()
    }

    #[test]
    fn test_joint_coincides_for_arbitrary_poses() {
        let outbound = Pose::from_euler_degrees(Vec3::new(3.0, -2.0, 7.0), Vec3::new(15.0, 70.0, -30.0));
        let inbound_local = Pose::from_euler_degrees(Vec3::new(0.5, 0.25, -1.0), Vec3::new(-10.0, 200.0, 5.0));

        let part = placement_pose(&outbound, &inbound_local);
        let inbound_world = part.mul_pose(&inbound_local);

        assert!(approx(inbound_world.position, outbound.position));
        assert!(same_rotation(inbound_world.rotation, outbound.rotation * FACING_FLIP));
        // Facing each other.
        assert!(approx(inbound_world.forward(), -outbound.forward()));
    }

    #[test]
    fn test_straight_corridor_continues() {
        let proto = corridor();
        let outbound = Pose::from_position(Vec3::new(0.0, 0.0, 4.0));
        let inbound = proto.connector(0).unwrap();
        let part = placement_pose(&outbound, &inbound.local_pose);
        assert!(approx(part.position, Vec3::new(0.0, 0.0, 4.0)));
        assert!(same_rotation(part.rotation, Quat::IDENTITY));
    }

    #[test]
    fn test_spin_keeps_joint_fixed() {
        let outbound = Pose::from_euler_degrees(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.0, 45.0, 0.0));
        let inbound_local = Pose::from_euler_degrees(Vec3::new(0.0, 0.0, -2.0), Vec3::new(0.0, 180.0, 0.0));
        let part = placement_pose(&outbound, &inbound_local);
        let spun = spin_about_outbound(&part, &outbound, 90.0);

        let joint = spun.transform_point(inbound_local.position);
        assert!(approx(joint, outbound.position));
        assert!(!same_rotation(spun.rotation, part.rotation));
    }

    #[test]
    fn test_placement_box_lies_beyond_joint() {
        let proto = corridor();
        let outbound = Pose::from_position(Vec3::new(0.0, 0.0, 4.0));
        let obb = placement_box(&proto, 0, &outbound).unwrap();
        let bounds = obb.bounds();
        assert!(bounds.min.z > 4.0);
        assert!(bounds.max.z < 8.0);
        assert!(placement_box(&proto, 9, &outbound).is_none());
    }

    #[test]
    fn test_collision_gate() {
        let proto = corridor();
        let mut scene = MemoryScene::new();
        // Start corridor at the origin occupies z in [0, 4].
        scene.instantiate(&proto, &Pose::IDENTITY);

        // Attaching onto its front door is flush: no collision.
        let front = Pose::from_position(Vec3::new(0.0, 0.0, 4.0));
        assert!(!collides_at(&scene, &proto, 0, &front));

        // Attaching onto a socket in the middle of it collides.
        let inside = Pose::from_position(Vec3::new(0.0, 0.0, 1.0));
        assert!(collides_at(&scene, &proto, 0, &inside));

        let ghost = PartPrototype::build(
            PartDefinition::new("ghost")
                .with_surface(Surface::cuboid(Vec3::new(0.0, 1.0, 2.0), Vec3::new(2.0, 2.0, 4.0)))
                .with_connector(Connector::new("door", Pose::IDENTITY))
                .skip_bounds_check(),
        )
        .unwrap();
        assert!(!collides_at(&scene, &ghost, 0, &inside));
    }
}
