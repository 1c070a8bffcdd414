//! Shared test level: a hub with corridors, corners, rooms and caps.

#![allow(dead_code)]

use labyrinth_procedural::{
    Connector, GeneratorConfig, Generator, MemoryScene, PartDefinition, PartLibrary, PhaseConfig, Surface,
};
use labyrinth_shared::{Pose, Vec3};

pub fn at(x: f32, y: f32, z: f32, yaw: f32) -> Pose {
    Pose::from_euler_degrees(Vec3::new(x, y, z), Vec3::new(0.0, yaw, 0.0))
}

/// Inbound-only socket at the part origin, facing back.
pub fn entry(tag: &str) -> Connector {
    Connector::new(tag, at(0.0, 0.0, 0.0, 180.0)).inbound_only()
}

pub fn exit(tag: &str, pose: Pose) -> Connector {
    Connector::new(tag, pose).outbound_only()
}

pub fn block(name: &str, center: Vec3, size: Vec3) -> PartDefinition {
    PartDefinition::new(name).with_surface(Surface::cuboid(center, size))
}

pub struct Catacombs {
    pub library: PartLibrary,
    pub config: GeneratorConfig,
}

/// Grid-aligned parts so loops can close onto each other.
pub fn catacombs(halls_budget: u32, caps_budget: u32) -> Catacombs {
    let mut library = PartLibrary::new();

    let hub = library
        .register(
            block("hub", Vec3::new(0.0, 2.0, 0.0), Vec3::new(8.0, 4.0, 8.0))
                .with_connector(Connector::new("door", at(0.0, 0.0, 4.0, 0.0)))
                .with_connector(Connector::new("door", at(4.0, 0.0, 0.0, 90.0)))
                .with_connector(Connector::new("door", at(0.0, 0.0, -4.0, 180.0)))
                .with_connector(Connector::new("door", at(-4.0, 0.0, 0.0, -90.0)))
                .start(),
        )
        .unwrap();

    let corridor = library
        .register(
            block("corridor", Vec3::new(0.0, 1.0, 2.0), Vec3::new(2.0, 2.0, 4.0))
                .with_connector(entry("door"))
                .with_connector(exit("door", at(0.0, 0.0, 4.0, 0.0))),
        )
        .unwrap();

    let corner = library
        .register(
            block("corner", Vec3::new(0.0, 1.0, 1.0), Vec3::new(2.0, 2.0, 2.0))
                .with_connector(entry("door"))
                .with_connector(exit("door", at(1.0, 0.0, 1.0, 90.0))),
        )
        .unwrap();

    let room = library
        .register(
            block("room", Vec3::new(0.0, 1.5, 3.0), Vec3::new(6.0, 3.0, 6.0))
                .with_connector(entry("door"))
                .with_connector(Connector::new("door", at(0.0, 0.0, 6.0, 0.0)))
                .with_connector(Connector::new("door", at(3.0, 0.0, 3.0, 90.0)))
                .with_connector(Connector::new("door", at(-3.0, 0.0, 3.0, -90.0))),
        )
        .unwrap();

    let cap = library
        .register(block("cap", Vec3::new(0.0, 1.0, 0.25), Vec3::new(2.0, 2.0, 0.5)).with_connector(entry("door")))
        .unwrap();

    let config = GeneratorConfig::default()
        .with_start_part(hub)
        .with_phase(PhaseConfig::new("halls", halls_budget, vec![corridor, corner, room]))
        .with_phase(PhaseConfig::new("caps", caps_budget, vec![cap]));

    Catacombs { library, config }
}

pub fn generator(halls_budget: u32, caps_budget: u32) -> Generator<MemoryScene> {
    let Catacombs { library, config } = catacombs(halls_budget, caps_budget);
    Generator::new(library, config, MemoryScene::new())
}

/// Comparable fingerprint of a finished level.
pub fn fingerprint(generator: &Generator<MemoryScene>) -> Vec<(usize, [i32; 3], Option<usize>)> {
    generator
        .instances()
        .iter()
        .map(|i| {
            let p = (i.pose.position * 1000.0).round();
            (i.prototype.index(), [p.x as i32, p.y as i32, p.z as i32], i.phase)
        })
        .collect()
}
