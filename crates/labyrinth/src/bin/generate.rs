//! # Level Generator
//!
//! Loads a level file, builds it and prints what came out.
//!
//! ## Usage
//!
//! ```bash
//! generate assets/levels/catacombs.toml --seed 42
//! generate assets/levels/catacombs.toml --stepped 120
//! ```

use std::collections::BTreeMap;
use std::process::ExitCode;

use labyrinth::procedural::{GenerationEvent, Level, MemoryScene};
use labyrinth::{init_logging, HostError, HostResult, StepDriver, SIMULATED_FRAME_DELTA};

struct Options {
    path: String,
    seed: Option<u64>,
    stepped: Option<f32>,
}

fn print_usage() {
    println!("Usage: generate <level.toml> [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -s, --seed <SEED>          Seed (default: from the level file)");
    println!("      --stepped <RATE>       Grow at RATE steps/s on a simulated 60 FPS clock");
    println!("  -h, --help                 Show this help");
}

fn parse_args() -> HostResult<Option<Options>> {
    let args: Vec<String> = std::env::args().collect();
    let mut path = None;
    let mut seed = None;
    let mut stepped = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--seed" | "-s" => {
                let value = args.get(i + 1).ok_or_else(|| HostError::Usage("--seed needs a value".into()))?;
                seed = Some(
                    value
                        .parse()
                        .map_err(|_| HostError::Usage(format!("bad seed: {value}")))?,
                );
                i += 1;
            }
            "--stepped" => {
                let value = args.get(i + 1).ok_or_else(|| HostError::Usage("--stepped needs a rate".into()))?;
                stepped = Some(
                    value
                        .parse()
                        .map_err(|_| HostError::Usage(format!("bad rate: {value}")))?,
                );
                i += 1;
            }
            "--help" | "-h" => {
                print_usage();
                return Ok(None);
            }
            other if path.is_none() => path = Some(other.to_string()),
            other => return Err(HostError::Usage(format!("unexpected argument: {other}"))),
        }
        i += 1;
    }

    let path = path.ok_or_else(|| HostError::Usage("generate <level.toml> [--seed N] [--stepped RATE]".into()))?;
    Ok(Some(Options { path, seed, stepped }))
}

fn run(options: &Options) -> HostResult<()> {
    let level = Level::from_file(&options.path)?;
    let mut generator = level.into_generator(MemoryScene::new());
    let events = generator.events();

    match options.stepped {
        Some(rate) => {
            let mut driver = StepDriver::new(rate)?;
            generator.generate(options.seed, false)?;
            let frames = driver.run_to_completion(&mut generator, SIMULATED_FRAME_DELTA);
            println!(
                "Grew over {} frames ({:.2} s at {} steps/s)",
                frames,
                frames as f64 * f64::from(SIMULATED_FRAME_DELTA),
                rate
            );
        }
        None => {
            generator.generate(options.seed, true)?;
        }
    }

    for event in events.drain() {
        match event {
            GenerationEvent::Started { seed } => println!("Started with seed {seed}"),
            GenerationEvent::PhaseEntered { index, name, open_connectors } => {
                println!("Phase {index} '{name}': {open_connectors} open connectors");
            }
            GenerationEvent::Completed(summary) => {
                println!();
                println!("┌─ LEVEL ─────────────────────────────────────────────────────────┐");
                println!("│ Seed:               {}", summary.seed);
                println!("│ Parts:              {}", summary.instances);
                println!("│ Links:              {} ({} incidental)", summary.links, summary.incidental_links);
                println!("│ Dead ends:          {}", summary.open_connectors);
                println!("│ Steps:              {}", summary.steps);
            }
        }
    }

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for instance in generator.instances() {
        if let Some(prototype) = generator.library().get(instance.prototype) {
            *counts.entry(prototype.name()).or_default() += 1;
        }
    }
    for (name, count) in &counts {
        println!("│   {name:<16} {count}");
    }
    if let Some(bounds) = generator.current_bounds() {
        println!("│ Bounds:             {:?} .. {:?}", bounds.min, bounds.max);
    }
    if let Some(spawn) = generator.spawn_pose() {
        println!("│ Spawn:              {:?}", spawn.position);
    }
    println!("│ Shrine anchors:     {}", generator.anchors("shrine").len());
    println!("└──────────────────────────────────────────────────────────────────┘");
    Ok(())
}

fn main() -> ExitCode {
    init_logging();

    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║         LABYRINTH LEVEL GENERATOR                                ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!();

    let result = parse_args().and_then(|options| match options {
        Some(options) => run(&options),
        None => Ok(()),
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
