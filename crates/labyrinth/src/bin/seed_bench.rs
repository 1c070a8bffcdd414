//! # Seed Benchmark
//!
//! Times synchronous generation of seeds `0..iterations`.
//!
//! ## Usage
//!
//! ```bash
//! seed_bench assets/levels/catacombs.toml 1000
//! ```

use std::process::ExitCode;

use labyrinth::procedural::{Level, MemoryScene};
use labyrinth::{init_logging, run_seed_benchmark, HostError, HostResult};

const DEFAULT_ITERATIONS: u32 = 100;

fn run() -> HostResult<()> {
    let args: Vec<String> = std::env::args().collect();
    let path = args
        .get(1)
        .ok_or_else(|| HostError::Usage("seed_bench <level.toml> [iterations]".into()))?;
    let iterations = match args.get(2) {
        Some(value) => value
            .parse()
            .map_err(|_| HostError::Usage(format!("bad iteration count: {value}")))?,
        None => DEFAULT_ITERATIONS,
    };

    let level = Level::from_file(path)?;
    let mut generator = level.into_generator(MemoryScene::new());

    println!("Generating {iterations} seeds from {path}...");
    let report = run_seed_benchmark(&mut generator, iterations)?;
    println!();
    println!("{report}");
    Ok(())
}

fn main() -> ExitCode {
    init_logging();

    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║         LABYRINTH SEED BENCHMARK                                 ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
