//! # Seed Benchmark
//!
//! Generates seeds `0..iterations` back to back and reports how long
//! they took. Useful for spotting seeds that make a level expensive.

use std::fmt;
use std::time::{Duration, Instant};

use labyrinth_procedural::{Generator, Scene};

use crate::error::{HostError, HostResult};

/// Timing for one seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeedTiming {
    /// The seed.
    pub seed: u64,
    /// Wall time of a synchronous generate.
    pub elapsed: Duration,
    /// Parts placed.
    pub parts: usize,
}

/// Result of a seed sweep.
#[derive(Clone, Debug)]
pub struct BenchmarkReport {
    /// Seeds generated.
    pub iterations: u32,
    /// Sum of all generate times.
    pub total: Duration,
    /// Mean generate time.
    pub average: Duration,
    /// Fastest seed.
    pub fastest: SeedTiming,
    /// Slowest seed.
    pub slowest: SeedTiming,
    /// Mean parts per level.
    pub average_parts: f64,
}

impl fmt::Display for BenchmarkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "┌─ SEED BENCHMARK ───────────────────────────────────────┐")?;
        writeln!(f, "│ Iterations:    {}", self.iterations)?;
        writeln!(f, "│ Total:         {:.3} ms", self.total.as_secs_f64() * 1000.0)?;
        writeln!(f, "│ Average:       {:.3} ms", self.average.as_secs_f64() * 1000.0)?;
        writeln!(
            f,
            "│ Max:           {:.3} ms (seed {}, {} parts)",
            self.slowest.elapsed.as_secs_f64() * 1000.0,
            self.slowest.seed,
            self.slowest.parts
        )?;
        writeln!(
            f,
            "│ Min:           {:.3} ms (seed {}, {} parts)",
            self.fastest.elapsed.as_secs_f64() * 1000.0,
            self.fastest.seed,
            self.fastest.parts
        )?;
        writeln!(f, "│ Parts/level:   {:.1}", self.average_parts)?;
        write!(f, "└────────────────────────────────────────────────────────┘")
    }
}

/// Generates every seed in `0..iterations` synchronously and times it.
///
/// # Errors
///
/// Returns [`HostError::Usage`] for zero iterations, or the first
/// generation error.
pub fn run_seed_benchmark<S: Scene>(generator: &mut Generator<S>, iterations: u32) -> HostResult<BenchmarkReport> {
    if iterations == 0 {
        return Err(HostError::Usage("iterations must be at least 1".into()));
    }

    let mut total = Duration::ZERO;
    let mut total_parts = 0usize;
    let mut fastest: Option<SeedTiming> = None;
    let mut slowest: Option<SeedTiming> = None;

    for seed in 0..u64::from(iterations) {
        let start = Instant::now();
        generator.generate(Some(seed), true)?;
        let elapsed = start.elapsed();

        let timing = SeedTiming {
            seed,
            elapsed,
            parts: generator.instances().len(),
        };
        tracing::debug!("Seed {}: {:?}, {} parts", seed, elapsed, timing.parts);

        total += elapsed;
        total_parts += timing.parts;
        if fastest.map_or(true, |t| elapsed < t.elapsed) {
            fastest = Some(timing);
        }
        if slowest.map_or(true, |t| elapsed > t.elapsed) {
            slowest = Some(timing);
        }
    }
    generator.clear();

    let (Some(fastest), Some(slowest)) = (fastest, slowest) else {
        return Err(HostError::Usage("iterations must be at least 1".into()));
    };

    #[allow(clippy::cast_precision_loss)]
    let average_parts = total_parts as f64 / f64::from(iterations);

    Ok(BenchmarkReport {
        iterations,
        total,
        average: total / iterations,
        fastest,
        slowest,
        average_parts,
    })
}
