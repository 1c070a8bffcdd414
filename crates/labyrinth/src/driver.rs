//! # Step Driver
//!
//! Spreads generation over frames at a fixed number of steps per second,
//! so a level can grow in front of the player instead of stalling a frame.
//!
//! ```text
//! Frame N:
//! ┌──────────────────────────────────────────────────────┐
//! │ 1. elapsed += min(delta, MAX_FRAME_DELTA)            │
//! │ 2. target  = ceil(elapsed * rate)                    │
//! │ 3. step until steps_done == target or level finished │
//! └──────────────────────────────────────────────────────┘
//! ```

use labyrinth_procedural::{Generator, Scene};
use labyrinth_shared::{Vec3, MAX_FRAME_DELTA};

use crate::error::{HostError, HostResult};

/// Frame delta the tools simulate (60 FPS).
pub const SIMULATED_FRAME_DELTA: f32 = 1.0 / 60.0;

/// What one frame did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Generation steps run this frame.
    pub steps: u32,
    /// The level is done.
    pub finished: bool,
}

/// Rate-limited stepping.
#[derive(Clone, Debug)]
pub struct StepDriver {
    rate: f32,
    elapsed: f32,
    steps_done: u64,
    frames: u64,
}

impl StepDriver {
    /// Creates a driver running `steps_per_second` steps.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::InvalidRate`] unless the rate is finite and positive.
    pub fn new(steps_per_second: f32) -> HostResult<Self> {
        if !steps_per_second.is_finite() || steps_per_second <= 0.0 {
            return Err(HostError::InvalidRate(steps_per_second));
        }
        Ok(Self {
            rate: steps_per_second,
            elapsed: 0.0,
            steps_done: 0,
            frames: 0,
        })
    }

    /// Steps per second.
    #[must_use]
    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Steps run since the last reset.
    #[must_use]
    pub fn steps_done(&self) -> u64 {
        self.steps_done
    }

    /// Frames advanced since the last reset.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Starts counting from zero, for a new level.
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.steps_done = 0;
        self.frames = 0;
    }

    /// Runs this frame's share of steps.
    pub fn advance<S: Scene>(&mut self, generator: &mut Generator<S>, delta_time: f32) -> FrameReport {
        // Clamp delta time so a stall does not turn into a burst
        let delta = if delta_time.is_finite() {
            delta_time.clamp(0.0, MAX_FRAME_DELTA)
        } else {
            0.0
        };
        self.elapsed += delta;
        self.frames += 1;

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let target = (self.elapsed * self.rate).ceil() as u64;

        let mut steps = 0;
        while self.steps_done < target {
            self.steps_done += 1;
            steps += 1;
            if !generator.step_generation() {
                return FrameReport { steps, finished: true };
            }
        }
        FrameReport {
            steps,
            finished: !generator.is_generating(),
        }
    }

    /// Advances fixed-length frames until the level is done.
    ///
    /// Returns the number of frames it took.
    pub fn run_to_completion<S: Scene>(&mut self, generator: &mut Generator<S>, frame_delta: f32) -> u64 {
        let start = self.frames;
        while generator.is_generating() {
            let report = self.advance(generator, frame_delta);
            if report.steps > 0 {
                if let Some(phase) = generator.phase() {
                    tracing::trace!(
                        "Frame {}: {} steps, phase '{}' ({} left)",
                        self.frames,
                        report.steps,
                        phase.name,
                        phase.remaining_budget
                    );
                }
            }
            if report.finished {
                break;
            }
        }
        self.frames - start
    }
}

/// Whether `point` has left the generated level, e.g. a player that fell
/// through a gap and needs to be put back at the spawn pose.
#[must_use]
pub fn is_outside_level<S: Scene>(generator: &Generator<S>, point: Vec3) -> bool {
    generator
        .current_bounds()
        .is_some_and(|bounds| !bounds.contains(point))
}
