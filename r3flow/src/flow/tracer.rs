//! Flowline tracer: drives the integrator from a seed until a termination
//! condition fires.
//!
//! State machine (see [`TraceState`]):
//! - starts `Running` with the seed recorded as the first point
//! - `OutOfDomain` from the integrator -> `DoneOutOfDomain`, step discarded
//! - `Stalled` -> `DoneStalled`, the current (already recorded) point is final
//! - accepted step -> point appended, then the step cap is checked before the
//!   length cap

use tracing::{debug, warn};

use crate::error::{require_positive, FlowError};
use super::field::VelocitySource;
use super::integrator::{Integrator, Scheme, StepOutcome};
use super::states::{Direction, Flowline, Seed, TraceState};

/// Per-run tracing parameters, validated once before any seed is traced
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceConfig {
    pub scheme: Scheme, // euler or rk4
    pub direction: Direction, // forward or backward
    pub step_length: f64, // world units per step
    pub max_steps: usize, // hard cap on accepted steps
    pub max_length: Option<f64>, // cap on accumulated length, None = unbounded
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            scheme: Scheme::Rk4,
            direction: Direction::Forward,
            step_length: 1.0,
            max_steps: 1000,
            max_length: None,
        }
    }
}

impl TraceConfig {
    /// Reject non-positive step length and caps
    pub fn validate(&self) -> Result<(), FlowError> {
        require_positive("step_length", self.step_length)?;
        if self.max_steps == 0 {
            return Err(FlowError::invalid("max_steps", "must be at least 1"));
        }
        if let Some(max_length) = self.max_length {
            require_positive("max_length", max_length)?;
        }
        Ok(())
    }
}

/// Traces flowlines through a borrowed, read-only velocity source.
/// Holds no per-flowline state, so one tracer can be shared across threads.
pub struct FlowlineTracer<'a, F: VelocitySource + ?Sized> {
    field: &'a F,
    config: TraceConfig,
}

impl<'a, F: VelocitySource + ?Sized> FlowlineTracer<'a, F> {
    pub fn new(field: &'a F, config: TraceConfig) -> Result<Self, FlowError> {
        config.validate()?;
        Ok(Self { field, config })
    }

    pub fn config(&self) -> &TraceConfig {
        &self.config
    }

    /// Trace `seed` in the configured direction
    pub fn trace(&self, seed: &Seed) -> Flowline {
        self.trace_direction(seed, self.config.direction)
    }

    /// Trace `seed` in an explicit direction
    pub fn trace_direction(&self, seed: &Seed, direction: Direction) -> Flowline {
        let integrator = Integrator::new(self.config.scheme, direction);
        let h = self.config.step_length;

        let mut line = Flowline::start(seed, direction);
        let mut current = seed.position;

        while line.state == TraceState::Running {
            line.state = match integrator.step(self.field, &current, h) {
                StepOutcome::OutOfDomain(reason) => {
                    debug!(category = line.category, %reason, "flowline left the domain");
                    TraceState::DoneOutOfDomain
                }
                StepOutcome::Stalled { .. } => TraceState::DoneStalled,
                StepOutcome::Advanced { next, velocity } => {
                    line.advance(next, velocity.norm(), h);
                    current = next;
                    self.check_caps(&line)
                }
            };
        }

        if line.is_degenerate() {
            warn!(category = line.category, state = ?line.state, "single-point flowline");
        }
        debug!(
            category = line.category,
            ?direction,
            state = ?line.state,
            points = line.len(),
            length = line.length,
            "flowline finished"
        );

        line
    }

    fn check_caps(&self, line: &Flowline) -> TraceState {
        if line.steps >= self.config.max_steps {
            return TraceState::DoneMaxSteps;
        }
        match self.config.max_length {
            Some(max_length) if line.length >= max_length => TraceState::DoneMaxLength,
            _ => TraceState::Running,
        }
    }
}
