//! Fixed-step flowline integrators.
//!
//! Flowlines are integrated in arc length, not time: every stage samples the
//! field, normalizes the (direction-signed) velocity to a unit vector and the
//! position advances by exactly `step_length` per accepted step on a straight
//! field. Two schemes are provided, selected once per run:
//! - `euler_step` first order, one sample per step
//! - `rk4_step`   classical fourth order, four samples per step

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::field::{SampleError, VelocitySource};
use super::states::{Direction, NVec3, VELOCITY_EPSILON};

/// Which integration scheme drives the tracer
/// scheme: "euler"` or `scheme: "rk4"
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheme {
    #[serde(rename = "euler")] // first order, lower fidelity, one sample per step
    Euler,

    #[default]
    #[serde(rename = "rk4")] // classical 4th-order Runge-Kutta, midpoint samples
    Rk4,
}

/// Result of one integration step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    /// Step accepted; `velocity` is the signed velocity at the start position
    Advanced { next: NVec3, velocity: NVec3 },
    /// Velocity magnitude at the start position (or at an intermediate
    /// stage) fell below `VELOCITY_EPSILON`
    Stalled { velocity: NVec3 },
    /// The start position or an intermediate stage could not be sampled
    OutOfDomain(SampleError),
}

/// A stage that could not produce a direction
enum Halt {
    Stalled(NVec3),
    OutOfDomain(SampleError),
}

/// Signed velocity and its unit direction at `p`
fn direction_at<F>(field: &F, p: &NVec3, sign: f64) -> Result<(NVec3, NVec3), Halt>
where
    F: VelocitySource + ?Sized,
{
    let v = field.sample(p).map_err(Halt::OutOfDomain)? * sign;
    let speed = v.norm();
    if speed < VELOCITY_EPSILON {
        return Err(Halt::Stalled(v));
    }
    Ok((v / speed, v))
}

/// Advance `p` by one explicit Euler step of length `h`
pub fn euler_step<F>(field: &F, p: &NVec3, h: f64, direction: Direction) -> StepOutcome
where
    F: VelocitySource + ?Sized,
{
    let (k1, v0) = match direction_at(field, p, direction.sign()) {
        Ok(kv) => kv,
        Err(Halt::Stalled(v)) => return StepOutcome::Stalled { velocity: v },
        Err(Halt::OutOfDomain(e)) => return StepOutcome::OutOfDomain(e),
    };

    // x_n+1 = x_n + h * v_n / |v_n|
    StepOutcome::Advanced {
        next: p + k1 * h,
        velocity: v0,
    }
}

/// Advance `p` by one classical RK4 step of length `h`.
/// Any stage landing outside the domain aborts the whole step.
pub fn rk4_step<F>(field: &F, p: &NVec3, h: f64, direction: Direction) -> StepOutcome
where
    F: VelocitySource + ?Sized,
{
    let sign = direction.sign();
    let half_h = 0.5 * h;

    // k1 at the start position
    let (k1, v0) = match direction_at(field, p, sign) {
        Ok(kv) => kv,
        Err(Halt::Stalled(v)) => return StepOutcome::Stalled { velocity: v },
        Err(Halt::OutOfDomain(e)) => return StepOutcome::OutOfDomain(e),
    };

    let stage = |q: NVec3| match direction_at(field, &q, sign) {
        Ok((k, _)) => Ok(k),
        Err(Halt::Stalled(_)) => Err(StepOutcome::Stalled { velocity: v0 }),
        Err(Halt::OutOfDomain(e)) => Err(StepOutcome::OutOfDomain(e)),
    };

    // k2, k3 at the midpoint, k4 at the far end
    let k2 = match stage(p + k1 * half_h) {
        Ok(k) => k,
        Err(outcome) => return outcome,
    };
    let k3 = match stage(p + k2 * half_h) {
        Ok(k) => k,
        Err(outcome) => return outcome,
    };
    let k4 = match stage(p + k3 * h) {
        Ok(k) => k,
        Err(outcome) => return outcome,
    };

    // weighted mean first so a straight field advances by exactly h
    let slope = (k1 + k2 * 2.0 + k3 * 2.0 + k4) / 6.0;
    StepOutcome::Advanced {
        next: p + slope * h,
        velocity: v0,
    }
}

/// Scheme and direction for a run, fixed before tracing starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Integrator {
    pub scheme: Scheme,
    pub direction: Direction,
}

impl Integrator {
    pub fn new(scheme: Scheme, direction: Direction) -> Self {
        Self { scheme, direction }
    }

    /// One step of length `step_length` from `position`
    pub fn step<F>(&self, field: &F, position: &NVec3, step_length: f64) -> StepOutcome
    where
        F: VelocitySource + ?Sized,
    {
        let outcome = match self.scheme {
            Scheme::Euler => euler_step(field, position, step_length, self.direction),
            Scheme::Rk4 => rk4_step(field, position, step_length, self.direction),
        };
        trace!(?position, ?outcome, "integrator step");
        outcome
    }
}
