//! Core state types for flowline tracing.
//!
//! Defines the per-flowline data:
//! - `Seed`      starting position plus the category carried to the output
//! - `Flowline`  ordered, append-only point sequence for one seed
//! - `TraceState` the tracer's state machine (one running, four terminal)
//! - `Direction` forward (along the field) or backward (against it)
//!
//! Positions are world coordinates stored as `NVec3`.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

pub type NVec3 = Vector3<f64>;

/// Opaque category identifier carried from the seed to the output feature
pub type Category = i32;

/// Minimum velocity magnitude below which the flow is considered stalled
pub const VELOCITY_EPSILON: f64 = 1e-8;

#[derive(Debug, Clone, PartialEq)]
pub struct Seed {
    pub position: NVec3, // world coordinates
    pub category: Category, // passed through unchanged
}

impl Seed {
    pub fn new(position: NVec3, category: Category) -> Self {
        Self { position, category }
    }
}

/// Which way along the field a flowline is traced
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    #[serde(rename = "forward")]
    Forward,
    #[serde(rename = "backward")]
    Backward,
}

impl Direction {
    /// Factor applied to every sampled velocity before integration
    pub fn sign(self) -> f64 {
        match self {
            Direction::Forward => 1.0,
            Direction::Backward => -1.0,
        }
    }
}

/// Tracer state machine. Every `Done*` state is terminal.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceState {
    #[serde(rename = "running")]
    Running,
    #[serde(rename = "stalled")]
    DoneStalled,
    #[serde(rename = "out_of_domain")]
    DoneOutOfDomain,
    #[serde(rename = "max_steps")]
    DoneMaxSteps,
    #[serde(rename = "max_length")]
    DoneMaxLength,
}

impl TraceState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, TraceState::Running)
    }
}

/// Polyline produced for one seed.
///
/// Grows while the tracer runs; once `state` is terminal the flowline is
/// handed to a `FlowlineSink` and never touched again by the core. Points
/// are only appended through [`Flowline::advance`], so the seed is always
/// present.
#[derive(Debug, Clone, PartialEq)]
pub struct Flowline {
    points: Vec<NVec3>, // seed first, then one point per accepted step
    speeds: Vec<f64>, // velocity magnitude at the start of each segment
    pub category: Category,
    pub direction: Direction,
    pub state: TraceState,
    pub length: f64, // accumulated path length (sum of step lengths)
    pub steps: usize, // accepted integration steps
}

impl Flowline {
    /// Open a flowline at the seed position
    pub fn start(seed: &Seed, direction: Direction) -> Self {
        Self {
            points: vec![seed.position],
            speeds: Vec::new(),
            category: seed.category,
            direction,
            state: TraceState::Running,
            length: 0.0,
            steps: 0,
        }
    }

    /// Append the end point of an accepted step. `speed` is the velocity
    /// magnitude the step started from.
    pub(crate) fn advance(&mut self, next: NVec3, speed: f64, step_length: f64) {
        self.points.push(next);
        self.speeds.push(speed);
        self.length += step_length;
        self.steps += 1;
    }

    pub fn points(&self) -> &[NVec3] {
        &self.points
    }

    /// One entry per segment, so always `len() - 1` long
    pub fn speeds(&self) -> &[f64] {
        &self.speeds
    }

    pub fn seed_position(&self) -> NVec3 {
        self.points[0]
    }

    /// Last recorded point (the seed before any step is accepted)
    pub fn last(&self) -> NVec3 {
        // never empty: `start` records the seed and nothing removes points
        self.points[self.points.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// A single-point flowline: the tracer never moved off the seed
    pub fn is_degenerate(&self) -> bool {
        self.points.len() < 2
    }
}
