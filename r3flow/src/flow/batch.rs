//! Sequential batch driver and the output seam.
//!
//! Seeds are traced one after another; each finished flowline is handed to a
//! [`FlowlineSink`] and, optionally, recorded in a [`FlowAccumulation`].
//! Per-flowline terminations never abort the batch.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::accumulation::FlowAccumulation;
use super::field::VelocitySource;
use super::states::{Direction, Flowline, Seed, TraceState};
use super::tracer::FlowlineTracer;

/// Receives finished flowlines. Persistence format is the sink's business.
pub trait FlowlineSink {
    fn write(&mut self, flowline: Flowline);
}

impl FlowlineSink for Vec<Flowline> {
    fn write(&mut self, flowline: Flowline) {
        self.push(flowline);
    }
}

/// Directions traced per seed
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowDirection {
    #[default]
    #[serde(rename = "forward")]
    Forward,
    #[serde(rename = "backward")]
    Backward,
    #[serde(rename = "both")] // forward pass, then backward pass, same category
    Both,
}

impl FlowDirection {
    pub fn passes(self) -> &'static [Direction] {
        match self {
            FlowDirection::Forward => &[Direction::Forward],
            FlowDirection::Backward => &[Direction::Backward],
            FlowDirection::Both => &[Direction::Forward, Direction::Backward],
        }
    }
}

/// Outcome tally of one batch
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub seeds: usize,
    pub flowlines: usize,
    pub points: usize,
    pub degenerate: usize, // single-point flowlines
    pub stalled: usize,
    pub out_of_domain: usize,
    pub max_steps: usize,
    pub max_length: usize,
}

impl BatchSummary {
    fn record(&mut self, line: &Flowline) {
        self.flowlines += 1;
        self.points += line.len();
        if line.is_degenerate() {
            self.degenerate += 1;
        }
        match line.state {
            TraceState::DoneStalled => self.stalled += 1,
            TraceState::DoneOutOfDomain => self.out_of_domain += 1,
            TraceState::DoneMaxSteps => self.max_steps += 1,
            TraceState::DoneMaxLength => self.max_length += 1,
            TraceState::Running => {}
        }
    }
}

/// Trace every seed in order, feeding `sink` and the optional accumulator
pub fn trace_seeds<F, S>(
    tracer: &FlowlineTracer<'_, F>,
    seeds: &[Seed],
    directions: FlowDirection,
    sink: &mut S,
    mut accumulation: Option<&mut FlowAccumulation>,
) -> BatchSummary
where
    F: VelocitySource + ?Sized,
    S: FlowlineSink + ?Sized,
{
    let mut summary = BatchSummary {
        seeds: seeds.len(),
        ..Default::default()
    };

    for seed in seeds {
        for &direction in directions.passes() {
            let line = tracer.trace_direction(seed, direction);
            summary.record(&line);
            if let Some(acc) = accumulation.as_deref_mut() {
                acc.record(&line);
            }
            sink.write(line);
        }
    }

    info!(
        seeds = summary.seeds,
        flowlines = summary.flowlines,
        points = summary.points,
        stalled = summary.stalled,
        out_of_domain = summary.out_of_domain,
        max_steps = summary.max_steps,
        max_length = summary.max_length,
        "batch finished"
    );

    summary
}
