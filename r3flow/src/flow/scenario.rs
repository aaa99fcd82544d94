//! Build fully-initialized tracing runs from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces a `Scenario`
//! containing:
//! - the velocity field (region, component grids, interpolation kernel)
//! - validated tracing parameters (`TraceConfig`, step already in world units)
//! - the seeds and the directions to trace them in
//!
//! Every fatal problem (bad region, mismatched grids, non-positive step or
//! caps) surfaces here, before any flowline is traced.

use tracing::info;

use crate::configuration::config::{FieldConfig, ScenarioConfig, StepUnit};
use crate::error::FlowError;
use super::accumulation::FlowAccumulation;
use super::batch::{trace_seeds, BatchSummary, FlowDirection, FlowlineSink};
use super::field::VelocityField;
use super::gradient::gradient_field;
use super::grid::Grid3;
use super::region::Region;
use super::states::{NVec3, Seed};
use super::tracer::{FlowlineTracer, TraceConfig};

/// Runtime bundle for one tracing run
#[derive(Debug, Clone)]
pub struct Scenario {
    pub field: VelocityField,
    pub trace: TraceConfig,
    pub directions: FlowDirection,
    pub seeds: Vec<Seed>,
    pub accumulate: bool,
}

/// `null` cells become NaN, the in-memory no-data marker
fn grid_from(dims: [usize; 3], values: &[Option<f64>]) -> Result<Grid3, FlowError> {
    Grid3::new(dims, values.iter().map(|v| v.unwrap_or(f64::NAN)).collect())
}

impl Scenario {
    pub fn build(cfg: ScenarioConfig) -> Result<Self, FlowError> {
        // Region (runtime) from RegionConfig
        let r_cfg = &cfg.region;
        let region = Region::new(
            NVec3::from(r_cfg.origin),
            NVec3::from(r_cfg.resolution),
            r_cfg.dims,
        )?;
        let dims = region.dims();

        // Field: map each source kind onto three component grids
        let field = match &cfg.field {
            FieldConfig::Uniform { velocity } => {
                VelocityField::uniform(region.clone(), NVec3::from(*velocity))
            }
            FieldConfig::Grids { vx, vy, vz } => VelocityField::new(
                region.clone(),
                grid_from(dims, vx)?,
                grid_from(dims, vy)?,
                grid_from(dims, vz)?,
            )?,
            FieldConfig::Gradient { scalar } => {
                gradient_field(region.clone(), &grid_from(dims, scalar)?)?
            }
        }
        .with_interpolation(cfg.tracing.interpolation);

        // Tracing parameters, step converted to world units
        let t_cfg = &cfg.tracing;
        let step_length = match t_cfg.unit {
            StepUnit::Map => t_cfg.step,
            StepUnit::Cell => t_cfg.step * region.min_resolution(),
        };
        let trace = TraceConfig {
            scheme: t_cfg.scheme,
            direction: t_cfg.direction.passes()[0],
            step_length,
            max_steps: t_cfg.max_steps,
            max_length: t_cfg.max_length,
        };
        trace.validate()?;

        let seeds = cfg
            .seeds
            .iter()
            .map(|s| Seed::new(NVec3::from(s.position), s.category))
            .collect();

        Ok(Self {
            field,
            trace,
            directions: t_cfg.direction,
            seeds,
            accumulate: cfg.accumulation,
        })
    }

    /// Trace every seed into `sink`; returns the tally and, when enabled,
    /// the per-cell flowline counts
    pub fn run<S>(&self, sink: &mut S) -> Result<(BatchSummary, Option<FlowAccumulation>), FlowError>
    where
        S: FlowlineSink + ?Sized,
    {
        let tracer = FlowlineTracer::new(&self.field, self.trace)?;
        let mut accumulation = self
            .accumulate
            .then(|| FlowAccumulation::new(self.field.region().clone()));

        info!(
            seeds = self.seeds.len(),
            scheme = ?self.trace.scheme,
            step_length = self.trace.step_length,
            max_steps = self.trace.max_steps,
            "tracing flowlines"
        );
        let summary = trace_seeds(&tracer, &self.seeds, self.directions, sink, accumulation.as_mut());

        Ok((summary, accumulation))
    }
}
