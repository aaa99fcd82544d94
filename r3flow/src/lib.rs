pub mod flow;
pub mod configuration;
pub mod benchmark;
pub mod error;

pub use error::FlowError;
pub use flow::states::{NVec3, Seed, Flowline, TraceState, Direction, Category, VELOCITY_EPSILON};
pub use flow::region::Region;
pub use flow::grid::Grid3;
pub use flow::field::{VelocityField, VelocitySource, SampleError, Interpolation};
pub use flow::gradient::gradient_field;
pub use flow::integrator::{Integrator, Scheme, StepOutcome, euler_step, rk4_step};
pub use flow::tracer::{FlowlineTracer, TraceConfig};
pub use flow::accumulation::FlowAccumulation;
pub use flow::batch::{FlowlineSink, FlowDirection, BatchSummary, trace_seeds};
pub use flow::scenario::Scenario;

pub use configuration::config::{ScenarioConfig, RegionConfig, FieldConfig, TracingConfig, SeedConfig, StepUnit};

pub use benchmark::benchmark::{bench_interpolation, bench_schemes};
