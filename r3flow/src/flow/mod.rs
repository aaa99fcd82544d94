pub mod states;
pub mod region;
pub mod grid;
pub mod field;
pub mod gradient;
pub mod integrator;
pub mod tracer;
pub mod accumulation;
pub mod batch;
pub mod scenario;
