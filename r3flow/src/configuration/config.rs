//! Configuration types for loading tracing scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! tracing run. A scenario consists of:
//!
//! - [`RegionConfig`]  – volumetric domain (origin, cell size, cell counts)
//! - [`FieldConfig`]   – the velocity field, given directly or as a potential
//! - [`TracingConfig`] – integration scheme, step, direction and caps
//! - [`SeedConfig`]    – starting point and category of each flowline
//! - [`ScenarioConfig`] – top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//! ```yaml
//! region:
//!   origin: [0.0, 0.0, 0.0]
//!   resolution: [1.0, 1.0, 1.0]
//!   dims: [2, 2, 2]
//!
//! field:
//!   kind: grids                 # or `uniform` / `gradient`
//!   vx: [1, 1, 1, 1, 1, 1, 1, null]   # x fastest, null = no-data
//!   vy: [0, 0, 0, 0, 0, 0, 0, 0]
//!   vz: [0, 0, 0, 0, 0, 0, 0, 0]
//!
//! tracing:
//!   scheme: rk4                 # or `euler`
//!   step: 0.25
//!   unit: map                   # or `cell` (step * smallest cell edge)
//!   direction: both             # `forward`, `backward` or `both`
//!   max_steps: 100
//!   max_length: 10.0            # optional
//!   interpolation: trilinear    # or `nearest`
//!
//! seeds:
//!   - position: [0.5, 0.5, 0.5]
//!     category: 1
//!
//! accumulation: true
//! ```

use serde::Deserialize;

use crate::flow::batch::FlowDirection;
use crate::flow::field::Interpolation;
use crate::flow::integrator::Scheme;

/// Unit of `tracing.step`
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepUnit {
    #[default]
    #[serde(rename = "map")] // world units
    Map,
    #[serde(rename = "cell")] // multiples of the smallest cell edge
    Cell,
}

/// Volumetric domain
#[derive(Deserialize, Debug, Clone)]
pub struct RegionConfig {
    pub origin: [f64; 3], // minimum corner
    pub resolution: [f64; 3], // cell size per axis, must be > 0
    pub dims: [usize; 3], // cell counts per axis, must be >= 1
}

/// Velocity field source. Flat arrays are x-fastest, then y, then z.
#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldConfig {
    /// Same velocity everywhere
    Uniform { velocity: [f64; 3] },

    /// One grid per component; `null` marks a no-data cell
    Grids {
        vx: Vec<Option<f64>>,
        vy: Vec<Option<f64>>,
        vz: Vec<Option<f64>>,
    },

    /// Velocity is the gradient of this scalar grid
    Gradient { scalar: Vec<Option<f64>> },
}

/// Integration settings
#[derive(Deserialize, Debug, Clone)]
pub struct TracingConfig {
    #[serde(default)]
    pub scheme: Scheme,
    pub step: f64, // step length in `unit`
    #[serde(default)]
    pub unit: StepUnit,
    #[serde(default)]
    pub direction: FlowDirection,
    pub max_steps: usize,
    #[serde(default)]
    pub max_length: Option<f64>, // world units, absent = unbounded
    #[serde(default)]
    pub interpolation: Interpolation,
}

/// One flowline start
#[derive(Deserialize, Debug, Clone)]
pub struct SeedConfig {
    pub position: [f64; 3],
    pub category: i32,
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioConfig {
    pub region: RegionConfig,
    pub field: FieldConfig,
    pub tracing: TracingConfig,
    pub seeds: Vec<SeedConfig>,
    #[serde(default)]
    pub accumulation: bool, // also count flowlines per cell
}

impl ScenarioConfig {
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }
}
