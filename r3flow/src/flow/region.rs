//! Volumetric domain of a tracing run.
//!
//! A `Region` is an axis-aligned box split into `dims[0] x dims[1] x dims[2]`
//! cells (x fastest, then y, then z). Cell `(i, j, k)` covers
//! `origin + (i, j, k) * resolution` to `origin + (i + 1, j + 1, k + 1) * resolution`
//! and its value is taken to sit at the cell center.

use crate::error::{require_positive, FlowError};
use crate::flow::grid::cell_total;
use crate::flow::states::NVec3;

#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    origin: NVec3, // minimum corner in world coordinates
    resolution: NVec3, // cell size along x, y, z
    dims: [usize; 3], // cell counts along x, y, z
}

impl Region {
    /// Build a region, rejecting non-positive resolution or empty axes
    pub fn new(origin: NVec3, resolution: NVec3, dims: [usize; 3]) -> Result<Self, FlowError> {
        if origin.iter().any(|c| !c.is_finite()) {
            return Err(FlowError::invalid("region.origin", "must be finite"));
        }
        require_positive("region.resolution.x", resolution.x)?;
        require_positive("region.resolution.y", resolution.y)?;
        require_positive("region.resolution.z", resolution.z)?;
        if dims.iter().any(|&n| n == 0) {
            return Err(FlowError::invalid(
                "region.dims",
                format!("every axis needs at least one cell, got {dims:?}"),
            ));
        }
        if cell_total(dims).is_none() {
            return Err(FlowError::invalid(
                "region.dims",
                format!("cell count of {dims:?} overflows"),
            ));
        }

        Ok(Self { origin, resolution, dims })
    }

    pub fn origin(&self) -> NVec3 {
        self.origin
    }

    pub fn resolution(&self) -> NVec3 {
        self.resolution
    }

    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Total number of cells, known to fit in `usize` since `new`
    pub fn cell_count(&self) -> usize {
        self.dims[0] * self.dims[1] * self.dims[2]
    }

    /// Maximum corner in world coordinates
    pub fn extent_max(&self) -> NVec3 {
        self.origin
            + NVec3::new(
                self.dims[0] as f64 * self.resolution.x,
                self.dims[1] as f64 * self.resolution.y,
                self.dims[2] as f64 * self.resolution.z,
            )
    }

    /// Smallest cell edge, used to convert cell-unit steps to world units
    pub fn min_resolution(&self) -> f64 {
        self.resolution.min()
    }

    /// Half-open containment test against the region box
    pub fn contains(&self, p: &NVec3) -> bool {
        let max = self.extent_max();
        (0..3).all(|a| p[a] >= self.origin[a] && p[a] < max[a])
    }

    /// World position -> fractional cell-center coordinates.
    /// Cell `i`'s center maps to exactly `i.0`.
    pub fn to_grid(&self, p: &NVec3) -> NVec3 {
        (p - self.origin).component_div(&self.resolution) - NVec3::repeat(0.5)
    }

    /// Fractional cell-center coordinates -> world position
    pub fn to_world(&self, g: &NVec3) -> NVec3 {
        self.origin + (g + NVec3::repeat(0.5)).component_mul(&self.resolution)
    }

    /// Cell containing `p`, or `None` outside the region
    pub fn cell_of(&self, p: &NVec3) -> Option<[usize; 3]> {
        if !self.contains(p) {
            return None;
        }
        let g = (p - self.origin).component_div(&self.resolution);
        // clamp guards the upper face against rounding
        Some([
            (g.x.floor() as usize).min(self.dims[0] - 1),
            (g.y.floor() as usize).min(self.dims[1] - 1),
            (g.z.floor() as usize).min(self.dims[2] - 1),
        ])
    }

    /// Linear index of cell `(i, j, k)` in x-fastest order
    pub fn index(&self, i: usize, j: usize, k: usize) -> usize {
        (k * self.dims[1] + j) * self.dims[0] + i
    }
}
