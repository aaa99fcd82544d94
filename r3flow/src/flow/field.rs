//! Continuous-domain velocity sampling.
//!
//! `VelocityField` keeps the three components as separate grids
//! (struct-of-arrays) aligned to a `Region` and interpolates them at any
//! world position. Sampling either returns a velocity or a tagged reason why
//! none is available; a zero vector always means "zero flow".

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::FlowError;
use crate::flow::grid::Grid3;
use crate::flow::region::Region;
use crate::flow::states::NVec3;

/// Why a velocity could not be produced at a position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleError {
    /// Position lies outside the interpolation support of the grid
    OutsideSupport,
    /// A cell contributing to the sample is no-data
    NoData,
}

impl fmt::Display for SampleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleError::OutsideSupport => write!(f, "outside interpolation support"),
            SampleError::NoData => write!(f, "no-data cell in interpolation stencil"),
        }
    }
}

/// Anything the integrator can draw velocities from.
/// Implementations must be pure: same position, same answer.
pub trait VelocitySource {
    fn sample(&self, position: &NVec3) -> Result<NVec3, SampleError>;
}

/// Interpolation kernel used by [`VelocityField::sample`]
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    /// Blend the (up to) eight surrounding cell centers. Support is the hull
    /// of the outermost cell centers.
    #[default]
    #[serde(rename = "trilinear")]
    Trilinear,

    /// Value of the cell containing the position. Support is the whole region.
    #[serde(rename = "nearest")]
    Nearest,
}

#[derive(Debug, Clone)]
pub struct VelocityField {
    region: Region,
    vx: Grid3,
    vy: Grid3,
    vz: Grid3,
    interpolation: Interpolation,
}

impl VelocityField {
    /// Wrap three component grids. All three must share the region's dims.
    pub fn new(region: Region, vx: Grid3, vy: Grid3, vz: Grid3) -> Result<Self, FlowError> {
        let dims = region.dims();
        for (name, grid) in [("vx", &vx), ("vy", &vy), ("vz", &vz)] {
            if grid.dims() != dims {
                return Err(FlowError::malformed(format!(
                    "component {name} has dims {:?}, region has {dims:?}",
                    grid.dims()
                )));
            }
        }

        Ok(Self {
            region,
            vx,
            vy,
            vz,
            interpolation: Interpolation::default(),
        })
    }

    /// Same velocity in every cell
    pub fn uniform(region: Region, velocity: NVec3) -> Self {
        Self {
            vx: Grid3::filled_over(&region, velocity.x),
            vy: Grid3::filled_over(&region, velocity.y),
            vz: Grid3::filled_over(&region, velocity.z),
            region,
            interpolation: Interpolation::default(),
        }
    }

    /// Select the interpolation kernel
    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    pub fn components(&self) -> [&Grid3; 3] {
        [&self.vx, &self.vy, &self.vz]
    }

    /// Raw cell velocity, `None` if any component is no-data
    pub fn cell(&self, i: usize, j: usize, k: usize) -> Option<NVec3> {
        let v = NVec3::new(self.vx.get(i, j, k), self.vy.get(i, j, k), self.vz.get(i, j, k));
        if v.iter().any(|c| c.is_nan()) {
            None
        } else {
            Some(v)
        }
    }

    fn sample_nearest(&self, p: &NVec3) -> Result<NVec3, SampleError> {
        let [i, j, k] = self.region.cell_of(p).ok_or(SampleError::OutsideSupport)?;
        self.cell(i, j, k).ok_or(SampleError::NoData)
    }

    fn sample_trilinear(&self, p: &NVec3) -> Result<NVec3, SampleError> {
        if !self.region.contains(p) {
            return Err(SampleError::OutsideSupport);
        }
        let g = self.region.to_grid(p);
        let dims = self.region.dims();

        // per-axis lower index and blend weight toward the upper neighbour
        let mut lo = [0usize; 3];
        let mut t = [0.0f64; 3];
        for a in 0..3 {
            let n = dims[a];
            if n == 1 {
                // single cell on this axis: the kernel collapses onto it
                continue;
            }
            let upper = (n - 1) as f64;
            if g[a] < 0.0 || g[a] > upper {
                return Err(SampleError::OutsideSupport);
            }
            let i0 = (g[a].floor() as usize).min(n - 2);
            lo[a] = i0;
            t[a] = g[a] - i0 as f64;
        }

        let mut v = NVec3::zeros();
        for corner in 0..8 {
            let offs = [corner & 1, (corner >> 1) & 1, (corner >> 2) & 1];
            let mut w = 1.0;
            let mut idx = [0usize; 3];
            for a in 0..3 {
                if offs[a] == 1 {
                    w *= t[a];
                    idx[a] = lo[a] + 1;
                } else {
                    w *= 1.0 - t[a];
                    idx[a] = lo[a];
                }
            }
            // zero-weight corners do not contribute, which also keeps us in
            // bounds on single-cell axes
            if w == 0.0 {
                continue;
            }
            let c = self.cell(idx[0], idx[1], idx[2]).ok_or(SampleError::NoData)?;
            v += c * w;
        }

        Ok(v)
    }
}

impl VelocitySource for VelocityField {
    fn sample(&self, position: &NVec3) -> Result<NVec3, SampleError> {
        if position.iter().any(|c| !c.is_finite()) {
            return Err(SampleError::OutsideSupport);
        }
        match self.interpolation {
            Interpolation::Trilinear => self.sample_trilinear(position),
            Interpolation::Nearest => self.sample_nearest(position),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn region(n: usize) -> Region {
        Region::new(NVec3::zeros(), NVec3::repeat(1.0), [n, n, n]).unwrap()
    }

    /// vx = i + 2j + 3k, exactly representable by trilinear blending
    fn linear_field(n: usize) -> VelocityField {
        let dims = [n, n, n];
        let vx = Grid3::from_fn(dims, |i, j, k| i as f64 + 2.0 * j as f64 + 3.0 * k as f64).unwrap();
        let vy = Grid3::filled(dims, 0.0).unwrap();
        let vz = Grid3::filled(dims, -1.0).unwrap();
        VelocityField::new(region(n), vx, vy, vz).unwrap()
    }

    #[test]
    fn trilinear_reproduces_linear_function() {
        let field = linear_field(4);
        // grid coords (1.25, 0.5, 2.0)
        let p = NVec3::new(1.75, 1.0, 2.5);
        let v = field.sample(&p).unwrap();
        assert_relative_eq!(v.x, 1.25 + 2.0 * 0.5 + 3.0 * 2.0, epsilon = 1e-12);
        assert_relative_eq!(v.y, 0.0);
        assert_relative_eq!(v.z, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn trilinear_hits_cell_centers_exactly() {
        let field = linear_field(3);
        let v = field.sample(&NVec3::new(2.5, 0.5, 1.5)).unwrap();
        assert_eq!(v.x, 2.0 + 3.0);
    }

    #[test]
    fn trilinear_support_excludes_outer_half_cells() {
        let field = linear_field(3);
        // inside the region but before the first cell center
        assert_eq!(field.sample(&NVec3::new(0.25, 1.0, 1.0)), Err(SampleError::OutsideSupport));
        // upper face of the support is still valid
        assert!(field.sample(&NVec3::new(2.5, 1.0, 1.0)).is_ok());
        assert_eq!(field.sample(&NVec3::new(2.75, 1.0, 1.0)), Err(SampleError::OutsideSupport));
    }

    #[test]
    fn outside_region_is_outside_support() {
        let field = linear_field(3);
        assert_eq!(field.sample(&NVec3::new(-1.0, 1.0, 1.0)), Err(SampleError::OutsideSupport));
        assert_eq!(field.sample(&NVec3::new(f64::NAN, 1.0, 1.0)), Err(SampleError::OutsideSupport));
    }

    #[test]
    fn nodata_neighbour_voids_the_sample() {
        let dims = [3, 3, 3];
        let mut vx = Grid3::filled(dims, 1.0).unwrap();
        vx.set_null(1, 1, 1);
        let field = VelocityField::new(
            region(3),
            vx,
            Grid3::filled(dims, 0.0).unwrap(),
            Grid3::filled(dims, 0.0).unwrap(),
        )
        .unwrap();

        // stencil between centers (0..1) touches the void
        assert_eq!(field.sample(&NVec3::new(1.0, 1.0, 1.0)), Err(SampleError::NoData));
        // exactly on a valid center the void carries zero weight
        assert!(field.sample(&NVec3::new(0.5, 0.5, 0.5)).is_ok());
    }

    #[test]
    fn nearest_uses_containing_cell() {
        let field = linear_field(3).with_interpolation(Interpolation::Nearest);
        let v = field.sample(&NVec3::new(0.1, 2.9, 0.4)).unwrap();
        assert_eq!(v.x, 0.0 + 2.0 * 2.0);
        assert!(field.sample(&NVec3::new(3.0, 0.0, 0.0)).is_err());
    }

    #[test]
    fn single_cell_axis_collapses() {
        let r = Region::new(NVec3::zeros(), NVec3::repeat(1.0), [3, 3, 1]).unwrap();
        let field = VelocityField::uniform(r, NVec3::new(0.0, 2.0, 0.0));
        let v = field.sample(&NVec3::new(1.0, 1.0, 0.9)).unwrap();
        assert_relative_eq!(v.y, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn mismatched_components_are_rejected() {
        let r = region(3);
        let err = VelocityField::new(
            r,
            Grid3::filled([3, 3, 3], 0.0).unwrap(),
            Grid3::filled([3, 3, 2], 0.0).unwrap(),
            Grid3::filled([3, 3, 3], 0.0).unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, FlowError::MalformedField { .. }));
    }
}
