//! Velocity fields derived from a scalar potential.
//!
//! The gradient is estimated per cell with central differences, falling
//! back to one-sided differences on the grid faces. Flowlines traced
//! forward climb the potential; trace backward to descend it.

use crate::error::FlowError;
use crate::flow::field::VelocityField;
use crate::flow::grid::Grid3;
use crate::flow::region::Region;

/// Derivative of `scalar` along axis `axis` at cell `c`, or NaN when the
/// cell or any stencil neighbour is no-data
fn partial(scalar: &Grid3, c: [usize; 3], axis: usize, h: f64) -> f64 {
    let n = scalar.dims()[axis];
    if n < 2 {
        // flat along a single-cell axis
        return if scalar.is_null(c[0], c[1], c[2]) { f64::NAN } else { 0.0 };
    }

    let at = |i: usize| {
        let mut idx = c;
        idx[axis] = i;
        scalar.get(idx[0], idx[1], idx[2])
    };

    let i = c[axis];
    let (lo, hi) = if i == 0 {
        (0, 1)
    } else if i == n - 1 {
        (n - 2, n - 1)
    } else {
        (i - 1, i + 1)
    };

    let center = at(i);
    if center.is_nan() {
        return f64::NAN;
    }
    // NaN propagates through the subtraction
    (at(hi) - at(lo)) / ((hi - lo) as f64 * h)
}

/// Build a velocity field equal to the gradient of `scalar`
pub fn gradient_field(region: Region, scalar: &Grid3) -> Result<VelocityField, FlowError> {
    let dims = region.dims();
    if scalar.dims() != dims {
        return Err(FlowError::malformed(format!(
            "scalar grid has dims {:?}, region has {dims:?}",
            scalar.dims()
        )));
    }

    let res = region.resolution();
    let vx = Grid3::from_fn(dims, |i, j, k| partial(scalar, [i, j, k], 0, res.x))?;
    let vy = Grid3::from_fn(dims, |i, j, k| partial(scalar, [i, j, k], 1, res.y))?;
    let vz = Grid3::from_fn(dims, |i, j, k| partial(scalar, [i, j, k], 2, res.z))?;

    VelocityField::new(region, vx, vy, vz)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::field::VelocitySource;
    use crate::flow::states::NVec3;
    use approx::assert_relative_eq;

    #[test]
    fn gradient_of_linear_potential_is_constant() {
        let region = Region::new(NVec3::zeros(), NVec3::new(2.0, 1.0, 0.5), [4, 3, 5]).unwrap();
        // phi = 3x - y + 2z in world units (cell centers)
        let scalar = Grid3::from_fn([4, 3, 5], |i, j, k| {
            let x = (i as f64 + 0.5) * 2.0;
            let y = (j as f64 + 0.5) * 1.0;
            let z = (k as f64 + 0.5) * 0.5;
            3.0 * x - y + 2.0 * z
        }).unwrap();
        let field = gradient_field(region, &scalar).unwrap();

        for p in [NVec3::new(1.0, 0.5, 0.25), NVec3::new(4.3, 1.7, 1.1)] {
            let v = field.sample(&p).unwrap();
            assert_relative_eq!(v.x, 3.0, epsilon = 1e-9);
            assert_relative_eq!(v.y, -1.0, epsilon = 1e-9);
            assert_relative_eq!(v.z, 2.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn nodata_spreads_to_stencil_neighbours() {
        let region = Region::new(NVec3::zeros(), NVec3::repeat(1.0), [5, 1, 1]).unwrap();
        let mut scalar = Grid3::from_fn([5, 1, 1], |i, _, _| i as f64).unwrap();
        scalar.set_null(2, 0, 0);
        let field = gradient_field(region, &scalar).unwrap();

        assert!(field.cell(0, 0, 0).is_some());
        assert!(field.cell(1, 0, 0).is_none());
        assert!(field.cell(2, 0, 0).is_none());
        assert!(field.cell(3, 0, 0).is_none());
        assert_relative_eq!(field.cell(4, 0, 0).unwrap().x, 1.0);
    }

    #[test]
    fn scalar_shape_must_match_region() {
        let region = Region::new(NVec3::zeros(), NVec3::repeat(1.0), [2, 2, 2]).unwrap();
        let scalar = Grid3::filled([2, 2, 3], 0.0).unwrap();
        assert!(matches!(gradient_field(region, &scalar), Err(FlowError::MalformedField { .. })));
    }
}
