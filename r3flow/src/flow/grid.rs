//! Scalar 3D raster buffer.
//!
//! One `Grid3` holds one component (x-fastest, then y, then z). No-data
//! cells are stored as `NaN`.

use crate::error::FlowError;
use crate::flow::region::Region;

#[derive(Debug, Clone, PartialEq)]
pub struct Grid3 {
    dims: [usize; 3],
    values: Vec<f64>,
}

/// Number of cells in a `dims` grid, `None` if it does not fit in `usize`
pub(crate) fn cell_total(dims: [usize; 3]) -> Option<usize> {
    dims[0].checked_mul(dims[1])?.checked_mul(dims[2])
}

fn checked_total(dims: [usize; 3]) -> Result<usize, FlowError> {
    cell_total(dims).ok_or_else(|| FlowError::malformed(format!("grid dims {dims:?} overflow the cell count")))
}

impl Grid3 {
    pub fn new(dims: [usize; 3], values: Vec<f64>) -> Result<Self, FlowError> {
        let expected = checked_total(dims)?;
        if values.len() != expected {
            return Err(FlowError::malformed(format!(
                "grid of dims {dims:?} needs {expected} values, got {}",
                values.len()
            )));
        }
        Ok(Self { dims, values })
    }

    /// Grid with every cell set to `value`
    pub fn filled(dims: [usize; 3], value: f64) -> Result<Self, FlowError> {
        let total = checked_total(dims)?;
        Ok(Self {
            dims,
            values: vec![value; total],
        })
    }

    /// Build a grid by evaluating `f(i, j, k)` for every cell
    pub fn from_fn(dims: [usize; 3], mut f: impl FnMut(usize, usize, usize) -> f64) -> Result<Self, FlowError> {
        let mut values = Vec::with_capacity(checked_total(dims)?);
        for k in 0..dims[2] {
            for j in 0..dims[1] {
                for i in 0..dims[0] {
                    values.push(f(i, j, k));
                }
            }
        }
        Ok(Self { dims, values })
    }

    /// Grid over a region's cells with every cell set to `value`
    pub fn filled_over(region: &Region, value: f64) -> Self {
        // `Region::new` already checked the cell count
        Self {
            dims: region.dims(),
            values: vec![value; region.cell_count()],
        }
    }

    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize, k: usize) -> f64 {
        self.values[(k * self.dims[1] + j) * self.dims[0] + i]
    }

    pub fn set(&mut self, i: usize, j: usize, k: usize, value: f64) {
        let idx = (k * self.dims[1] + j) * self.dims[0] + i;
        self.values[idx] = value;
    }

    /// Mark a cell as no-data
    pub fn set_null(&mut self, i: usize, j: usize, k: usize) {
        self.set(i, j, k, f64::NAN);
    }

    #[inline]
    pub fn is_null(&self, i: usize, j: usize, k: usize) -> bool {
        self.get(i, j, k).is_nan()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflowing_dims_are_malformed() {
        let dims = [usize::MAX, 2, 1];
        assert!(matches!(Grid3::new(dims, vec![]), Err(FlowError::MalformedField { .. })));
        assert!(matches!(Grid3::filled(dims, 0.0), Err(FlowError::MalformedField { .. })));
        assert!(matches!(Grid3::from_fn(dims, |_, _, _| 0.0), Err(FlowError::MalformedField { .. })));
    }
}
