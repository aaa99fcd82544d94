//! Flow accumulation: how many flowlines pass through each cell.

use std::collections::HashSet;

use crate::flow::region::Region;
use crate::flow::states::{Flowline, NVec3};

/// Per-cell flowline counts aligned with a `Region`
#[derive(Debug, Clone)]
pub struct FlowAccumulation {
    region: Region,
    counts: Vec<u32>,
}

impl FlowAccumulation {
    pub fn new(region: Region) -> Self {
        let counts = vec![0; region.cell_count()];
        Self { region, counts }
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    /// Counts in x-fastest order
    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    pub fn get(&self, i: usize, j: usize, k: usize) -> u32 {
        self.counts[self.region.index(i, j, k)]
    }

    /// Total of all counts
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| c as u64).sum()
    }

    /// Add one to every cell the flowline passes through, at most once per
    /// flowline
    pub fn record(&mut self, line: &Flowline) {
        let mut visited: HashSet<usize> = HashSet::new();

        if let Some([i, j, k]) = self.region.cell_of(&line.seed_position()) {
            visited.insert(self.region.index(i, j, k));
        }
        for pair in line.points().windows(2) {
            self.walk_segment(&pair[0], &pair[1], &mut visited);
        }

        for idx in visited {
            self.counts[idx] += 1;
        }
    }

    /// Amanatides-Woo traversal of the cells crossed by `a -> b`. A segment
    /// through an edge or corner steps the tied axes together, so cells it
    /// only grazes at a single point are not counted.
    fn walk_segment(&self, a: &NVec3, b: &NVec3, visited: &mut HashSet<usize>) {
        let res = self.region.resolution();
        let ga = (a - self.region.origin()).component_div(&res);
        let gb = (b - self.region.origin()).component_div(&res);
        if ga.iter().chain(gb.iter()).any(|c| !c.is_finite()) {
            return;
        }
        let d = gb - ga;

        let mut cell = [0i64; 3];
        let mut end = [0i64; 3];
        let mut step = [0i64; 3];
        let mut t_max = [f64::INFINITY; 3];
        let mut t_delta = [f64::INFINITY; 3];
        for axis in 0..3 {
            cell[axis] = ga[axis].floor() as i64;
            end[axis] = gb[axis].floor() as i64;
            if d[axis] > 0.0 {
                step[axis] = 1;
                t_delta[axis] = 1.0 / d[axis];
                t_max[axis] = (cell[axis] as f64 + 1.0 - ga[axis]) / d[axis];
            } else if d[axis] < 0.0 {
                step[axis] = -1;
                t_delta[axis] = -1.0 / d[axis];
                t_max[axis] = (ga[axis] - cell[axis] as f64) / -d[axis];
            }
        }

        // every iteration moves at least one axis one cell closer to `end`
        let budget: i64 = (0..3).map(|axis| (end[axis] - cell[axis]).abs()).sum();
        for _ in 0..=budget {
            self.mark(cell, visited);
            if cell == end {
                break;
            }
            // nearest boundary among the axes that still have cells to cross
            let t = (0..3)
                .filter(|&axis| cell[axis] != end[axis])
                .map(|axis| t_max[axis])
                .fold(f64::INFINITY, f64::min);
            for axis in 0..3 {
                if cell[axis] != end[axis] && (t_max[axis] - t).abs() <= 1e-12 {
                    cell[axis] += step[axis];
                    t_max[axis] += t_delta[axis];
                }
            }
        }
    }

    fn mark(&self, cell: [i64; 3], visited: &mut HashSet<usize>) {
        let dims = self.region.dims();
        let inside = (0..3).all(|axis| cell[axis] >= 0 && (cell[axis] as u64) < dims[axis] as u64);
        if inside {
            visited.insert(self.region.index(cell[0] as usize, cell[1] as usize, cell[2] as usize));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::states::{Direction, Seed};

    fn line(points: &[[f64; 3]]) -> Flowline {
        let mut l = Flowline::start(&Seed::new(NVec3::from(points[0]), 1), Direction::Forward);
        for p in &points[1..] {
            l.advance(NVec3::from(*p), 1.0, 1.0);
        }
        l
    }

    #[test]
    fn long_segment_marks_every_crossed_cell_once() {
        let region = Region::new(NVec3::zeros(), NVec3::repeat(1.0), [5, 2, 2]).unwrap();
        let mut acc = FlowAccumulation::new(region);
        acc.record(&line(&[[0.5, 0.5, 0.5], [4.5, 0.5, 0.5]]));

        for i in 0..5 {
            assert_eq!(acc.get(i, 0, 0), 1);
        }
        assert_eq!(acc.total(), 5);
    }

    #[test]
    fn revisiting_a_cell_counts_once_per_line() {
        let region = Region::new(NVec3::zeros(), NVec3::repeat(1.0), [3, 3, 3]).unwrap();
        let mut acc = FlowAccumulation::new(region);
        let l = line(&[[0.2, 0.2, 0.2], [0.8, 0.2, 0.2], [0.3, 0.3, 0.3]]);
        acc.record(&l);
        acc.record(&l);
        assert_eq!(acc.get(0, 0, 0), 2);
        assert_eq!(acc.total(), 2);
    }

    #[test]
    fn diagonal_segment_counts_every_crossed_cell() {
        let region = Region::new(NVec3::zeros(), NVec3::repeat(1.0), [5, 5, 1]).unwrap();
        let mut acc = FlowAccumulation::new(region);
        acc.record(&line(&[[0.2, 1.1, 0.5], [2.2, 3.1, 0.5]]));

        for (i, j) in [(0, 1), (1, 1), (1, 2), (2, 2), (2, 3)] {
            assert_eq!(acc.get(i, j, 0), 1, "cell ({i}, {j}) missed");
        }
        assert_eq!(acc.total(), 5);
    }

    #[test]
    fn segment_through_cell_corners_skips_grazed_cells() {
        let region = Region::new(NVec3::zeros(), NVec3::repeat(1.0), [4, 4, 1]).unwrap();
        let mut acc = FlowAccumulation::new(region);
        acc.record(&line(&[[0.5, 0.5, 0.5], [2.5, 2.5, 0.5]]));

        assert_eq!(acc.get(0, 0, 0), 1);
        assert_eq!(acc.get(1, 1, 0), 1);
        assert_eq!(acc.get(2, 2, 0), 1);
        assert_eq!(acc.get(1, 0, 0), 0);
        assert_eq!(acc.get(0, 1, 0), 0);
        assert_eq!(acc.total(), 3);
    }

    #[test]
    fn segment_leaving_the_region_counts_only_inside_cells() {
        let region = Region::new(NVec3::zeros(), NVec3::repeat(1.0), [3, 1, 1]).unwrap();
        let mut acc = FlowAccumulation::new(region);
        acc.record(&line(&[[1.5, 0.5, 0.5], [4.5, 0.5, 0.5]]));

        assert_eq!(acc.get(1, 0, 0), 1);
        assert_eq!(acc.get(2, 0, 0), 1);
        assert_eq!(acc.total(), 2);
    }
}
