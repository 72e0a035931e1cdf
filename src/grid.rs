use std::collections::HashMap;

use smallvec::SmallVec;

use super::F;

/// Cell edge is the threshold divided by this. It is a little over `sqrt(3)`, so the diagonal
/// of a cell stays under the threshold even after rounding.
const CELL_DIVISOR: F = 1.75;

/// How many cells away along each axis a point within the threshold can be.
pub const REACH: i64 = 2;

/// Largest cell coordinate magnitude for which a point's cell is trusted. Beyond it the
/// rounding in `x / cell_size` is no longer small compared to a cell.
const PRECISE: F = 1e-3 / F::EPSILON;

/// Uniform hash grid over a point set, sized for a weld threshold.
///
/// Cells are small enough that any two points sharing a cell are within the threshold, and
/// any two points within the threshold are at most [`REACH`] cells apart along each axis.
/// Only finite points whose cell can be computed precisely are bucketed.
#[derive(Debug, Clone)]
pub struct Grid {
    cell_size: F,
    cells: HashMap<[i64; 3], SmallVec<[u32; 4]>>,
}

impl Grid {
    /// Buckets `points` for `threshold`, which must be positive.
    ///
    /// Also returns the finite points too far from the origin (in cells) to be bucketed
    /// reliably, together with those bucketed points which could be within the threshold of
    /// them. Those must be compared by other means.
    pub fn new(points: &[[F; 3]], threshold: F) -> (Self, Vec<u32>) {
        debug_assert!(threshold > 0.);
        let cell_size = threshold / CELL_DIVISOR;
        let mut cells: HashMap<[i64; 3], SmallVec<[u32; 4]>> = HashMap::new();
        let mut far = vec![];
        for (pi, &p) in points.iter().enumerate() {
            if !p.iter().all(|c| c.is_finite()) {
                continue;
            }
            let q = if cell_size > 0. {
                p.map(|c| c / cell_size)
            } else {
                [F::INFINITY; 3]
            };
            let extent = q.iter().fold(0. as F, |m, c| m.max(c.abs()));
            if extent <= PRECISE {
                cells
                    .entry(q.map(|c| c.floor() as i64))
                    .or_default()
                    .push(pi as u32);
            }
            if extent > PRECISE / 2. {
                far.push(pi as u32);
            }
        }
        (Self { cell_size, cells }, far)
    }

    pub fn cell_size(&self) -> F {
        self.cell_size
    }

    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    /// Every non-empty cell and its members.
    pub fn cells(&self) -> impl Iterator<Item = ([i64; 3], &[u32])> + '_ {
        self.cells.iter().map(|(&c, pts)| (c, pts.as_slice()))
    }

    /// Non-empty cells within [`REACH`] of `c` which order after it, so that iterating
    /// `neighbours` over every cell visits each pair of nearby cells once.
    pub fn neighbours(&self, c: [i64; 3]) -> impl Iterator<Item = ([i64; 3], &[u32])> + '_ {
        let r = -REACH..=REACH;
        r.clone()
            .flat_map(move |dx| r.clone().map(move |dy| [dx, dy]))
            .flat_map(move |[dx, dy]| (-REACH..=REACH).map(move |dz| [dx, dy, dz]))
            .map(move |d| [c[0] + d[0], c[1] + d[1], c[2] + d[2]])
            .filter(move |&n| n > c)
            .filter_map(move |n| self.cells.get(&n).map(|pts| (n, pts.as_slice())))
    }
}
