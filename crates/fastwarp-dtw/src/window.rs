//! Search windows and coarse-to-fine window expansion.

use std::collections::HashSet;

use tracing::trace;

use crate::path::WarpingPath;

/// Ordered set of `(i, j)` cells the solver may evaluate.
///
/// Cells are evaluated in the stored order, so for every cell its upper, left,
/// and upper-left neighbours must come earlier or be absent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Window(Vec<(usize, usize)>);

impl Window {
    /// The full `len_x` by `len_y` grid in row-major order.
    #[must_use]
    pub fn full(len_x: usize, len_y: usize) -> Self {
        Self(
            (0..len_x)
                .flat_map(|i| (0..len_y).map(move |j| (i, j)))
                .collect(),
        )
    }

    /// Build a window from cells in evaluation order.
    pub fn from_cells<I>(cells: I) -> Self
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        Self(cells.into_iter().collect())
    }

    /// Return the cells in evaluation order.
    #[must_use]
    pub fn cells(&self) -> &[(usize, usize)] {
        &self.0
    }

    /// Return the number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return true if the window admits no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Project a path found at half resolution into a window at full resolution.
///
/// Every coarse cell is dilated by `radius` in both directions, each dilated
/// cell contributes its four children at full resolution, and the resulting
/// candidates are compacted row by row. Each row keeps a single contiguous
/// run of columns starting at or after the first column kept in the previous
/// row; candidates past the end of that run are dropped.
#[must_use]
pub fn expand_window(coarse_path: &WarpingPath, len_x: usize, len_y: usize, radius: usize) -> Window {
    let r = radius as isize;

    let mut halo: HashSet<(isize, isize)> = HashSet::new();
    for step in coarse_path {
        let (i, j) = (step.a as isize, step.b as isize);
        for a in -r..=r {
            for b in -r..=r {
                halo.insert((i + a, j + b));
            }
        }
    }

    let mut candidates: HashSet<(isize, isize)> = HashSet::with_capacity(halo.len() * 4);
    for (i, j) in halo {
        candidates.insert((2 * i, 2 * j));
        candidates.insert((2 * i, 2 * j + 1));
        candidates.insert((2 * i + 1, 2 * j));
        candidates.insert((2 * i + 1, 2 * j + 1));
    }

    let mut cells = Vec::new();
    let mut start_j = 0;
    for i in 0..len_x {
        let mut row_start = None;
        for j in start_j..len_y {
            if candidates.contains(&(i as isize, j as isize)) {
                cells.push((i, j));
                row_start.get_or_insert(j);
            } else if row_start.is_some() {
                break;
            }
        }
        if let Some(j) = row_start {
            start_j = j;
        }
    }

    trace!(coarse_len = coarse_path.len(), window = cells.len(), "window expanded");
    Window(cells)
}
