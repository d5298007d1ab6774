//! Window-constrained DTW solver with a sparse cost table.

use std::collections::HashMap;

use tracing::{instrument, trace};

use crate::distance::DtwDistance;
use crate::error::DtwError;
use crate::metric::Metric;
use crate::path::{Alignment, WarpingPath, WarpingStep};
use crate::sequence::SequenceView;
use crate::window::Window;

/// Accumulated cost of one cell and the cell it was reached from.
#[derive(Debug, Clone, Copy)]
struct CostEntry {
    cost: f64,
    prev: (usize, usize),
}

/// Sparse accumulated-cost table in 1-based coordinates.
///
/// Row 0 and column 0 form the boundary. Only the origin is stored there;
/// every other missing cell reads as infinite.
struct CostTable {
    entries: HashMap<(usize, usize), CostEntry>,
}

impl CostTable {
    fn with_capacity(capacity: usize) -> Self {
        let mut entries = HashMap::with_capacity(capacity + 1);
        entries.insert(
            (0, 0),
            CostEntry {
                cost: 0.0,
                prev: (0, 0),
            },
        );
        Self { entries }
    }

    fn get(&self, i: usize, j: usize) -> Option<CostEntry> {
        self.entries.get(&(i, j)).copied()
    }

    fn cost(&self, i: usize, j: usize) -> f64 {
        self.get(i, j).map_or(f64::INFINITY, |e| e.cost)
    }

    /// Fill cell `(i, j)` (1-based) from its three predecessors.
    ///
    /// Up wins only when strictly below both others; left wins when strictly
    /// below the corner; every remaining tie goes to the corner.
    fn relax(&mut self, i: usize, j: usize, dist: f64) {
        let up = self.cost(i - 1, j);
        let left = self.cost(i, j - 1);
        let corner = self.cost(i - 1, j - 1);
        let (best, prev) = if up < left && up < corner {
            (up, (i - 1, j))
        } else if left < corner {
            (left, (i, j - 1))
        } else {
            (corner, (i - 1, j - 1))
        };
        self.entries.insert(
            (i, j),
            CostEntry {
                cost: dist + best,
                prev,
            },
        );
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Reject invalid metrics, and width-sensitive metrics on sequences of
/// different element widths.
pub(crate) fn validate_inputs(
    x: SequenceView<'_>,
    y: SequenceView<'_>,
    metric: &Metric,
) -> Result<(), DtwError> {
    metric.validate()?;
    if metric.requires_equal_width() && x.width() != y.width() {
        return Err(DtwError::DimensionMismatch {
            x_width: x.width(),
            y_width: y.width(),
        });
    }
    Ok(())
}

/// Compute the minimum-cost warping path between `x` and `y`.
///
/// With `window = None` every cell of the grid is evaluated, giving exact
/// DTW in O(len(x) * len(y)) time and memory. With a window, only its cells
/// are evaluated, in window order, and the cost is O(|window|).
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`DtwError::InvalidNormOrder`] | P-norm metric with a non-positive or NaN order |
/// | [`DtwError::DimensionMismatch`] | Built-in metric with differing element widths |
/// | [`DtwError::WindowOutOfBounds`] | A window cell lies outside the grid |
/// | [`DtwError::IncompleteWindow`] | No path from `(0, 0)` reaches the last cell, e.g. exactly one input is empty |
#[instrument(skip_all, fields(len_x = x.len(), len_y = y.len(), window = window.map(Window::len)))]
pub fn dtw(
    x: SequenceView<'_>,
    y: SequenceView<'_>,
    window: Option<&Window>,
    metric: &Metric,
) -> Result<Alignment, DtwError> {
    validate_inputs(x, y, metric)?;
    match window {
        None => solve(x, y, None, metric),
        Some(w) => {
            let (len_x, len_y) = (x.len(), y.len());
            if let Some(&(i, j)) = w.cells().iter().find(|&&(i, j)| i >= len_x || j >= len_y) {
                return Err(DtwError::WindowOutOfBounds { i, j, len_x, len_y });
            }
            solve(x, y, Some(w), metric)
        }
    }
}

/// Run the solver on inputs that have already been validated.
pub(crate) fn solve(
    x: SequenceView<'_>,
    y: SequenceView<'_>,
    window: Option<&Window>,
    metric: &Metric,
) -> Result<Alignment, DtwError> {
    let (len_x, len_y) = (x.len(), y.len());
    let mut table = CostTable::with_capacity(window.map_or(len_x * len_y, Window::len));

    let mut visit = |i: usize, j: usize| {
        let dist = metric.distance(x.element(i), y.element(j));
        table.relax(i + 1, j + 1, dist);
    };
    match window {
        Some(w) => w.cells().iter().for_each(|&(i, j)| visit(i, j)),
        None => (0..len_x).for_each(|i| (0..len_y).for_each(|j| visit(i, j))),
    }
    trace!(cells = table.len(), "cost table filled");

    backtrack(&table, len_x, len_y)
}

fn backtrack(table: &CostTable, len_x: usize, len_y: usize) -> Result<Alignment, DtwError> {
    let incomplete = || DtwError::IncompleteWindow { len_x, len_y };

    let terminal = table.get(len_x, len_y).ok_or_else(incomplete)?;
    if !terminal.cost.is_finite() {
        return Err(incomplete());
    }

    let mut steps = Vec::with_capacity(len_x + len_y);
    let (mut i, mut j) = (len_x, len_y);
    while (i, j) != (0, 0) {
        steps.push(WarpingStep { a: i - 1, b: j - 1 });
        (i, j) = table.get(i, j).ok_or_else(incomplete)?.prev;
    }
    steps.reverse();

    Ok(Alignment {
        cost: DtwDistance::new(terminal.cost),
        path: WarpingPath::new(steps),
    })
}
