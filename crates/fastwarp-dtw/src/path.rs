//! Warping path and alignment result types.

use crate::distance::DtwDistance;

/// A single cell of a warping path, pairing index `a` of the first sequence
/// with index `b` of the second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WarpingStep {
    /// Index in the first sequence.
    pub a: usize,
    /// Index in the second sequence.
    pub b: usize,
}

impl From<(usize, usize)> for WarpingStep {
    fn from((a, b): (usize, usize)) -> Self {
        Self { a, b }
    }
}

impl From<WarpingStep> for (usize, usize) {
    fn from(step: WarpingStep) -> Self {
        (step.a, step.b)
    }
}

/// An ordered sequence of warping steps from `(0, 0)` to `(n-1, m-1)`.
///
/// Consecutive steps differ by one of `(+1, 0)`, `(0, +1)` or `(+1, +1)`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WarpingPath(Vec<WarpingStep>);

impl WarpingPath {
    pub(crate) fn new(steps: Vec<WarpingStep>) -> Self {
        Self(steps)
    }

    /// Return the warping steps as a slice.
    #[must_use]
    pub fn steps(&self) -> &[WarpingStep] {
        &self.0
    }

    /// Return the path as plain `(i, j)` index pairs.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(usize, usize)> {
        self.0.iter().map(|&s| s.into()).collect()
    }

    /// Return the number of steps in the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return true if the path contains no steps (both inputs were empty).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check that the path is a valid warping path over an `len_x` by `len_y` grid.
    #[must_use]
    pub fn is_valid_for(&self, len_x: usize, len_y: usize) -> bool {
        let (Some(first), Some(last)) = (self.0.first(), self.0.last()) else {
            return len_x == 0 && len_y == 0;
        };
        if (first.a, first.b) != (0, 0) || (last.a + 1, last.b + 1) != (len_x, len_y) {
            return false;
        }
        self.0.windows(2).all(|pair| {
            let da = pair[1].a.wrapping_sub(pair[0].a);
            let db = pair[1].b.wrapping_sub(pair[0].b);
            matches!((da, db), (1, 0) | (0, 1) | (1, 1))
        })
    }
}

impl<'a> IntoIterator for &'a WarpingPath {
    type Item = &'a WarpingStep;
    type IntoIter = std::slice::Iter<'a, WarpingStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Total cost and warping path produced by one alignment.
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    /// Accumulated cost along [`path`](Self::path).
    pub cost: DtwDistance,
    /// Full-resolution warping path.
    pub path: WarpingPath,
}
