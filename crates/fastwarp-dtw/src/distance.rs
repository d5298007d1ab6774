//! DTW cost newtype wrapper.

use std::fmt;

/// Accumulated cost of a warping path.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct DtwDistance(f64);

impl DtwDistance {
    /// Create a new distance from a raw accumulated cost.
    pub(crate) fn new(value: f64) -> Self {
        Self(value)
    }

    /// Return the raw cost value.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for DtwDistance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}
