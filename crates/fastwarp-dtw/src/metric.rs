//! Pointwise distance metrics between sequence elements.

use std::fmt;
use std::sync::Arc;

use crate::error::DtwError;

/// Caller-supplied element distance. Must return a non-negative value.
pub type DistanceFn = dyn Fn(&[f64], &[f64]) -> f64 + Send + Sync;

/// Distance between one element of `x` and one element of `y`.
///
/// Resolved once per alignment; the solver calls [`Metric::distance`] for
/// every cell it visits.
#[derive(Clone, Default)]
pub enum Metric {
    /// Sum of absolute differences. For scalar elements this is `|a - b|`.
    #[default]
    Manhattan,

    /// Minkowski distance of the given order. `f64::INFINITY` gives the
    /// largest absolute difference.
    PNorm(f64),

    /// Arbitrary user-supplied distance.
    Custom(Arc<DistanceFn>),
}

impl Metric {
    /// Create a p-norm metric.
    ///
    /// # Errors
    ///
    /// Returns [`DtwError::InvalidNormOrder`] if `order` is zero, negative, or NaN.
    pub fn p_norm(order: f64) -> Result<Self, DtwError> {
        if order.is_nan() || order <= 0.0 {
            return Err(DtwError::InvalidNormOrder { order });
        }
        Ok(Self::PNorm(order))
    }

    /// Check a metric built directly from its variants.
    ///
    /// # Errors
    ///
    /// Returns [`DtwError::InvalidNormOrder`] for a p-norm whose order is
    /// zero, negative, or NaN.
    pub fn validate(&self) -> Result<(), DtwError> {
        match self {
            Self::PNorm(order) => Self::p_norm(*order).map(|_| ()),
            Self::Manhattan | Self::Custom(_) => Ok(()),
        }
    }

    /// Wrap a closure as a metric.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&[f64], &[f64]) -> f64 + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    /// Return true if both elements must have the same width.
    ///
    /// Built-in metrics compare values pairwise; custom metrics decide for themselves.
    #[must_use]
    pub fn requires_equal_width(&self) -> bool {
        !matches!(self, Self::Custom(_))
    }

    /// Compute the distance between two elements.
    #[must_use]
    pub fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        match self {
            Self::Manhattan => a.iter().zip(b).map(|(p, q)| (p - q).abs()).sum(),
            Self::PNorm(p) => minkowski(a, b, *p),
            Self::Custom(f) => f(a, b),
        }
    }
}

fn minkowski(a: &[f64], b: &[f64], p: f64) -> f64 {
    let diffs = a.iter().zip(b).map(|(x, y)| (x - y).abs());
    if p == 1.0 {
        diffs.sum()
    } else if p == 2.0 {
        diffs.map(|d| d * d).sum::<f64>().sqrt()
    } else if p.is_infinite() {
        diffs.fold(0.0, f64::max)
    } else {
        diffs.map(|d| d.powf(p)).sum::<f64>().powf(p.recip())
    }
}

impl fmt::Debug for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Manhattan => f.write_str("Manhattan"),
            Self::PNorm(p) => f.debug_tuple("PNorm").field(p).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
