//! Multiresolution FastDTW driver.

use tracing::{debug, instrument};

use crate::coarsen::reduce_by_half;
use crate::distance::DtwDistance;
use crate::error::DtwError;
use crate::metric::Metric;
use crate::path::Alignment;
use crate::sequence::{Sequence, SequenceView};
use crate::solver::{solve, validate_inputs};
use crate::window::expand_window;

/// Immutable FastDTW configuration.
///
/// Construct via [`FastDtw::new`], then chain `with_*` methods to override defaults.
///
/// # Defaults
///
/// | Parameter | Default |
/// |-----------|---------|
/// | `radius`  | 1 |
/// | `metric`  | [`Metric::Manhattan`] |
#[derive(Debug, Clone)]
pub struct FastDtw {
    radius: usize,
    metric: Metric,
}

impl Default for FastDtw {
    fn default() -> Self {
        Self {
            radius: 1,
            metric: Metric::Manhattan,
        }
    }
}

impl FastDtw {
    /// Create a FastDTW calculator with the given search radius.
    ///
    /// Larger radii widen the window around each projected coarse path,
    /// trading time and memory for accuracy. A radius of at least
    /// `max(len(x), len(y))` yields exact DTW.
    ///
    /// # Errors
    ///
    /// Returns [`DtwError::InvalidRadius`] if `radius` is negative.
    pub fn new(radius: i64) -> Result<Self, DtwError> {
        let radius = usize::try_from(radius).map_err(|_| DtwError::InvalidRadius { radius })?;
        Ok(Self {
            radius,
            ..Self::default()
        })
    }

    /// Set the element distance metric.
    #[must_use]
    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    /// Return the search radius.
    #[must_use]
    pub fn radius(&self) -> usize {
        self.radius
    }

    /// Return the element distance metric.
    #[must_use]
    pub fn metric(&self) -> &Metric {
        &self.metric
    }

    /// Approximate the minimum-cost warping path between `x` and `y`.
    ///
    /// Both sequences are halved until the shorter one has fewer than
    /// `radius + 2` elements. That pair is solved exactly; each finer level is
    /// then solved inside the window projected from the level below it.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::InvalidNormOrder`] | P-norm metric with a non-positive or NaN order |
    /// | [`DtwError::DimensionMismatch`] | Built-in metric with differing element widths |
    /// | [`DtwError::IncompleteWindow`] | Exactly one input is empty, or a projected window misses the last cell |
    #[instrument(skip_all, fields(len_x = x.len(), len_y = y.len(), radius = self.radius))]
    pub fn align(&self, x: SequenceView<'_>, y: SequenceView<'_>) -> Result<Alignment, DtwError> {
        validate_inputs(x, y, &self.metric)?;
        self.refine(x, y)
    }

    /// Approximate DTW cost without the path.
    ///
    /// # Errors
    ///
    /// Same as [`align`](Self::align).
    pub fn distance(&self, x: SequenceView<'_>, y: SequenceView<'_>) -> Result<DtwDistance, DtwError> {
        self.align(x, y).map(|a| a.cost)
    }

    /// Exact DTW over the full grid with this configuration's metric.
    ///
    /// # Errors
    ///
    /// Same as [`align`](Self::align).
    #[instrument(skip_all, fields(len_x = x.len(), len_y = y.len()))]
    pub fn exact(&self, x: SequenceView<'_>, y: SequenceView<'_>) -> Result<Alignment, DtwError> {
        validate_inputs(x, y, &self.metric)?;
        solve(x, y, None, &self.metric)
    }

    fn refine(&self, x: SequenceView<'_>, y: SequenceView<'_>) -> Result<Alignment, DtwError> {
        let min_len = self.radius.saturating_add(2);

        // coarse[k] holds the pair at level k + 1; level 0 is the input.
        let mut coarse: Vec<(Sequence, Sequence)> = Vec::new();
        loop {
            let (cx, cy) = level(x, y, &coarse, coarse.len());
            if cx.len().min(cy.len()) < min_len {
                break;
            }
            let next = (reduce_by_half(cx), reduce_by_half(cy));
            coarse.push(next);
        }

        let (bx, by) = level(x, y, &coarse, coarse.len());
        let mut alignment = solve(bx, by, None, &self.metric)?;
        debug!(
            level = coarse.len(),
            len_x = bx.len(),
            len_y = by.len(),
            cost = %alignment.cost,
            "base level solved exactly"
        );

        for depth in (0..coarse.len()).rev() {
            let (fx, fy) = level(x, y, &coarse, depth);
            let window = expand_window(&alignment.path, fx.len(), fy.len(), self.radius);
            alignment = solve(fx, fy, Some(&window), &self.metric)?;
            debug!(
                level = depth,
                len_x = fx.len(),
                len_y = fy.len(),
                window = window.len(),
                cost = %alignment.cost,
                "level refined"
            );
        }

        Ok(alignment)
    }
}

fn level<'a>(
    x: SequenceView<'a>,
    y: SequenceView<'a>,
    coarse: &'a [(Sequence, Sequence)],
    depth: usize,
) -> (SequenceView<'a>, SequenceView<'a>) {
    match depth.checked_sub(1) {
        None => (x, y),
        Some(k) => (coarse[k].0.as_view(), coarse[k].1.as_view()),
    }
}

/// Approximate DTW between `x` and `y` with the given radius and metric.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`DtwError::InvalidRadius`] | `radius` is negative |
/// | [`DtwError::InvalidNormOrder`] | P-norm metric with a non-positive or NaN order |
/// | [`DtwError::DimensionMismatch`] | Built-in metric with differing element widths |
/// | [`DtwError::IncompleteWindow`] | Exactly one input is empty, or a projected window misses the last cell |
pub fn fastdtw(
    x: SequenceView<'_>,
    y: SequenceView<'_>,
    radius: i64,
    metric: &Metric,
) -> Result<Alignment, DtwError> {
    FastDtw::new(radius)?.with_metric(metric.clone()).align(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::dtw;
    use proptest::prelude::*;

    fn scalar(values: &[f64]) -> Sequence {
        Sequence::scalar(values.to_vec()).unwrap()
    }

    fn sine(n: usize, phase: f64) -> Sequence {
        scalar(&(0..n).map(|i| (i as f64 * 0.2 + phase).sin()).collect::<Vec<_>>())
    }

    #[test]
    fn reference_case() {
        let x = scalar(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let y = scalar(&[2.0, 3.0, 4.0]);
        let result = FastDtw::default().align(x.as_view(), y.as_view()).unwrap();
        assert_eq!(result.cost.value(), 2.0);
        assert_eq!(
            result.path.to_pairs(),
            vec![(0, 0), (1, 0), (2, 1), (3, 2), (4, 2)]
        );
    }

    #[test]
    fn negative_radius_rejected() {
        assert!(matches!(
            FastDtw::new(-1),
            Err(DtwError::InvalidRadius { radius: -1 })
        ));
        let x = scalar(&[1.0]);
        let result = fastdtw(x.as_view(), x.as_view(), -1, &Metric::Manhattan);
        assert!(matches!(result, Err(DtwError::InvalidRadius { .. })));
    }

    #[test]
    fn hand_built_norm_order_rejected() {
        let x = scalar(&[1.0, 2.0, 3.0]);
        let y = scalar(&[2.0, 3.0]);
        let result = fastdtw(x.as_view(), y.as_view(), 1, &Metric::PNorm(0.0));
        assert!(matches!(
            result,
            Err(DtwError::InvalidNormOrder { order }) if order == 0.0
        ));

        let fd = FastDtw::default().with_metric(Metric::PNorm(-2.0));
        assert!(matches!(
            fd.align(x.as_view(), y.as_view()),
            Err(DtwError::InvalidNormOrder { .. })
        ));
        assert!(matches!(
            fd.exact(x.as_view(), y.as_view()),
            Err(DtwError::InvalidNormOrder { .. })
        ));
    }

    #[test]
    fn width_mismatch_rejected_before_work() {
        let x = Sequence::new(vec![0.0; 30], 3).unwrap();
        let y = Sequence::new(vec![0.0; 20], 2).unwrap();
        let result = FastDtw::default().align(x.as_view(), y.as_view());
        assert!(matches!(
            result,
            Err(DtwError::DimensionMismatch { x_width: 3, y_width: 2 })
        ));
    }

    #[test]
    fn one_empty_input_is_incomplete() {
        let x = scalar(&[]);
        let y = scalar(&[1.0, 2.0, 3.0]);
        let result = FastDtw::default().align(x.as_view(), y.as_view());
        assert!(matches!(
            result,
            Err(DtwError::IncompleteWindow { len_x: 0, len_y: 3 })
        ));
    }

    #[test]
    fn both_empty_inputs_align_trivially() {
        let x = scalar(&[]);
        let result = FastDtw::default().align(x.as_view(), x.as_view()).unwrap();
        assert_eq!(result.cost.value(), 0.0);
        assert!(result.path.is_empty());
    }

    #[test]
    fn radius_zero_misses_trailing_row_of_odd_length() {
        // 5 -> 2 -> 1: the projection of a 2x2 path only reaches row 3.
        let x = scalar(&[0.0, 1.0, 2.0, 3.0, 4.0]);
        let result = FastDtw::new(0).unwrap().align(x.as_view(), x.as_view());
        assert!(matches!(
            result,
            Err(DtwError::IncompleteWindow { len_x: 5, len_y: 5 })
        ));
    }

    #[test]
    fn radius_zero_on_power_of_two_lengths() {
        let x = sine(16, 0.0);
        let result = FastDtw::new(0).unwrap().align(x.as_view(), x.as_view()).unwrap();
        assert_eq!(result.cost.value(), 0.0);
        assert!(result.path.is_valid_for(16, 16));
    }

    #[test]
    fn large_radius_is_exact() {
        let x = sine(40, 0.0);
        let y = sine(33, 0.7);
        let exact = dtw(x.as_view(), y.as_view(), None, &Metric::Manhattan).unwrap();
        let approx = FastDtw::new(40).unwrap().align(x.as_view(), y.as_view()).unwrap();
        assert_eq!(approx, exact);
    }

    #[test]
    fn long_sequences_produce_valid_paths() {
        let x = sine(500, 0.0);
        let y = sine(377, 1.3);
        let fast = FastDtw::new(2).unwrap();
        let result = fast.align(x.as_view(), y.as_view()).unwrap();
        assert!(result.path.is_valid_for(500, 377));
        let exact = fast.exact(x.as_view(), y.as_view()).unwrap();
        assert!(result.cost.value() >= exact.cost.value() - 1e-9);
    }

    #[test]
    fn vector_sequences_with_p_norm() {
        let rows = |phase: f64| {
            (0..24)
                .map(|i| {
                    let t = i as f64 * 0.3 + phase;
                    vec![t.sin(), t.cos()]
                })
                .collect::<Vec<_>>()
        };
        let x = Sequence::from_rows(rows(0.0)).unwrap();
        let y = Sequence::from_rows(rows(0.4)).unwrap();
        let fast = FastDtw::new(1)
            .unwrap()
            .with_metric(Metric::p_norm(2.0).unwrap());
        let result = fast.align(x.as_view(), y.as_view()).unwrap();
        assert!(result.path.is_valid_for(24, 24));
        assert!(result.cost.value() > 0.0);
    }

    #[test]
    fn distance_matches_align_cost() {
        let x = sine(64, 0.0);
        let y = sine(50, 0.5);
        let fast = FastDtw::default();
        let d = fast.distance(x.as_view(), y.as_view()).unwrap();
        let a = fast.align(x.as_view(), y.as_view()).unwrap();
        assert_eq!(d, a.cost);
    }

    proptest! {
        #[test]
        fn radius_covering_inputs_matches_exact(
            x in prop::collection::vec(-5.0f64..5.0, 1..30),
            y in prop::collection::vec(-5.0f64..5.0, 1..30),
        ) {
            let (sx, sy) = (scalar(&x), scalar(&y));
            let radius = x.len().max(y.len()) as i64;
            let approx = fastdtw(sx.as_view(), sy.as_view(), radius, &Metric::Manhattan).unwrap();
            let exact = dtw(sx.as_view(), sy.as_view(), None, &Metric::Manhattan).unwrap();
            prop_assert_eq!(approx.cost, exact.cost);
        }

        #[test]
        fn approximation_never_undershoots_exact(
            x in prop::collection::vec(-5.0f64..5.0, 1..60),
            y in prop::collection::vec(-5.0f64..5.0, 1..60),
            radius in 1i64..4,
        ) {
            let (sx, sy) = (scalar(&x), scalar(&y));
            let approx = fastdtw(sx.as_view(), sy.as_view(), radius, &Metric::Manhattan).unwrap();
            let exact = dtw(sx.as_view(), sy.as_view(), None, &Metric::Manhattan).unwrap();
            prop_assert!(approx.cost.value() >= exact.cost.value() - 1e-9);
            prop_assert!(approx.path.is_valid_for(x.len(), y.len()));
        }
    }
}
