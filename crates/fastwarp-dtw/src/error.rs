//! Error types for sequence validation and DTW alignment.

/// Errors from sequence construction, input validation, and alignment.
#[derive(Debug, thiserror::Error)]
pub enum DtwError {
    /// Returned when a negative search radius is requested.
    #[error("radius must be non-negative, got {radius}")]
    InvalidRadius {
        /// The rejected radius.
        radius: i64,
    },

    /// Returned when a p-norm order is zero, negative, or NaN.
    #[error("p-norm order must be positive, got {order}")]
    InvalidNormOrder {
        /// The rejected order.
        order: f64,
    },

    /// Returned when a width-sensitive metric is used on sequences whose
    /// elements have different widths.
    #[error("element width mismatch: x has width {x_width}, y has width {y_width}")]
    DimensionMismatch {
        /// Element width of the first sequence.
        x_width: usize,
        /// Element width of the second sequence.
        y_width: usize,
    },

    /// Returned when the active window never reaches the terminal cell, so no
    /// warping path exists inside it.
    #[error("window does not connect (0, 0) to the terminal cell of a {len_x}x{len_y} grid")]
    IncompleteWindow {
        /// Length of the first sequence.
        len_x: usize,
        /// Length of the second sequence.
        len_y: usize,
    },

    /// Returned when a window names a cell outside the cost grid.
    #[error("window cell ({i}, {j}) lies outside the {len_x}x{len_y} grid")]
    WindowOutOfBounds {
        /// Row of the offending cell.
        i: usize,
        /// Column of the offending cell.
        j: usize,
        /// Length of the first sequence.
        len_x: usize,
        /// Length of the second sequence.
        len_y: usize,
    },

    /// Returned when a sequence contains NaN, infinity, or negative infinity.
    #[error("sequence contains non-finite value at index {index}")]
    NonFiniteValue {
        /// Position of the first non-finite value in the flat buffer.
        index: usize,
    },

    /// Returned when the flat buffer cannot be split into elements of the given width.
    #[error("buffer of {len} values cannot be split into elements of width {width}")]
    InvalidWidth {
        /// Number of values in the buffer.
        len: usize,
        /// Requested element width.
        width: usize,
    },

    /// Returned when rows passed to [`Sequence::from_rows`](crate::Sequence::from_rows)
    /// do not all share the width of the first row.
    #[error("row {row} has width {got}, expected {expected}")]
    RaggedRows {
        /// Zero-based index of the offending row.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        got: usize,
    },
}
