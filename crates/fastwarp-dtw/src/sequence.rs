//! Sequence types with validation guarantees.
//!
//! Elements are stored in a flat row-major buffer: element `k` of a sequence
//! with width `w` occupies `values[k * w..(k + 1) * w]`. Scalar sequences have
//! width 1.

use std::ops::Index;

use crate::error::DtwError;

fn validate(values: &[f64], width: usize) -> Result<(), DtwError> {
    if width == 0 || values.len() % width != 0 {
        return Err(DtwError::InvalidWidth {
            len: values.len(),
            width,
        });
    }
    if let Some(index) = values.iter().position(|v| !v.is_finite()) {
        return Err(DtwError::NonFiniteValue { index });
    }
    Ok(())
}

/// Owned, validated sequence. All values are finite; may be empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    values: Vec<f64>,
    width: usize,
}

impl Sequence {
    /// Create a sequence from a flat buffer of elements of the given width.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::InvalidWidth`] | `width` is zero or does not divide `values.len()` |
    /// | [`DtwError::NonFiniteValue`] | Any value is NaN or infinite |
    pub fn new(values: Vec<f64>, width: usize) -> Result<Self, DtwError> {
        validate(&values, width)?;
        Ok(Self { values, width })
    }

    /// Create a sequence of scalar elements.
    ///
    /// # Errors
    ///
    /// Returns [`DtwError::NonFiniteValue`] if any value is NaN or infinite.
    pub fn scalar(values: Vec<f64>) -> Result<Self, DtwError> {
        Self::new(values, 1)
    }

    /// Create a sequence of vector elements, one row per element.
    ///
    /// An empty `rows` yields an empty scalar sequence.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::RaggedRows`] | A row differs in width from the first row |
    /// | [`DtwError::InvalidWidth`] | Rows are zero-width |
    /// | [`DtwError::NonFiniteValue`] | Any value is NaN or infinite |
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, DtwError> {
        let width = rows.first().map_or(1, Vec::len);
        let mut values = Vec::with_capacity(rows.len() * width);
        for (row, r) in rows.into_iter().enumerate() {
            if r.len() != width {
                return Err(DtwError::RaggedRows {
                    row,
                    expected: width,
                    got: r.len(),
                });
            }
            values.extend(r);
        }
        Self::new(values, width)
    }

    /// Build a sequence from data that is already known to be valid.
    pub(crate) fn from_raw(values: Vec<f64>, width: usize) -> Self {
        debug_assert!(width > 0 && values.len() % width == 0);
        Self { values, width }
    }

    /// Borrow this sequence as a zero-copy view.
    #[must_use]
    pub fn as_view(&self) -> SequenceView<'_> {
        SequenceView {
            values: &self.values,
            width: self.width,
        }
    }

    /// Return the number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len() / self.width
    }

    /// Return true if the sequence has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Return the number of values per element.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Return the flat value buffer.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Consume and return the flat value buffer.
    #[must_use]
    pub fn into_inner(self) -> Vec<f64> {
        self.values
    }
}

impl TryFrom<Vec<f64>> for Sequence {
    type Error = DtwError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        Self::scalar(values)
    }
}

/// Borrowed, validated view into a sequence.
#[derive(Debug, Clone, Copy)]
pub struct SequenceView<'a> {
    values: &'a [f64],
    width: usize,
}

impl<'a> SequenceView<'a> {
    /// Create a view over a flat buffer of elements of the given width.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::InvalidWidth`] | `width` is zero or does not divide `values.len()` |
    /// | [`DtwError::NonFiniteValue`] | Any value is NaN or infinite |
    pub fn new(values: &'a [f64], width: usize) -> Result<Self, DtwError> {
        validate(values, width)?;
        Ok(Self { values, width })
    }

    /// Create a view of scalar elements.
    ///
    /// # Errors
    ///
    /// Returns [`DtwError::NonFiniteValue`] if any value is NaN or infinite.
    pub fn scalar(values: &'a [f64]) -> Result<Self, DtwError> {
        Self::new(values, 1)
    }

    /// Return element `k` as a slice of `width` values.
    ///
    /// # Panics
    ///
    /// Panics if `k >= self.len()`.
    #[must_use]
    pub fn element(&self, k: usize) -> &'a [f64] {
        &self.values[k * self.width..(k + 1) * self.width]
    }

    /// Iterate over the elements in order.
    pub fn iter(&self) -> std::slice::ChunksExact<'a, f64> {
        self.values.chunks_exact(self.width)
    }

    /// Return the flat value buffer.
    #[must_use]
    pub fn as_slice(&self) -> &'a [f64] {
        self.values
    }

    /// Return the number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len() / self.width
    }

    /// Return true if the view has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Return the number of values per element.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }
}

impl<'a> Index<usize> for SequenceView<'a> {
    type Output = [f64];

    fn index(&self, k: usize) -> &Self::Output {
        self.element(k)
    }
}
