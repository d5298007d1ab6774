//! Domain types for fastwarp-io.

use fastwarp_dtw::Sequence;

use crate::IoError;

/// A series identifier from the first column of a series table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeriesId(String);

impl SeriesId {
    pub(crate) fn new(id: String) -> Self {
        Self(id)
    }

    /// Return the series ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SeriesId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated run name used to name output files.
///
/// Must match `[a-zA-Z0-9_-]+`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunName(String);

impl RunName {
    /// Parse and validate a run name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidRunName`] if the name is empty or contains
    /// characters outside `[a-zA-Z0-9_-]`.
    pub fn new(name: String) -> Result<Self, IoError> {
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(IoError::InvalidRunName { name });
        }
        Ok(Self(name))
    }

    /// Return the run name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RunName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Scalar series read from a table, one per row.
///
/// `ids[i]` names `series[i]`. Series may differ in length.
#[derive(Debug)]
pub struct SeriesTable {
    /// Series identifiers in file order.
    pub ids: Vec<SeriesId>,
    /// Validated, non-empty series in the same order as `ids`.
    pub series: Vec<Sequence>,
}

impl SeriesTable {
    /// Return the number of series.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Return true if the table holds no series.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
