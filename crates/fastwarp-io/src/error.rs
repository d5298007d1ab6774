//! I/O error types for fastwarp-io.

use std::path::PathBuf;

use fastwarp_dtw::DtwError;

/// Errors from file I/O, CSV parsing, and result serialization.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when the input file does not exist or is unreadable.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the CSV parser encounters a malformed record.
    #[error("CSV parse error in {path} at byte offset {offset}")]
    CsvParse {
        /// Path to the CSV file.
        path: PathBuf,
        /// Byte offset where the error occurred.
        offset: u64,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when a series table has a header but zero data rows.
    #[error("empty dataset (no data rows) in {path}")]
    EmptyDataset {
        /// Path to the CSV file.
        path: PathBuf,
    },

    /// Returned when a row has a different number of columns than expected.
    #[error("inconsistent row length in {path}: row {row_index} has {got} columns, expected {expected}")]
    InconsistentRowLength {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index (excluding any header).
        row_index: usize,
        /// Expected number of columns.
        expected: usize,
        /// Actual number of columns in this row.
        got: usize,
    },

    /// Returned when a cell value is NaN, Inf, or otherwise not a finite float.
    #[error("non-finite value in {path}: row {row_index}, column {col_index}, raw value \"{raw}\"")]
    NonFiniteValue {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index (excluding any header).
        row_index: usize,
        /// Zero-based column index of the value.
        col_index: usize,
        /// The raw string value that failed to parse.
        raw: String,
    },

    /// Returned when a series table row has an ID but no values.
    #[error("series \"{series_id}\" in {path} (row {row_index}) has no values")]
    EmptySeries {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// ID of the empty series.
        series_id: String,
    },

    /// Returned when the same series ID appears more than once.
    #[error("duplicate series ID \"{series_id}\" in {path}: first at row {first_row}, again at row {second_row}")]
    DuplicateSeriesId {
        /// Path to the CSV file.
        path: PathBuf,
        /// The duplicated series ID.
        series_id: String,
        /// Zero-based row index of the first occurrence.
        first_row: usize,
        /// Zero-based row index of the second occurrence.
        second_row: usize,
    },

    /// Returned when the run name contains characters outside `[a-zA-Z0-9_-]`.
    #[error("invalid run name \"{name}\": must match [a-zA-Z0-9_-]+")]
    InvalidRunName {
        /// The invalid name.
        name: String,
    },

    /// Returned when the output directory cannot be created.
    #[error("cannot create output directory {path}")]
    OutputDirCreate {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a result file cannot be written.
    #[error("cannot write file {path}")]
    WriteFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a result artifact cannot be serialized.
    #[error("cannot serialize result artifact")]
    Serialize(#[from] serde_json::Error),

    /// Wraps a sequence validation error.
    #[error("invalid sequence: {0}")]
    Dtw(#[from] DtwError),
}
