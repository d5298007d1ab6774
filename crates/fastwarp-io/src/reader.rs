//! CSV readers for single sequences and tables of scalar series.

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use fastwarp_dtw::Sequence;
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::{SeriesId, SeriesTable};

fn open_csv(path: &Path, has_headers: bool) -> Result<csv::Reader<File>, IoError> {
    let file = File::open(path).map_err(|e| IoError::FileNotFound {
        path: path.to_path_buf(),
        source: e,
    })?;
    // flexible(true) so that our own InconsistentRowLength check fires
    // instead of a low-level CsvParse error.
    Ok(csv::ReaderBuilder::new()
        .has_headers(has_headers)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file))
}

fn csv_error(path: &Path, e: csv::Error) -> IoError {
    IoError::CsvParse {
        path: path.to_path_buf(),
        offset: e.position().map_or(0, |p| p.byte()),
        source: e,
    }
}

fn parse_value(path: &Path, raw: &str, row_index: usize, col_index: usize) -> Result<f64, IoError> {
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(IoError::NonFiniteValue {
            path: path.to_path_buf(),
            row_index,
            col_index,
            raw: raw.to_string(),
        }),
    }
}

/// Reads one sequence from a headerless CSV file.
///
/// Each row is one element; a row of `w` columns is an element of width `w`.
/// All rows must have the same width. An empty file is an empty sequence.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::InconsistentRowLength`] | Row width differs from the first row |
/// | [`IoError::NonFiniteValue`] | Cell is NaN, Inf, or unparseable float |
pub struct SequenceReader {
    path: PathBuf,
}

impl SequenceReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read and validate the file, returning a [`Sequence`].
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<Sequence, IoError> {
        let mut rdr = open_csv(&self.path, false)?;

        let mut width = None;
        let mut values = Vec::new();
        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| csv_error(&self.path, e))?;
            let expected = *width.get_or_insert(record.len());
            if record.len() != expected {
                return Err(IoError::InconsistentRowLength {
                    path: self.path.clone(),
                    row_index,
                    expected,
                    got: record.len(),
                });
            }
            for (col_index, raw) in record.iter().enumerate() {
                values.push(parse_value(&self.path, raw, row_index, col_index)?);
            }
        }

        let sequence = Sequence::new(values, width.unwrap_or(1))?;
        info!(len = sequence.len(), width = sequence.width(), "sequence loaded");
        Ok(sequence)
    }
}

/// Reads a table of scalar series from a CSV file with a header row.
///
/// Expected format: `id,t0,t1,...,tn`, one series per row. Trailing empty
/// cells are ignored, so series may be shorter than the header.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::EmptyDataset`] | Zero data rows after header |
/// | [`IoError::InconsistentRowLength`] | Row has more columns than the header |
/// | [`IoError::NonFiniteValue`] | Cell is NaN, Inf, unparseable, or an interior blank |
/// | [`IoError::EmptySeries`] | Row has an ID but no values |
/// | [`IoError::DuplicateSeriesId`] | Same ID appears twice |
pub struct SeriesTableReader {
    path: PathBuf,
}

impl SeriesTableReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read and validate the file, returning a [`SeriesTable`].
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<SeriesTable, IoError> {
        let mut rdr = open_csv(&self.path, true)?;
        let header = rdr.headers().map_err(|e| csv_error(&self.path, e))?;
        let max_cols = header.len();
        debug!(max_cols, "read CSV header");

        let mut ids = Vec::new();
        let mut series = Vec::new();
        let mut seen: HashMap<String, usize> = HashMap::new();

        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| csv_error(&self.path, e))?;
            if record.len() > max_cols {
                return Err(IoError::InconsistentRowLength {
                    path: self.path.clone(),
                    row_index,
                    expected: max_cols,
                    got: record.len(),
                });
            }

            let id = record.get(0).unwrap_or("").to_string();
            if let Some(&first_row) = seen.get(&id) {
                return Err(IoError::DuplicateSeriesId {
                    path: self.path.clone(),
                    series_id: id,
                    first_row,
                    second_row: row_index,
                });
            }
            seen.insert(id.clone(), row_index);

            let cells: Vec<&str> = record.iter().skip(1).collect();
            let used = cells.iter().rposition(|c| !c.is_empty()).map_or(0, |p| p + 1);
            if used == 0 {
                return Err(IoError::EmptySeries {
                    path: self.path.clone(),
                    row_index,
                    series_id: id,
                });
            }
            let values = cells[..used]
                .iter()
                .enumerate()
                .map(|(col_index, raw)| parse_value(&self.path, raw, row_index, col_index))
                .collect::<Result<Vec<f64>, IoError>>()?;

            ids.push(SeriesId::new(id));
            series.push(Sequence::scalar(values)?);
        }

        if ids.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        info!(
            n_series = ids.len(),
            max_len = series.iter().map(Sequence::len).max().unwrap_or(0),
            "series table loaded"
        );

        Ok(SeriesTable { ids, series })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn sequence_scalar_rows() {
        let f = write_csv("1.0\n2.5\n-3.0\n");
        let s = SequenceReader::new(f.path()).read().unwrap();
        assert_eq!(s.width(), 1);
        assert_eq!(s.as_slice(), &[1.0, 2.5, -3.0]);
    }

    #[test]
    fn sequence_vector_rows() {
        let f = write_csv("0.0, 1.0\n2.0, 3.0\n");
        let s = SequenceReader::new(f.path()).read().unwrap();
        assert_eq!(s.width(), 2);
        assert_eq!(s.len(), 2);
        assert_eq!(s.as_view().element(1), &[2.0, 3.0]);
    }

    #[test]
    fn sequence_empty_file() {
        let f = write_csv("");
        let s = SequenceReader::new(f.path()).read().unwrap();
        assert!(s.is_empty());
    }

    #[test]
    fn sequence_ragged_rows() {
        let f = write_csv("1.0,2.0\n3.0\n");
        let result = SequenceReader::new(f.path()).read();
        assert!(matches!(
            result,
            Err(IoError::InconsistentRowLength {
                row_index: 1,
                expected: 2,
                got: 1,
                ..
            })
        ));
    }

    #[test]
    fn sequence_non_finite() {
        let f = write_csv("1.0\nNaN\n");
        let result = SequenceReader::new(f.path()).read();
        assert!(matches!(
            result,
            Err(IoError::NonFiniteValue { row_index: 1, col_index: 0, .. })
        ));
    }

    #[test]
    fn sequence_file_not_found() {
        let result = SequenceReader::new(Path::new("/nonexistent/seq.csv")).read();
        assert!(matches!(result, Err(IoError::FileNotFound { .. })));
    }

    #[test]
    fn table_ragged_series() {
        let f = write_csv("id,t0,t1,t2\nA,1.0,2.0,3.0\nB,4.0,5.0,\n");
        let table = SeriesTableReader::new(f.path()).read().unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.ids[1].as_str(), "B");
        assert_eq!(table.series[0].as_slice(), &[1.0, 2.0, 3.0]);
        assert_eq!(table.series[1].as_slice(), &[4.0, 5.0]);
    }

    #[test]
    fn table_interior_blank_rejected() {
        let f = write_csv("id,t0,t1,t2\nA,1.0,,3.0\n");
        let result = SeriesTableReader::new(f.path()).read();
        assert!(matches!(
            result,
            Err(IoError::NonFiniteValue { col_index: 1, .. })
        ));
    }

    #[test]
    fn table_row_too_long() {
        let f = write_csv("id,t0\nA,1.0,2.0\n");
        let result = SeriesTableReader::new(f.path()).read();
        assert!(matches!(
            result,
            Err(IoError::InconsistentRowLength { row_index: 0, .. })
        ));
    }

    #[test]
    fn table_empty_series() {
        let f = write_csv("id,t0,t1\nA,,\n");
        let result = SeriesTableReader::new(f.path()).read();
        assert!(matches!(result, Err(IoError::EmptySeries { row_index: 0, .. })));
    }

    #[test]
    fn table_empty_dataset() {
        let f = write_csv("id,t0,t1\n");
        let result = SeriesTableReader::new(f.path()).read();
        assert!(matches!(result, Err(IoError::EmptyDataset { .. })));
    }

    #[test]
    fn table_duplicate_id() {
        let f = write_csv("id,t0\nA,1.0\nB,2.0\nA,3.0\n");
        let result = SeriesTableReader::new(f.path()).read();
        assert!(matches!(
            result,
            Err(IoError::DuplicateSeriesId {
                first_row: 0,
                second_row: 2,
                ..
            })
        ));
    }
}
