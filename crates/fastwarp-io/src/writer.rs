//! JSON result writer for alignment and pairwise outputs.

use std::fs;
use std::path::{Path, PathBuf};

use fastwarp_dtw::Alignment;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::{RunName, SeriesId};

/// Search settings recorded alongside each artifact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RunSettings<'a> {
    /// FastDTW radius, or `None` for exact DTW.
    pub radius: Option<usize>,
    /// Metric label, e.g. `"manhattan"` or `"pnorm(2)"`.
    pub metric: &'a str,
}

/// One unordered pair of a pairwise run, by index into the table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairCost {
    /// Index of the later series.
    pub i: usize,
    /// Index of the earlier series (`j < i`).
    pub j: usize,
    /// Alignment cost between the two series.
    pub cost: f64,
}

/// Writes alignment and pairwise results to JSON files.
///
/// Creates the output directory on construction if it does not exist.
/// Output files are named `{run}_alignment.json` and `{run}_pairwise.json`.
pub struct ResultWriter {
    output_dir: PathBuf,
    run: RunName,
}

impl ResultWriter {
    /// Create a new writer targeting the given directory and run name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display(), run = %run))]
    pub fn new(output_dir: &Path, run: RunName) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            run,
        })
    }

    /// Path of the alignment artifact for this run.
    #[must_use]
    pub fn alignment_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}_alignment.json", self.run.as_str()))
    }

    /// Path of the pairwise artifact for this run.
    #[must_use]
    pub fn pairwise_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}_pairwise.json", self.run.as_str()))
    }

    /// Write one alignment to `{run}_alignment.json`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::Serialize`] | The artifact cannot be encoded |
    /// | [`IoError::WriteFile`] | The file cannot be written |
    #[instrument(skip_all)]
    pub fn write_alignment(
        &self,
        len_x: usize,
        len_y: usize,
        settings: RunSettings<'_>,
        alignment: &Alignment,
    ) -> Result<PathBuf, IoError> {
        let path = self.alignment_path();
        let artifact = AlignmentArtifact {
            run: self.run.as_str(),
            settings,
            len_x,
            len_y,
            cost: alignment.cost.value(),
            path: alignment.path.to_pairs(),
        };
        write_json(&path, &artifact)?;
        info!(path = %path.display(), "alignment result written");
        Ok(path)
    }

    /// Write pairwise costs to `{run}_pairwise.json`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::Serialize`] | The artifact cannot be encoded |
    /// | [`IoError::WriteFile`] | The file cannot be written |
    #[instrument(skip_all, fields(n_pairs = pairs.len()))]
    pub fn write_pairwise(
        &self,
        ids: &[SeriesId],
        settings: RunSettings<'_>,
        pairs: &[PairCost],
    ) -> Result<PathBuf, IoError> {
        let path = self.pairwise_path();
        let artifact = PairwiseArtifact {
            run: self.run.as_str(),
            settings,
            ids: ids.iter().map(SeriesId::as_str).collect(),
            pairs: pairs
                .iter()
                .map(|p| PairEntry {
                    a: ids[p.i].as_str(),
                    b: ids[p.j].as_str(),
                    cost: p.cost,
                })
                .collect(),
        };
        write_json(&path, &artifact)?;
        info!(path = %path.display(), "pairwise result written");
        Ok(path)
    }
}

fn write_json<T: Serialize>(path: &Path, artifact: &T) -> Result<(), IoError> {
    let json = serde_json::to_string_pretty(artifact)?;
    fs::write(path, json).map_err(|e| IoError::WriteFile {
        path: path.to_path_buf(),
        source: e,
    })
}

#[derive(Serialize)]
struct AlignmentArtifact<'a> {
    run: &'a str,
    settings: RunSettings<'a>,
    len_x: usize,
    len_y: usize,
    cost: f64,
    path: Vec<(usize, usize)>,
}

#[derive(Serialize)]
struct PairwiseArtifact<'a> {
    run: &'a str,
    settings: RunSettings<'a>,
    ids: Vec<&'a str>,
    pairs: Vec<PairEntry<'a>>,
}

#[derive(Serialize)]
struct PairEntry<'a> {
    a: &'a str,
    b: &'a str,
    cost: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use fastwarp_dtw::{FastDtw, Sequence};
    use tempfile::TempDir;

    #[test]
    fn creates_nested_output_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let run = RunName::new("nested".into()).unwrap();
        ResultWriter::new(&nested, run).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn alignment_artifact_fields() {
        let dir = TempDir::new().unwrap();
        let writer = ResultWriter::new(dir.path(), RunName::new("ramp".into()).unwrap()).unwrap();

        let x = Sequence::scalar(vec![1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        let y = Sequence::scalar(vec![2.0, 3.0, 4.0]).unwrap();
        let alignment = FastDtw::default().align(x.as_view(), y.as_view()).unwrap();
        let settings = RunSettings {
            radius: Some(1),
            metric: "manhattan",
        };
        let path = writer.write_alignment(5, 3, settings, &alignment).unwrap();
        assert_eq!(path, dir.path().join("ramp_alignment.json"));

        let content: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(content["run"], "ramp");
        assert_eq!(content["cost"].as_f64().unwrap(), 2.0);
        assert_eq!(content["settings"]["radius"].as_u64().unwrap(), 1);
        assert_eq!(content["path"][2], serde_json::json!([2, 1]));
        assert_eq!(content["path"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn exact_runs_record_null_radius() {
        let dir = TempDir::new().unwrap();
        let writer = ResultWriter::new(dir.path(), RunName::new("exact".into()).unwrap()).unwrap();
        let ids = vec![SeriesId::new("p".into()), SeriesId::new("q".into())];
        let settings = RunSettings {
            radius: None,
            metric: "pnorm(2)",
        };
        let pairs = [PairCost { i: 1, j: 0, cost: 0.5 }];
        let path = writer.write_pairwise(&ids, settings, &pairs).unwrap();

        let content: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(content["settings"]["radius"].is_null());
        assert_eq!(content["pairs"][0]["a"], "q");
        assert_eq!(content["pairs"][0]["b"], "p");
        assert_eq!(content["pairs"][0]["cost"].as_f64().unwrap(), 0.5);
    }
}
