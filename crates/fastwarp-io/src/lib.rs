//! File I/O, validation, and serialization for fastwarp.

mod domain;
mod error;
mod reader;
mod writer;

pub use domain::{RunName, SeriesId, SeriesTable};
pub use error::IoError;
pub use reader::{SequenceReader, SeriesTableReader};
pub use writer::{PairCost, ResultWriter, RunSettings};
