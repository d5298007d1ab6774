//! FastDTW: approximate dynamic time warping in linear time and memory.
//!
//! Pure math library, zero I/O. Provides sequence types for scalar and
//! vector-valued elements, pluggable element metrics, an exact or
//! window-constrained DTW solver, and the multiresolution FastDTW driver
//! that coarsens both inputs, solves the coarsest pair exactly, and refines
//! the path inside a projected window at each finer level.

mod coarsen;
mod distance;
mod error;
mod fastdtw;
mod metric;
mod path;
mod sequence;
mod solver;
mod window;

pub use coarsen::reduce_by_half;
pub use distance::DtwDistance;
pub use error::DtwError;
pub use fastdtw::{FastDtw, fastdtw};
pub use metric::{DistanceFn, Metric};
pub use path::{Alignment, WarpingPath, WarpingStep};
pub use sequence::{Sequence, SequenceView};
pub use solver::dtw;
pub use window::{Window, expand_window};
