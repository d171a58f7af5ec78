//! Pipeline stages for building a Manhattan summary.

pub mod binning;
pub mod extents;
pub mod manhattan;
pub mod threshold;

pub use binning::{unbinned_point, BinnedVariants, Binner, RawBin};
pub use extents::{ExtentCompressor, Extents};
pub use manhattan::{check_output_dir, ManhattanCommand, ManhattanStats};
pub use threshold::{ThresholdSelection, ThresholdSelector};
