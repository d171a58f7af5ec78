// Clippy allows for the whole crate
#![allow(clippy::too_many_arguments)]

//! Manhattan-plot binning for genome-wide association results.
//!
//! This library turns a genome-ordered EPACTS result table into a small
//! JSON document a browser can draw as a Manhattan plot: the most
//! significant variants are kept individually, and everything else is
//! folded into fixed-width genomic bins of grid-snapped -log10(p) values.
//!
//! # Features
//!
//! - **Bounded output**: at most `max_unbinned + 1` individual points
//! - **Streaming I/O**: two passes over the input, never held in memory
//! - **Transparent decompression**: gzip and bgzip inputs are detected
//! - **Atomic output**: no partially written file is ever visible
//!
//! # Example
//!
//! ```rust,no_run
//! use manhattan_bins::{commands::ManhattanCommand, config::BinningConfig};
//!
//! let cmd = ManhattanCommand::new().with_config(BinningConfig::new().with_max_unbinned(2000));
//! let stats = cmd.run("results.epacts.gz", "manhattan.json").unwrap();
//! println!("{}", stats);
//! ```

pub mod commands;
pub mod config;
pub mod epacts;
pub mod rounding;
pub mod streaming;
pub mod variant;

// Re-export commonly used types
pub use config::BinningConfig;
pub use epacts::{parse_variants, ErrorCategory, Result, VariantError, VariantReader};
pub use variant::{MarkerId, VariantRecord};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::commands::{ExtentCompressor, ManhattanCommand, ThresholdSelector};
    pub use crate::config::BinningConfig;
    pub use crate::epacts::{VariantError, VariantReader};
    pub use crate::streaming::{FileSource, ManhattanResult, MemorySource, VariantSource};
    pub use crate::variant::{MarkerId, VariantRecord};
}
