//! Two-pass Manhattan summary over EPACTS results.
//!
//! # Algorithm
//!
//! 1. Open the source and select the binning threshold (pass 1)
//! 2. Re-open the source and split variants into unbinned points and
//!    bins (pass 2)
//! 3. Compress each bin's grid values into values and extents
//! 4. Assemble the result and write it atomically
//!
//! Pass 1 drops its reader before pass 2 opens a new one. Only the
//! threshold is carried between them.
//!
//! # Requirements
//!
//! Input MUST be grouped by chromosome and sorted by position within each.

use crate::commands::binning::Binner;
use crate::commands::threshold::{ThresholdSelection, ThresholdSelector};
use crate::config::BinningConfig;
use crate::epacts::{Result, VariantError};
use crate::streaming::output::ManhattanResult;
use crate::streaming::source::{FileSource, VariantSource};
use log::{info, warn};
use std::path::Path;

/// Manhattan summary command configuration.
#[derive(Debug, Clone, Default)]
pub struct ManhattanCommand {
    pub config: BinningConfig,
    /// Pretty-print the JSON output.
    pub pretty: bool,
}

impl ManhattanCommand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: BinningConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Build the summary from any re-openable source.
    pub fn summarize<S: VariantSource + ?Sized>(
        &self,
        source: &S,
    ) -> Result<(ManhattanResult, ManhattanStats)> {
        self.config.validate()?;
        let mut stats = ManhattanStats::default();

        info!("Pass 1: selecting threshold over {}", source.describe());
        let selection = ThresholdSelector::from_config(&self.config).run(source.variants()?)?;
        stats.record_selection(&selection);
        if selection.tightened(self.config.bin_threshold) {
            warn!(
                "More than {} variants below {:e}; threshold lowered to {:e}",
                self.config.max_unbinned, self.config.bin_threshold, selection.threshold
            );
        } else {
            info!("Binning threshold: {:e}", selection.threshold);
        }

        info!("Pass 2: binning {}", source.describe());
        let mut reader = source.variants()?;
        let mut binner = Binner::new(self.config.clone(), selection.threshold);
        while let Some(rec) = reader.read_record()? {
            binner.push(rec)?;
        }
        stats.records_pass2 = reader.record_count();
        stats.dropped_na = reader.dropped_count();
        stats.chromosomes = reader.chrom_count();
        drop(reader);

        let raw = binner.finish();
        stats.raw_bins = raw.bins.len();
        let (variant_bins, unbinned_variants) = raw.finalize();

        stats.bins = variant_bins.len();
        stats.unbinned = unbinned_variants.len();
        stats.bin_values = variant_bins.iter().map(|b| b.neglog10_pvals.len()).sum();
        stats.bin_extents = variant_bins
            .iter()
            .map(|b| b.neglog10_pval_extents.len())
            .sum();

        Ok((
            ManhattanResult {
                variant_bins,
                unbinned_variants,
            },
            stats,
        ))
    }

    /// Summarise an EPACTS file and write the JSON document to `output_path`.
    ///
    /// Checks that the input exists and the output directory exists before
    /// reading anything. Nothing is written unless every step succeeds.
    pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_path: P,
        output_path: Q,
    ) -> Result<ManhattanStats> {
        let output_path = output_path.as_ref();
        let source = FileSource::new(input_path)?;
        check_output_dir(output_path)?;

        let (result, stats) = self.summarize(&source)?;
        result.write_json_atomic(output_path, self.pretty)?;
        Ok(stats)
    }
}

/// Fail early if the output path's parent directory is missing.
pub fn check_output_dir(output_path: &Path) -> Result<()> {
    let absolute = std::path::absolute(output_path)?;
    match absolute.parent() {
        Some(dir) if dir.is_dir() => Ok(()),
        Some(dir) => Err(VariantError::NotFound(dir.to_path_buf())),
        None => Err(VariantError::NotFound(absolute)),
    }
}

/// Statistics from a Manhattan summary run.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ManhattanStats {
    /// Records read in pass 1
    pub records_pass1: usize,
    /// Records read in pass 2
    pub records_pass2: usize,
    /// Rows dropped for missing PVALUE and BETA
    pub dropped_na: usize,
    /// Distinct chromosomes
    pub chromosomes: usize,
    /// Effective binning threshold
    pub threshold: f64,
    /// Largest of the k smallest p-values
    pub largest_selected: f64,
    /// Bins opened during pass 2
    pub raw_bins: usize,
    /// Bins written
    pub bins: usize,
    /// Bare grid values written across all bins
    pub bin_values: usize,
    /// Extents written across all bins
    pub bin_extents: usize,
    /// Variants written individually
    pub unbinned: usize,
}

impl ManhattanStats {
    fn record_selection(&mut self, selection: &ThresholdSelection) {
        self.records_pass1 = selection.records;
        self.threshold = selection.threshold;
        self.largest_selected = selection.largest_selected;
    }

    /// Output points per input record.
    pub fn compression_ratio(&self) -> f64 {
        let written = self.unbinned + self.bin_values + self.bin_extents;
        if written == 0 {
            0.0
        } else {
            self.records_pass2 as f64 / written as f64
        }
    }
}

impl std::fmt::Display for ManhattanStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Read: {} ({} NA dropped, {} chromosomes), Threshold: {:e}, Unbinned: {}, Bins: {} ({} values, {} extents), Compression: {:.2}x",
            self.records_pass2,
            self.dropped_na,
            self.chromosomes,
            self.threshold,
            self.unbinned,
            self.bins,
            self.bin_values,
            self.bin_extents,
            self.compression_ratio()
        )
    }
}
