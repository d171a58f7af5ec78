//! Binning parameters for a Manhattan summary run.
//!
//! The defaults reproduce the layout the browser plot was tuned for:
//! 3 Mb genomic windows, a 0.05 grid on -log10(p), and at most 5000
//! individually drawn points below a 1e-4 floor.

use crate::epacts::{Result, VariantError};

/// Default genomic window width in base pairs.
pub const DEFAULT_BIN_LENGTH: u64 = 3_000_000;

/// Default grid step for -log10(p) values (0.05, 0.10, 0.15, ...).
pub const DEFAULT_NEGLOG10_BIN_SIZE: f64 = 0.05;

/// Default number of decimal digits kept after snapping to the grid.
pub const DEFAULT_NEGLOG10_BIN_DIGITS: i32 = 2;

/// Default p-value floor: anything smaller is never binned.
pub const DEFAULT_BIN_THRESHOLD: f64 = 1e-4;

/// Default cap on the number of unbinned points.
///
/// Browsers struggle to draw many more individual points than this.
pub const DEFAULT_MAX_UNBINNED: usize = 5000;

/// Configuration shared by the threshold selector and the binner.
#[derive(Debug, Clone, PartialEq)]
pub struct BinningConfig {
    /// Width of each genomic bin.
    pub bin_length: u64,
    /// Grid step applied to -log10(p) before deduplication.
    pub neglog10_bin_size: f64,
    /// Decimal digits kept on grid values.
    pub neglog10_bin_digits: i32,
    /// Fixed p-value floor. The adaptive threshold may only lower it.
    pub bin_threshold: f64,
    /// Maximum number of variants kept individually.
    pub max_unbinned: usize,
}

impl Default for BinningConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl BinningConfig {
    pub fn new() -> Self {
        Self {
            bin_length: DEFAULT_BIN_LENGTH,
            neglog10_bin_size: DEFAULT_NEGLOG10_BIN_SIZE,
            neglog10_bin_digits: DEFAULT_NEGLOG10_BIN_DIGITS,
            bin_threshold: DEFAULT_BIN_THRESHOLD,
            max_unbinned: DEFAULT_MAX_UNBINNED,
        }
    }

    /// Set the genomic bin width.
    pub fn with_bin_length(mut self, bin_length: u64) -> Self {
        self.bin_length = bin_length;
        self
    }

    /// Set the -log10(p) grid step.
    pub fn with_neglog10_bin_size(mut self, size: f64) -> Self {
        self.neglog10_bin_size = size;
        self
    }

    /// Set the number of decimal digits kept on grid values.
    pub fn with_neglog10_bin_digits(mut self, digits: i32) -> Self {
        self.neglog10_bin_digits = digits;
        self
    }

    /// Set the fixed p-value floor.
    pub fn with_bin_threshold(mut self, threshold: f64) -> Self {
        self.bin_threshold = threshold;
        self
    }

    /// Set the cap on unbinned points.
    pub fn with_max_unbinned(mut self, max_unbinned: usize) -> Self {
        self.max_unbinned = max_unbinned;
        self
    }

    /// Largest gap between neighbouring grid values that still joins them
    /// into one extent. The 10% slack absorbs rounding at exact grid spacing.
    #[inline]
    pub fn extent_gap(&self) -> f64 {
        self.neglog10_bin_size * 1.1
    }

    /// Reject parameter combinations that cannot produce a usable summary.
    pub fn validate(&self) -> Result<()> {
        if self.bin_length == 0 {
            return Err(VariantError::InvalidConfig(
                "bin length must be greater than zero".to_string(),
            ));
        }
        if !(self.neglog10_bin_size.is_finite() && self.neglog10_bin_size > 0.0) {
            return Err(VariantError::InvalidConfig(format!(
                "-log10(p) bin size must be a positive number, got {}",
                self.neglog10_bin_size
            )));
        }
        if !(0..=15).contains(&self.neglog10_bin_digits) {
            return Err(VariantError::InvalidConfig(format!(
                "-log10(p) digits must be between 0 and 15, got {}",
                self.neglog10_bin_digits
            )));
        }
        if !(self.bin_threshold > 0.0 && self.bin_threshold <= 1.0) {
            return Err(VariantError::InvalidConfig(format!(
                "bin threshold must be in (0, 1], got {}",
                self.bin_threshold
            )));
        }
        Ok(())
    }
}
