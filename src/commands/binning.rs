//! Spatial/statistical binning (pass 2).
//!
//! Variants below the threshold are kept individually. Everything else is
//! reduced to its grid-snapped -log10(p) and collected into fixed-width
//! genomic bins.
//!
//! # Algorithm
//!
//! For sorted input:
//! 1. A variant below the threshold becomes an unbinned point
//! 2. Otherwise, on a new chromosome, open a bin starting at its position
//! 3. On the same chromosome past `start + bin_length`, open the next bin at
//!    `start + bin_length` (tiling forward, not snapping to the variant)
//! 4. Add the variant's grid value to the current bin's ordered set
//!
//! Bins are anchored at each chromosome's first binned variant, not at
//! coordinate 0, so a different threshold can shift bin boundaries.
//!
//! # Memory Complexity
//!
//! O(bins + unbinned points); each bin holds at most one entry per grid value.

use crate::commands::extents::ExtentCompressor;
use crate::config::BinningConfig;
use crate::epacts::{Result, VariantError};
use crate::rounding::{round_sig, rounded_neglog10, OrderedF64};
use crate::streaming::output::{UnbinnedVariant, VariantBin};
use crate::variant::VariantRecord;
use log::debug;
use std::collections::BTreeSet;

/// A bin that is still accepting values.
#[derive(Debug, Clone, PartialEq)]
pub struct RawBin {
    pub chrom: String,
    /// First position of the window.
    pub start: u64,
    /// Last position of the window, inclusive.
    pub end: u64,
    /// Grid values seen in the window, ascending and distinct.
    pub neglog10_pvals: BTreeSet<OrderedF64>,
}

impl RawBin {
    /// Open a window of `bin_length` at `start`; fails if it would run past `u64::MAX`.
    fn open(chrom: &str, start: u64, bin_length: u64) -> Result<Self> {
        let end = start
            .checked_add(bin_length)
            .ok_or_else(|| VariantError::PositionOverflow {
                chrom: chrom.to_string(),
                pos: start,
                bin_length,
            })?;
        Ok(Self {
            chrom: chrom.to_string(),
            start,
            end,
            neglog10_pvals: BTreeSet::new(),
        })
    }

    /// Center of the window.
    #[inline]
    pub fn center(&self) -> u64 {
        self.start + (self.end - self.start) / 2
    }
}

/// Pass-2 command: splits the stream into unbinned points and raw bins.
#[derive(Debug, Clone)]
pub struct Binner {
    config: BinningConfig,
    threshold: f64,
    bins: Vec<RawBin>,
    unbinned: Vec<UnbinnedVariant>,
}

impl Binner {
    /// Create a binner that keeps p-values strictly below `threshold`.
    pub fn new(config: BinningConfig, threshold: f64) -> Self {
        Self {
            config,
            threshold,
            bins: Vec::new(),
            unbinned: Vec::new(),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Route one record to the unbinned list or the current bin.
    ///
    /// Fails if a bin opened for the record would end past `u64::MAX`.
    pub fn push(&mut self, variant: VariantRecord) -> Result<()> {
        if variant.pval < self.threshold {
            self.unbinned.push(unbinned_point(variant));
            return Ok(());
        }

        let next_start = match self.bins.last() {
            Some(bin) if bin.chrom != variant.chrom => Some(variant.pos),
            Some(bin) if variant.pos > bin.end => Some(bin.end),
            Some(_) => None,
            None => Some(variant.pos),
        };
        if let Some(start) = next_start {
            debug!("Opening bin {}:{}", variant.chrom, start);
            self.bins
                .push(RawBin::open(&variant.chrom, start, self.config.bin_length)?);
        }

        let value = rounded_neglog10(
            variant.pval,
            self.config.neglog10_bin_size,
            self.config.neglog10_bin_digits,
        );
        if let Some(bin) = self.bins.last_mut() {
            bin.neglog10_pvals.insert(OrderedF64(value));
        }
        Ok(())
    }

    /// Close the pass and hand back everything collected.
    pub fn finish(self) -> BinnedVariants {
        BinnedVariants {
            config: self.config,
            bins: self.bins,
            unbinned: self.unbinned,
        }
    }
}

/// Round an individually kept variant's statistics for display.
pub fn unbinned_point(variant: VariantRecord) -> UnbinnedVariant {
    UnbinnedVariant {
        chrom: variant.chrom,
        pos: variant.pos,
        ref_allele: variant.ref_allele,
        alt: variant.alt_allele,
        maf: round_sig(variant.maf, 3),
        pval: round_sig(variant.pval, 2),
        beta: round_sig(variant.beta, 2),
        sebeta: round_sig(variant.sebeta, 2),
    }
}

/// Output of pass 2, before extent compression.
#[derive(Debug, Clone)]
pub struct BinnedVariants {
    config: BinningConfig,
    pub bins: Vec<RawBin>,
    pub unbinned: Vec<UnbinnedVariant>,
}

impl BinnedVariants {
    /// Compress every bin and drop the empty ones.
    ///
    /// Runs only after the whole pass: a bin's value set is not final until
    /// the stream has moved past it.
    pub fn finalize(self) -> (Vec<VariantBin>, Vec<UnbinnedVariant>) {
        let compressor = ExtentCompressor::from_config(&self.config);

        let bins = self
            .bins
            .into_iter()
            .filter(|bin| !bin.neglog10_pvals.is_empty())
            .map(|bin| {
                let compressed = compressor.compress(&bin.neglog10_pvals);
                let pos = bin.center();
                VariantBin {
                    chrom: bin.chrom,
                    pos,
                    neglog10_pvals: compressed.values,
                    neglog10_pval_extents: compressed.extents,
                }
            })
            .collect();

        (bins, self.unbinned)
    }
}
