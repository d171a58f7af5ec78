//! Adaptive p-value threshold (pass 1).
//!
//! Variants with a p-value below the threshold are drawn individually.
//! The threshold starts at a fixed floor and is lowered whenever more than
//! `max_unbinned` variants would fall below it.
//!
//! # Algorithm
//!
//! Bounded k-smallest selection with k = `max_unbinned + 1`:
//! 1. Push p-values onto a max-heap until it holds k of them
//! 2. After that, a smaller p-value replaces the heap top
//! 3. After the pass the heap top is the largest of the k smallest p-values
//!
//! # Memory Complexity
//!
//! O(k) regardless of input size; O(n log k) time.

use crate::config::BinningConfig;
use crate::epacts::{Result, VariantError, VariantReader};
use crate::rounding::OrderedF64;
use std::collections::BinaryHeap;
use std::io::BufRead;

/// Pass-1 command: scans the stream once and picks the binning threshold.
#[derive(Debug, Clone)]
pub struct ThresholdSelector {
    /// Fixed p-value floor.
    pub bin_threshold: f64,
    /// Maximum number of variants kept individually.
    pub max_unbinned: usize,
}

impl Default for ThresholdSelector {
    fn default() -> Self {
        Self::from_config(&BinningConfig::default())
    }
}

impl ThresholdSelector {
    pub fn new(bin_threshold: f64, max_unbinned: usize) -> Self {
        Self {
            bin_threshold,
            max_unbinned,
        }
    }

    pub fn from_config(config: &BinningConfig) -> Self {
        Self::new(config.bin_threshold, config.max_unbinned)
    }

    /// Number of smallest p-values tracked.
    ///
    /// The largest of them sits at the boundary and ends up binned.
    #[inline]
    pub fn k(&self) -> usize {
        self.max_unbinned.saturating_add(1)
    }

    /// Select the threshold from an iterator of p-values.
    pub fn select_from_pvals<I>(&self, pvals: I) -> Result<ThresholdSelection>
    where
        I: IntoIterator<Item = f64>,
    {
        let k = self.k();
        let mut heap: BinaryHeap<OrderedF64> = BinaryHeap::with_capacity(k.min(1 << 16) + 1);
        let mut records = 0usize;

        for pval in pvals {
            records += 1;
            offer(&mut heap, k, pval);
        }

        self.finish(heap, records)
    }

    /// Run pass 1 over a freshly opened stream.
    pub fn run<R: BufRead>(&self, mut reader: VariantReader<R>) -> Result<ThresholdSelection> {
        let k = self.k();
        let mut heap: BinaryHeap<OrderedF64> = BinaryHeap::with_capacity(k.min(1 << 16) + 1);

        while let Some(rec) = reader.read_record()? {
            offer(&mut heap, k, rec.pval);
        }

        self.finish(heap, reader.record_count())
    }

    fn finish(&self, heap: BinaryHeap<OrderedF64>, records: usize) -> Result<ThresholdSelection> {
        let largest_selected = heap.peek().map(|v| v.0).ok_or(VariantError::EmptyInput)?;

        // With fewer than k p-values the cap cannot be exceeded; the floor stands.
        let capped = heap.len() >= self.k();
        let threshold = if capped {
            self.bin_threshold.min(largest_selected)
        } else {
            self.bin_threshold
        };

        Ok(ThresholdSelection {
            threshold,
            largest_selected,
            capped,
            records,
        })
    }
}

/// Keep `pval` if it is among the `k` smallest seen so far.
#[inline]
fn offer(heap: &mut BinaryHeap<OrderedF64>, k: usize, pval: f64) {
    if heap.len() < k {
        heap.push(OrderedF64(pval));
    } else if let Some(mut top) = heap.peek_mut() {
        if pval < top.0 {
            *top = OrderedF64(pval);
        }
    }
}

/// Outcome of pass 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdSelection {
    /// Effective threshold: p-values strictly below it are kept unbinned.
    pub threshold: f64,
    /// Largest of the k smallest p-values (the largest p-value present when
    /// the input holds fewer than k).
    pub largest_selected: f64,
    /// True when the input had at least k p-values.
    pub capped: bool,
    /// Number of records scanned.
    pub records: usize,
}

impl ThresholdSelection {
    /// True if the adaptive cap lowered the threshold below the floor.
    pub fn tightened(&self, floor: f64) -> bool {
        self.threshold < floor
    }
}
