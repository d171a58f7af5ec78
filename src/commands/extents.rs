//! Collapse a bin's grid values into isolated values and contiguous extents.
//!
//! A strong association peak leaves long runs of neighbouring grid values
//! in the bins around it. Writing each run as one `[low, high]` pair instead
//! of every value is where most of the output size reduction comes from.
//!
//! # Algorithm
//!
//! For values in ascending order:
//! 1. Start a run at the first value
//! 2. If the next value is within `max_gap` of the run's end, extend the run
//! 3. Otherwise close the run and start a new one
//!
//! Runs of one value are emitted as bare values, longer runs as extents.

use crate::config::BinningConfig;
use crate::rounding::OrderedF64;
use std::collections::BTreeSet;

/// Compressed representation of one bin's value set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extents {
    /// Values with no neighbour within the gap, ascending.
    pub values: Vec<f64>,
    /// Runs of neighbouring values as `[low, high]`, ascending.
    pub extents: Vec<[f64; 2]>,
}

impl Extents {
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.extents.is_empty()
    }
}

/// Extent compressor for one grid step.
#[derive(Debug, Clone, Copy)]
pub struct ExtentCompressor {
    /// Largest gap between neighbours that still joins them into one run.
    pub max_gap: f64,
}

impl ExtentCompressor {
    pub fn new(max_gap: f64) -> Self {
        Self { max_gap }
    }

    /// Compressor for the configured grid step.
    pub fn from_config(config: &BinningConfig) -> Self {
        Self::new(config.extent_gap())
    }

    /// Compress an ordered, deduplicated value set.
    pub fn compress(&self, values: &BTreeSet<OrderedF64>) -> Extents {
        self.compress_sorted(values.iter().map(|v| v.0))
    }

    /// Compress values that are already ascending and distinct.
    pub fn compress_sorted<I>(&self, values: I) -> Extents
    where
        I: IntoIterator<Item = f64>,
    {
        let mut out = Extents::default();
        let mut run: Option<(f64, f64)> = None;

        for v in values {
            run = match run {
                Some((low, high)) if v - high <= self.max_gap => Some((low, v)),
                Some(closed) => {
                    push_run(&mut out, closed);
                    Some((v, v))
                }
                None => Some((v, v)),
            };
        }
        if let Some(closed) = run {
            push_run(&mut out, closed);
        }

        out
    }
}

#[inline]
fn push_run(out: &mut Extents, (low, high): (f64, f64)) {
    if low == high {
        out.values.push(low);
    } else {
        out.extents.push([low, high]);
    }
}
