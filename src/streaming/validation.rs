//! Sort validation for the ordered variant stream.
//!
//! Both passes rely on genome-ordered input. The validator checks, as
//! records are produced, that:
//! 1. All records for a chromosome are contiguous (no interleaving)
//! 2. Within a chromosome, positions are non-decreasing
//!
//! Any consistent chromosome order is accepted (1, 2, ..., X or 1, 10, 2, ...).

use crate::epacts::{Result, VariantError};
use log::debug;
use rustc_hash::FxHashSet;

/// Inline sort validator for use within streaming loops.
#[derive(Debug, Default)]
pub struct SortValidator {
    prev_chrom: Option<String>,
    prev_pos: u64,
    finished_chroms: FxHashSet<String>,
    record_count: usize,
}

impl SortValidator {
    /// Create a new sort validator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate that a record at `line` keeps the stream sorted.
    #[inline]
    pub fn validate(&mut self, chrom: &str, pos: u64, line: usize) -> Result<()> {
        self.record_count += 1;

        match self.prev_chrom {
            Some(ref pc) if pc == chrom => {
                if pos < self.prev_pos {
                    return Err(VariantError::Unsorted(format!(
                        "position {} at line {} comes after {} on chromosome '{}'",
                        pos, line, self.prev_pos, chrom
                    )));
                }
            }
            _ => {
                if self.finished_chroms.contains(chrom) {
                    return Err(VariantError::Unsorted(format!(
                        "chromosome '{}' at line {} was seen earlier (chromosomes must be contiguous)",
                        chrom, line
                    )));
                }
                if let Some(pc) = self.prev_chrom.take() {
                    debug!("Finished chromosome '{}' before line {}", pc, line);
                    self.finished_chroms.insert(pc);
                }
                debug!("Chromosome '{}' starts at line {}", chrom, line);
                self.prev_chrom = Some(chrom.to_string());
            }
        }

        self.prev_pos = pos;
        Ok(())
    }

    /// Get the number of records validated.
    pub fn record_count(&self) -> usize {
        self.record_count
    }

    /// Number of distinct chromosomes seen so far.
    pub fn chrom_count(&self) -> usize {
        self.finished_chroms.len() + usize::from(self.prev_chrom.is_some())
    }
}
