//! Streaming reader for EPACTS single-phenotype result tables.
//!
//! The input is tab-delimited with a header line. Only a handful of
//! columns are used: `#CHROM`, `BEGIN` (legacy `BEG`), `MARKER_ID`, `MAF`,
//! `PVALUE`, `BETA` and `SEBETA`. Any other columns are ignored.

use crate::streaming::buffers::DEFAULT_LINE_BUFFER;
use crate::streaming::parsing::{is_missing, parse_u64_fast, trim_line_end};
use crate::streaming::validation::SortValidator;
use crate::variant::{MarkerId, VariantRecord};
use std::io::{self, BufRead};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while building a Manhattan summary.
///
/// Every variant is fatal. [`VariantError::category`] groups them so a
/// caller can tell bad ordering from bad schema from I/O trouble.
#[derive(Error, Debug)]
pub enum VariantError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Path does not exist: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Not a regular file: {}", .0.display())]
    NotAFile(PathBuf),

    #[error("Input has no header line")]
    MissingHeader,

    #[error("Required column '{0}' not found in header")]
    MissingColumn(&'static str),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Malformed marker ID at line {line}: '{marker_id}'")]
    InvalidMarkerId { line: usize, marker_id: String },

    #[error(
        "Marker ID '{marker_id}' at line {line} does not match columns (chrom '{chrom}', position {pos})"
    )]
    MarkerMismatch {
        line: usize,
        marker_id: String,
        chrom: String,
        pos: u64,
    },

    #[error("Line {line} has only one of PVALUE/BETA missing (PVALUE={pval}, BETA={beta})")]
    InconsistentMissing {
        line: usize,
        pval: String,
        beta: String,
    },

    #[error("Position {pos} on chromosome '{chrom}' leaves no room for a {bin_length} bp bin")]
    PositionOverflow {
        chrom: String,
        pos: u64,
        bin_length: u64,
    },

    #[error("Input not sorted: {0}")]
    Unsorted(String),

    #[error("Input contains no variants with p-values")]
    EmptyInput,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Broad class of a [`VariantError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Reading the input or writing the output failed.
    Io,
    /// The header or the column layout is not what was expected.
    Schema,
    /// A row is self-contradictory or unparseable.
    Data,
    /// Records are not grouped by chromosome and sorted by position.
    Ordering,
    /// Parameters are unusable.
    Config,
}

impl VariantError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            VariantError::Io(_)
            | VariantError::Json(_)
            | VariantError::NotFound(_)
            | VariantError::NotAFile(_) => ErrorCategory::Io,
            VariantError::MissingHeader | VariantError::MissingColumn(_) => ErrorCategory::Schema,
            VariantError::Parse { .. }
            | VariantError::InvalidMarkerId { .. }
            | VariantError::MarkerMismatch { .. }
            | VariantError::InconsistentMissing { .. }
            | VariantError::PositionOverflow { .. }
            | VariantError::EmptyInput => ErrorCategory::Data,
            VariantError::Unsorted(_) => ErrorCategory::Ordering,
            VariantError::InvalidConfig(_) => ErrorCategory::Config,
        }
    }

    #[inline]
    pub fn is_ordering(&self) -> bool {
        self.category() == ErrorCategory::Ordering
    }
}

pub type Result<T> = std::result::Result<T, VariantError>;

/// Positions of the required columns, resolved once from the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndex {
    pub chrom: usize,
    pub begin: usize,
    pub marker_id: usize,
    pub maf: usize,
    pub pvalue: usize,
    pub beta: usize,
    pub sebeta: usize,
}

impl ColumnIndex {
    /// Resolve column positions from a header line.
    ///
    /// `BEG` is accepted for `BEGIN` and `CHROM` for `#CHROM`.
    pub fn from_header(header: &str) -> Result<Self> {
        let names: Vec<&str> = trim_line_end(header)
            .split('\t')
            .map(|name| match name {
                "BEG" => "BEGIN",
                "CHROM" => "#CHROM",
                other => other,
            })
            .collect();

        let find = |column: &'static str| -> Result<usize> {
            names
                .iter()
                .position(|&name| name == column)
                .ok_or(VariantError::MissingColumn(column))
        };

        Ok(Self {
            chrom: find("#CHROM")?,
            begin: find("BEGIN")?,
            marker_id: find("MARKER_ID")?,
            maf: find("MAF")?,
            pvalue: find("PVALUE")?,
            beta: find("BETA")?,
            sebeta: find("SEBETA")?,
        })
    }

    /// Minimum number of fields a data line must have.
    #[inline]
    pub fn required_fields(&self) -> usize {
        [
            self.chrom,
            self.begin,
            self.marker_id,
            self.maf,
            self.pvalue,
            self.beta,
            self.sebeta,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
            + 1
    }
}

/// Parse one data line.
///
/// Returns `Ok(None)` when both `PVALUE` and `BETA` are `NA`; such rows
/// carry no association result and are dropped.
pub fn parse_variant_line(
    line: &str,
    columns: &ColumnIndex,
    line_number: usize,
) -> Result<Option<VariantRecord>> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < columns.required_fields() {
        return Err(VariantError::Parse {
            line: line_number,
            message: format!(
                "Expected at least {} fields, got {}",
                columns.required_fields(),
                fields.len()
            ),
        });
    }

    let pval_field = fields[columns.pvalue];
    let beta_field = fields[columns.beta];
    match (is_missing(pval_field), is_missing(beta_field)) {
        (true, true) => return Ok(None),
        (true, false) | (false, true) => {
            return Err(VariantError::InconsistentMissing {
                line: line_number,
                pval: pval_field.to_string(),
                beta: beta_field.to_string(),
            })
        }
        (false, false) => {}
    }

    let chrom = fields[columns.chrom];
    let begin = fields[columns.begin];
    let pos = parse_u64_fast(begin.as_bytes()).ok_or_else(|| VariantError::Parse {
        line: line_number,
        message: format!("Invalid BEGIN position: '{}'", begin),
    })?;

    let maf = parse_float(fields[columns.maf], "MAF", line_number)?;
    let pval = parse_float(pval_field, "PVALUE", line_number)?;
    let beta = parse_float(beta_field, "BETA", line_number)?;
    let sebeta = parse_float(fields[columns.sebeta], "SEBETA", line_number)?;

    if !(pval > 0.0 && pval <= 1.0) {
        return Err(VariantError::Parse {
            line: line_number,
            message: format!("PVALUE must be in (0, 1], got {}", pval_field),
        });
    }
    if !(0.0..=1.0).contains(&maf) {
        return Err(VariantError::Parse {
            line: line_number,
            message: format!("MAF must be in [0, 1], got {}", fields[columns.maf]),
        });
    }

    let marker_field = fields[columns.marker_id];
    let marker = MarkerId::parse(marker_field).ok_or_else(|| VariantError::InvalidMarkerId {
        line: line_number,
        marker_id: marker_field.to_string(),
    })?;
    if marker.chrom != chrom || marker.pos != pos {
        return Err(VariantError::MarkerMismatch {
            line: line_number,
            marker_id: marker_field.to_string(),
            chrom: chrom.to_string(),
            pos,
        });
    }

    Ok(Some(VariantRecord {
        chrom: marker.chrom,
        pos,
        ref_allele: marker.ref_allele,
        alt_allele: marker.alt_allele,
        maf,
        pval,
        beta,
        sebeta,
    }))
}

fn parse_float(field: &str, column: &str, line_number: usize) -> Result<f64> {
    field.parse().map_err(|_| VariantError::Parse {
        line: line_number,
        message: format!("Invalid {} value: '{}'", column, field),
    })
}

/// A streaming, sort-validating reader of EPACTS results.
///
/// The reader is single-use. To scan the input again, open the source
/// again and build a new reader.
pub struct VariantReader<R: BufRead> {
    reader: R,
    columns: ColumnIndex,
    line_number: usize,
    buffer: String,
    validator: SortValidator,
    dropped: usize,
}

impl<R: BufRead> VariantReader<R> {
    /// Read the header line and build a reader over the remaining lines.
    pub fn new(mut reader: R) -> Result<Self> {
        let mut header = String::with_capacity(DEFAULT_LINE_BUFFER);
        if reader.read_line(&mut header)? == 0 {
            return Err(VariantError::MissingHeader);
        }
        let columns = ColumnIndex::from_header(&header)?;

        Ok(Self {
            reader,
            columns,
            line_number: 1,
            buffer: String::with_capacity(DEFAULT_LINE_BUFFER),
            validator: SortValidator::new(),
            dropped: 0,
        })
    }

    /// Read the next record, skipping blank lines and NA rows.
    pub fn read_record(&mut self) -> Result<Option<VariantRecord>> {
        loop {
            self.buffer.clear();
            if self.reader.read_line(&mut self.buffer)? == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let line = trim_line_end(&self.buffer);
            if line.is_empty() {
                continue;
            }

            match parse_variant_line(line, &self.columns, self.line_number)? {
                Some(record) => {
                    self.validator
                        .validate(&record.chrom, record.pos, self.line_number)?;
                    return Ok(Some(record));
                }
                None => self.dropped += 1,
            }
        }
    }

    pub fn columns(&self) -> &ColumnIndex {
        &self.columns
    }

    /// Number of records produced so far.
    pub fn record_count(&self) -> usize {
        self.validator.record_count()
    }

    /// Number of rows dropped because PVALUE and BETA were both `NA`.
    pub fn dropped_count(&self) -> usize {
        self.dropped
    }

    /// Number of distinct chromosomes seen so far.
    pub fn chrom_count(&self) -> usize {
        self.validator.chrom_count()
    }

    /// Get an iterator over all records.
    pub fn records(self) -> VariantRecordIter<R> {
        VariantRecordIter { reader: self }
    }
}

/// Iterator over variant records.
pub struct VariantRecordIter<R: BufRead> {
    reader: VariantReader<R>,
}

impl<R: BufRead> Iterator for VariantRecordIter<R> {
    type Item = Result<VariantRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.read_record().transpose()
    }
}

/// Parse all records from a string (useful for testing).
pub fn parse_variants(content: &str) -> Result<Vec<VariantRecord>> {
    VariantReader::new(content.as_bytes())?.records().collect()
}
