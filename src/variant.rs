//! Core variant types for association results.

use crate::streaming::parsing::{is_allele, parse_u64_fast};
use memchr::memchr;
use std::fmt;

/// One association-test result row.
///
/// Records are created once per input line and never mutated. Each pass
/// over the input re-parses its own records.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantRecord {
    pub chrom: String,
    pub pos: u64,
    pub ref_allele: String,
    pub alt_allele: String,
    pub maf: f64,
    pub pval: f64,
    pub beta: f64,
    pub sebeta: f64,
}

impl VariantRecord {
    /// Create a new variant record.
    #[inline]
    pub fn new(
        chrom: impl Into<String>,
        pos: u64,
        ref_allele: impl Into<String>,
        alt_allele: impl Into<String>,
        maf: f64,
        pval: f64,
        beta: f64,
        sebeta: f64,
    ) -> Self {
        Self {
            chrom: chrom.into(),
            pos,
            ref_allele: ref_allele.into(),
            alt_allele: alt_allele.into(),
            maf,
            pval,
            beta,
            sebeta,
        }
    }
}

impl fmt::Display for VariantRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}_{}/{}\tmaf={}\tpval={}\tbeta={}\tsebeta={}",
            self.chrom,
            self.pos,
            self.ref_allele,
            self.alt_allele,
            self.maf,
            self.pval,
            self.beta,
            self.sebeta
        )
    }
}

/// A decoded EPACTS marker identifier: `CHROM:POS_REF/ALT[_SUFFIX]`.
///
/// Alleles are restricted to `A`, `C`, `G`, `T` and the gap marker `-`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerId {
    pub chrom: String,
    pub pos: u64,
    pub ref_allele: String,
    pub alt_allele: String,
    pub suffix: Option<String>,
}

impl MarkerId {
    /// Parse a marker identifier. Returns `None` if it does not follow
    /// the `CHROM:POS_REF/ALT[_SUFFIX]` grammar.
    pub fn parse(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();

        let colon = memchr(b':', bytes)?;
        if colon == 0 {
            return None;
        }
        let chrom = &s[..colon];

        let rest = &bytes[colon + 1..];
        let underscore = memchr(b'_', rest)?;
        let pos = parse_u64_fast(&rest[..underscore])?;

        let rest = &rest[underscore + 1..];
        let slash = memchr(b'/', rest)?;
        let ref_allele = &rest[..slash];
        if !is_allele(ref_allele) {
            return None;
        }

        let rest = &rest[slash + 1..];
        let (alt_allele, suffix) = match memchr(b'_', rest) {
            Some(i) => (&rest[..i], Some(&rest[i + 1..])),
            None => (rest, None),
        };
        if !is_allele(alt_allele) {
            return None;
        }
        let suffix = match suffix {
            Some([]) => return None,
            Some(sfx) => Some(std::str::from_utf8(sfx).ok()?.to_string()),
            None => None,
        };

        Some(Self {
            chrom: chrom.to_string(),
            pos,
            ref_allele: std::str::from_utf8(ref_allele).ok()?.to_string(),
            alt_allele: std::str::from_utf8(alt_allele).ok()?.to_string(),
            suffix,
        })
    }
}

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}_{}/{}",
            self.chrom, self.pos, self.ref_allele, self.alt_allele
        )?;
        if let Some(ref suffix) = self.suffix {
            write!(f, "_{}", suffix)?;
        }
        Ok(())
    }
}
