//! Field-level parsing helpers for EPACTS result lines.
//!
//! These work on raw bytes and do not allocate.

/// Literal used by EPACTS for missing numeric values.
pub const MISSING: &str = "NA";

/// Fast u64 parsing - no allocation, no error formatting.
///
/// Returns None if the input is empty or contains non-digit characters.
#[inline(always)]
pub fn parse_u64_fast(bytes: &[u8]) -> Option<u64> {
    if bytes.is_empty() {
        return None;
    }
    let mut n: u64 = 0;
    for &b in bytes {
        let d = b.wrapping_sub(b'0');
        if d > 9 {
            return None;
        }
        n = n.checked_mul(10)?.checked_add(d as u64)?;
    }
    Some(n)
}

/// True if `bytes` is a non-empty allele over `A`, `C`, `G`, `T` or `-`.
#[inline]
pub fn is_allele(bytes: &[u8]) -> bool {
    !bytes.is_empty()
        && bytes
            .iter()
            .all(|b| matches!(b, b'A' | b'C' | b'G' | b'T' | b'-'))
}

/// True if the field holds the missing-value marker.
#[inline(always)]
pub fn is_missing(field: &str) -> bool {
    field == MISSING
}

/// Strip a trailing `\n` or `\r\n` from a line.
#[inline]
pub fn trim_line_end(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}
