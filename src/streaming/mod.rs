//! Streaming utilities shared by both passes.
//!
//! This module provides:
//! - Byte-level field parsing
//! - Inline sort validation
//! - Re-openable input sources with transparent gzip/bgzip decoding
//! - The output document and its atomic writer
//!
//! Memory stays independent of input size: records are parsed, consumed
//! and dropped one at a time.

pub mod buffers;
pub mod output;
pub mod parsing;
pub mod source;
pub mod validation;

pub use output::{ManhattanResult, UnbinnedVariant, VariantBin};
pub use parsing::{is_allele, is_missing, parse_u64_fast, MISSING};
pub use source::{decompress_if_gzipped, FileSource, MemorySource, VariantSource};
pub use validation::SortValidator;
