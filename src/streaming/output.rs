//! JSON document types and the atomic writer.
//!
//! Field order in the structs is alphabetical so the serialised keys come
//! out sorted, matching what the plotting front-end has always received.

use crate::epacts::{Result, VariantError};
use crate::streaming::buffers::DEFAULT_OUTPUT_BUFFER;
use serde::{Deserialize, Serialize};
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// A finalised genomic bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantBin {
    pub chrom: String,
    /// Contiguous grid runs, `[low, high]`, ascending.
    pub neglog10_pval_extents: Vec<[f64; 2]>,
    /// Isolated grid values, ascending.
    pub neglog10_pvals: Vec<f64>,
    /// Center of the bin's window.
    pub pos: u64,
}

/// A variant drawn individually, with display-rounded statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnbinnedVariant {
    pub alt: String,
    pub beta: f64,
    pub chrom: String,
    pub maf: f64,
    pub pos: u64,
    pub pval: f64,
    #[serde(rename = "ref")]
    pub ref_allele: String,
    pub sebeta: f64,
}

/// The complete Manhattan summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManhattanResult {
    pub unbinned_variants: Vec<UnbinnedVariant>,
    pub variant_bins: Vec<VariantBin>,
}

impl ManhattanResult {
    /// Serialise to a writer.
    pub fn write_json<W: Write>(&self, writer: W, pretty: bool) -> Result<()> {
        if pretty {
            serde_json::to_writer_pretty(writer, self)?;
        } else {
            serde_json::to_writer(writer, self)?;
        }
        Ok(())
    }

    /// Serialise to `path` without ever exposing a partial file there.
    ///
    /// The document is written to a temporary file in the same directory,
    /// synced, and renamed over `path`. If anything fails the temporary
    /// file is removed and `path` is left as it was.
    pub fn write_json_atomic<P: AsRef<Path>>(&self, path: P, pretty: bool) -> Result<()> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        if !dir.is_dir() {
            return Err(VariantError::NotFound(dir.to_path_buf()));
        }

        let tmp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::with_capacity(DEFAULT_OUTPUT_BUFFER, tmp.as_file());
            self.write_json(&mut writer, pretty)?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| VariantError::Io(e.error))?;
        Ok(())
    }
}
