//! Re-openable input sources.
//!
//! The summary is built in two passes over the same input. A stream is
//! single-use, so each pass calls [`VariantSource::open`] to get a fresh
//! reader positioned at the start. Nothing is cached between passes, which
//! keeps memory independent of input size.

use crate::epacts::{Result, VariantError, VariantReader};
use crate::streaming::buffers::{DEFAULT_DECODED_BUFFER, DEFAULT_INPUT_BUFFER};
use flate2::bufread::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor};
use std::path::{Path, PathBuf};

/// A logical input that can be read from the beginning any number of times.
pub trait VariantSource {
    /// Open a new reader positioned at the first byte of the input.
    fn open(&self) -> Result<Box<dyn BufRead + '_>>;

    /// Short human-readable name used in log messages.
    fn describe(&self) -> String;

    /// Open the source and parse its header.
    fn variants(&self) -> Result<VariantReader<Box<dyn BufRead + '_>>> {
        VariantReader::new(self.open()?)
    }
}

/// True if the buffer starts with the gzip magic number.
#[inline]
fn is_gzipped(peek: &[u8]) -> bool {
    peek.len() >= 2 && peek[0] == 0x1f && peek[1] == 0x8b
}

/// Wrap a buffered reader in a gzip decoder if its first bytes are gzip magic.
///
/// Uses a multi-member decoder since EPACTS writes bgzip, which is a series
/// of concatenated gzip members.
pub fn decompress_if_gzipped<'a, R: BufRead + 'a>(mut reader: R) -> Result<Box<dyn BufRead + 'a>> {
    let gzipped = is_gzipped(reader.fill_buf()?);
    if gzipped {
        let decoder = MultiGzDecoder::new(reader);
        Ok(Box::new(BufReader::with_capacity(
            DEFAULT_DECODED_BUFFER,
            decoder,
        )))
    } else {
        Ok(Box::new(reader))
    }
}

/// EPACTS results on disk, gzip/bgzip-compressed or plain text.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Create a source for an existing file.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(VariantError::NotFound(path.to_path_buf()));
        }
        if !path.is_file() {
            return Err(VariantError::NotAFile(path.to_path_buf()));
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl VariantSource for FileSource {
    fn open(&self) -> Result<Box<dyn BufRead + '_>> {
        let file = File::open(&self.path)?;
        decompress_if_gzipped(BufReader::with_capacity(DEFAULT_INPUT_BUFFER, file))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Results held in memory. Gzip content is decoded transparently.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    data: Vec<u8>,
}

impl MemorySource {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into() }
    }
}

impl VariantSource for MemorySource {
    fn open(&self) -> Result<Box<dyn BufRead + '_>> {
        decompress_if_gzipped(Cursor::new(self.data.as_slice()))
    }

    fn describe(&self) -> String {
        format!("<memory: {} bytes>", self.data.len())
    }
}
