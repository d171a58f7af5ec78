//! Buffer size constants for streaming reads and the JSON writer.

/// Buffer placed directly on the input file, also used for gzip sniffing.
pub const DEFAULT_INPUT_BUFFER: usize = 256 * 1024;

/// Buffer placed on top of the gzip decoder for line iteration.
pub const DEFAULT_DECODED_BUFFER: usize = 64 * 1024;

/// Output buffer for the JSON writer (2 MB).
pub const DEFAULT_OUTPUT_BUFFER: usize = 2 * 1024 * 1024;

/// Default line buffer capacity. EPACTS rows are short.
pub const DEFAULT_LINE_BUFFER: usize = 1024;
