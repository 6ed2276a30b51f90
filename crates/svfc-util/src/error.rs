//! Crate-level error types.
//!
//! These cover infrastructure failures (bad file ids, out-of-range spans).
//! Language-level problems never surface here; they go through the
//! diagnostic [`Handler`](crate::Handler) so compilation can continue.

use thiserror::Error;

/// Errors from source-map operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SourceError {
    /// File id was never registered with the source map.
    #[error("unknown file id {id}")]
    UnknownFile { id: u32 },

    /// Span does not lie within the file it names.
    #[error("span {start}..{end} out of bounds for file of {file_len} bytes")]
    SpanOutOfBounds {
        start: u32,
        end: u32,
        file_len: usize,
    },
}
