// ============================================================
// Layer 3 — Error Taxonomy
// ============================================================
// Every failure in the log/image data core maps to one of these
// variants. None of them is retried and none is downgraded to a
// placeholder sample: a batch containing one bad sample fails the
// whole fetch, and the caller (usually the training loop) halts.
//
// Reference: Rust Book §9 (Error Handling)
//            thiserror crate documentation

use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced by the data core.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// A directory or file that must exist does not.
    #[error("path not found: '{}'", .0.display())]
    PathNotFound(PathBuf),

    /// A record index at or past the end of the merged log.
    #[error("record index {index} out of range (log has {len} records)")]
    IndexOutOfRange { index: usize, len: usize },

    /// A merged-log line that does not match the record schema.
    #[error("malformed record at line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    /// An image file that exists but cannot be decoded.
    #[error("cannot decode image '{}': {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// An underlying read/write failure on a specific path.
    #[error("i/o failure on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DatasetError {
    /// Attach the offending path to a raw I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
