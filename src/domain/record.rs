// ============================================================
// Layer 3 — Log Record Domain Type
// ============================================================
// One parsed line of the merged log. The logging rig writes one
// whitespace-delimited line per captured frame triple:
//
//   <timestamp> <front_ref> <left_ref> <right_ref> <steering_raw> ...
//
// The *_ref tokens are paths on the logging host; only their final
// path component matters here — it is the base name of a .jpg in
// the image directory. Fields past the steering value are ignored.
// There is no escaping in the log format, so a value containing a
// space cannot be represented.
//
// Reference: Rust Book §5 (Structs and Methods)

use serde::{Deserialize, Serialize};

use crate::domain::error::DatasetError;

/// A single merged-log line in parsed form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    /// Capture timestamp, kept as the raw token for traceability
    pub timestamp: String,

    /// Front-camera frame reference (path-like token)
    pub front_ref: String,

    /// Left-camera frame reference
    pub left_ref: String,

    /// Right-camera frame reference
    pub right_ref: String,

    /// Raw steering sensor reading, before calibration
    pub steering_raw: i32,
}

impl LogRecord {
    /// Parse one merged-log line. `line_no` is the 0-based line number,
    /// carried into the error so a bad line can be located in the file.
    pub fn parse(line: &str, line_no: usize) -> Result<Self, DatasetError> {
        let fields: Vec<&str> = line.split_whitespace().collect();

        if fields.len() < 5 {
            return Err(DatasetError::MalformedRecord {
                line: line_no,
                reason: format!("expected at least 5 fields, found {}", fields.len()),
            });
        }

        let steering_raw: i32 = fields[4].parse().map_err(|_| DatasetError::MalformedRecord {
            line: line_no,
            reason: format!("steering value '{}' is not an integer", fields[4]),
        })?;

        Ok(Self {
            timestamp: fields[0].to_string(),
            front_ref: fields[1].to_string(),
            left_ref: fields[2].to_string(),
            right_ref: fields[3].to_string(),
            steering_raw,
        })
    }

    /// Base name of the front-camera frame (final component of the ref).
    pub fn front_frame(&self) -> &str {
        frame_basename(&self.front_ref)
    }

    /// Base name of the left-camera frame.
    pub fn left_frame(&self) -> &str {
        frame_basename(&self.left_ref)
    }

    /// Base name of the right-camera frame.
    pub fn right_frame(&self) -> &str {
        frame_basename(&self.right_ref)
    }
}

/// Final path component of a frame reference.
/// `rsplit` always yields at least one piece, even for an empty ref.
fn frame_basename(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or(reference)
}
