// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The two seams of the system, as traits so implementations can be
// swapped without touching the code that uses them:
//
//   - RecordSource      → hands out log records by index
//                         (LogIndex reads them from the merged log;
//                          tests substitute an in-memory source)
//   - SteeringEstimator → estimates steering for materialized
//                         image data (Predictor runs the trained
//                          network behind this seam)
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;

use crate::domain::error::DatasetError;
use crate::domain::record::LogRecord;

// ─── RecordSource ─────────────────────────────────────────────────────────────
/// Any component that can hand out log records by 0-based index.
pub trait RecordSource {
    /// Number of records available.
    fn len(&self) -> usize;

    /// Returns `true` if the source holds no records.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The record at `index`; `IndexOutOfRange` past the end.
    fn record_at(&self, index: usize) -> Result<LogRecord, DatasetError>;
}

// ─── SteeringEstimator ────────────────────────────────────────────────────────
/// Any component that can estimate a steering value for one sample's
/// planar 3×H×W image data (already normalized).
pub trait SteeringEstimator {
    /// Estimated steering in the same [-1, 1] units as the logged values.
    fn estimate(&self, image: &[f32]) -> Result<f32>;
}
