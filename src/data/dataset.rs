// ============================================================
// Layer 4 — Drive Dataset
// ============================================================
// Burn Dataset over the merged log plus the image directory.
// Nothing is materialized up front: get(index) maps the index to a
// log line through the offset table and only then loads and
// transforms that record's frames. Samples are rebuilt on every
// access and never cached.
//
// A failed access (missing frame, undecodable JPEG, malformed log
// line) must stop the run rather than shrink the epoch. The Dataset
// trait has no error channel, so get() logs the failure and panics;
// `try_get` is the fallible entry point for everything outside the
// data loader.
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

use std::path::Path;
use std::sync::Arc;

use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

use crate::data::log_index::LogIndex;
use crate::data::materializer::SampleMaterializer;
use crate::data::merger::{merge_logs, MERGED_LOG_FILE_NAME};
use crate::data::splitter::split_train_val;
use crate::domain::calibration::RigConfig;
use crate::domain::error::DatasetError;
use crate::domain::record::LogRecord;

/// One training sample: planar 3×H×W normalized image data plus the
/// calibrated steering value in [-1, 1].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriveSample {
    pub image: Vec<f32>,
    pub steering: f32,
}

/// Lazy (image, steering) dataset over a merged driving log.
pub struct DriveDataset {
    source: Arc<LogIndex>,
    materializer: SampleMaterializer,
    indices: Vec<usize>,
}

impl DriveDataset {
    /// Merge the per-run logs (skipped if a merged log already exists),
    /// index the merged file and wire up the materializer.
    pub fn open(
        image_dir: &Path,
        log_dir: &Path,
        work_dir: &Path,
        rig: RigConfig,
    ) -> Result<Self, DatasetError> {
        let merged_path = work_dir.join(MERGED_LOG_FILE_NAME);
        merge_logs(log_dir, &merged_path)?;
        let source = Arc::new(LogIndex::open(&merged_path)?);
        let materializer = SampleMaterializer::new(image_dir, rig)?;
        Ok(Self::new(source, materializer))
    }

    /// Dataset over every record of an already-indexed merged log.
    pub fn new(source: Arc<LogIndex>, materializer: SampleMaterializer) -> Self {
        let indices = (0..source.len()).collect();
        Self {
            source,
            materializer,
            indices,
        }
    }

    /// Number of records this dataset view exposes.
    pub fn record_count(&self) -> usize {
        self.indices.len()
    }

    /// Shuffle and split into (train, validation) datasets sharing the
    /// same log index and image directory.
    pub fn split(self, train_fraction: f64) -> (Self, Self) {
        let Self {
            source,
            materializer,
            indices,
        } = self;
        let (train_indices, val_indices) = split_train_val(indices, train_fraction);
        (
            Self {
                source: Arc::clone(&source),
                materializer: materializer.clone(),
                indices: train_indices,
            },
            Self {
                source,
                materializer,
                indices: val_indices,
            },
        )
    }

    /// The log record behind dataset position `index` (after any split).
    pub fn record_at(&self, index: usize) -> Result<LogRecord, DatasetError> {
        let line = *self
            .indices
            .get(index)
            .ok_or(DatasetError::IndexOutOfRange {
                index,
                len: self.indices.len(),
            })?;
        self.source.record_at(line)
    }

    /// Fallible sample access; the Dataset impl funnels through here.
    pub fn try_get(&self, index: usize) -> Result<DriveSample, DatasetError> {
        let record = self.record_at(index)?;
        let (image, steering) = self.materializer.materialize(&record)?;
        Ok(DriveSample { image, steering })
    }

    pub fn materializer(&self) -> &SampleMaterializer {
        &self.materializer
    }
}

impl Dataset<DriveSample> for DriveDataset {
    fn get(&self, index: usize) -> Option<DriveSample> {
        match self.try_get(index) {
            Ok(sample) => Some(sample),
            Err(e) => {
                tracing::error!("Sample {index} failed: {e}");
                panic!("sample {index} failed: {e}");
            }
        }
    }

    fn len(&self) -> usize {
        self.indices.len()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::fs;
    use tempfile::tempdir;

    /// Lay out a miniature dataset: two runs of logs plus the frames
    /// they reference, then open it end to end.
    fn fixture(dir: &Path) -> DriveDataset {
        let logs = dir.join("logging_data");
        let images = dir.join("image_data");
        fs::create_dir(&logs).unwrap();
        fs::create_dir(&images).unwrap();

        fs::write(
            logs.join("log_0.txt"),
            "t0 front_0 left_0 right_0 451\nt1 front_1 left_1 right_1 512\n",
        )
        .unwrap();
        fs::write(logs.join(".hidden"), "zz zz zz zz 999\n").unwrap();
        fs::write(logs.join("log_1.txt"), "t2 front_2 left_2 right_2 573\n").unwrap();

        for i in 0..3 {
            for camera in ["front", "left", "right"] {
                let img = RgbImage::from_pixel(640, 480, Rgb([80, 90, 100]));
                img.save(images.join(format!("{camera}_{i}.jpg"))).unwrap();
            }
        }

        DriveDataset::open(&images, &logs, dir, RigConfig::default()).unwrap()
    }

    #[test]
    fn test_open_merges_and_counts_records() {
        let dir = tempdir().unwrap();
        let dataset = fixture(dir.path());
        assert_eq!(dataset.record_count(), 3);
        assert_eq!(dataset.len(), 3);
    }

    #[test]
    fn test_try_get_materializes_a_sample() {
        let dir = tempdir().unwrap();
        let dataset = fixture(dir.path());

        let sample = dataset.try_get(1).unwrap();
        assert_eq!(sample.image.len(), 3 * 66 * 200);
        assert_eq!(sample.steering, 0.0);
    }

    #[test]
    fn test_try_get_past_the_end_fails() {
        let dir = tempdir().unwrap();
        let dataset = fixture(dir.path());

        let err = dataset.try_get(3).unwrap_err();
        assert!(matches!(err, DatasetError::IndexOutOfRange { .. }));
    }

    #[test]
    fn test_split_partitions_the_records() {
        let dir = tempdir().unwrap();
        let dataset = fixture(dir.path());

        let (train, val) = dataset.split(0.67);
        assert_eq!(train.record_count() + val.record_count(), 3);
        assert_eq!(train.record_count(), 2);
    }

    #[test]
    fn test_reopen_reuses_the_merged_log() {
        let dir = tempdir().unwrap();
        let dataset = fixture(dir.path());
        drop(dataset);

        // Second open must short-circuit the merge and see the same records.
        let reopened = DriveDataset::open(
            &dir.path().join("image_data"),
            &dir.path().join("logging_data"),
            dir.path(),
            RigConfig::default(),
        )
        .unwrap();
        assert_eq!(reopened.record_count(), 3);
    }
}
