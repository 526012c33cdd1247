// ============================================================
// Layer 2 — StatsUseCase
// ============================================================
// Textual dataset report: record count and the raw/calibrated
// steering distribution, plus (on request) the per-camera
// per-channel mean and standard deviation of the [0,1] YCbCr
// planes — the measurement that produces a rig's channel_mean
// and channel_std calibration values.

use anyhow::Result;
use std::path::Path;

use crate::data::{
    log_index::LogIndex,
    materializer::SampleMaterializer,
    merger::{merge_logs, MERGED_LOG_FILE_NAME},
};
use crate::domain::calibration::RigConfig;
use crate::domain::error::DatasetError;
use crate::domain::traits::RecordSource;

/// Summary of the steering column of the merged log.
pub struct SteeringStats {
    pub records: usize,
    pub raw_min: i32,
    pub raw_max: i32,
    pub normalized_mean: f64,
}

/// Per-channel mean/std of one camera's [0,1] YCbCr planes.
pub struct ChannelStats {
    pub camera: &'static str,
    pub mean: [f64; 3],
    pub std: [f64; 3],
}

pub struct StatsConfig {
    pub image_dir: String,
    pub log_dir: String,
    pub work_dir: String,
    pub rig: RigConfig,
    /// How many records feed the channel measurement
    pub sample_limit: usize,
}

pub struct StatsUseCase {
    config: StatsConfig,
}

impl StatsUseCase {
    pub fn new(config: StatsConfig) -> Self {
        Self { config }
    }

    /// Merge + index the logs, then summarize the steering column.
    pub fn steering_stats(&self) -> Result<SteeringStats> {
        let index = self.open_index()?;
        Ok(steering_statistics(&index, &self.config.rig)?)
    }

    /// Channel mean/std per camera view over the first
    /// `sample_limit` records.
    pub fn channel_stats(&self) -> Result<Vec<ChannelStats>> {
        let index = self.open_index()?;

        // Identity normalization: with mean 0 and std 1 the transform
        // yields the raw [0,1] planes the measurement is taken on.
        let rig = RigConfig {
            channel_mean: [0.0; 3],
            channel_std: [1.0; 3],
            ..self.config.rig.clone()
        };
        let materializer = SampleMaterializer::new(self.config.image_dir.as_str(), rig)?;

        let count = index.len().min(self.config.sample_limit);
        let mut front = ChannelAccum::default();
        let mut left = ChannelAccum::default();
        let mut right = ChannelAccum::default();

        for i in 0..count {
            let record = index.record_at(i)?;
            let views = materializer.views(&record)?;
            front.add(&views.front);
            left.add(&views.left);
            right.add(&views.right);
        }

        tracing::info!("Measured channel statistics over {} records", count);

        Ok(vec![
            front.finish("front"),
            left.finish("left"),
            right.finish("right"),
        ])
    }

    fn open_index(&self) -> Result<LogIndex> {
        let merged_path = Path::new(&self.config.work_dir).join(MERGED_LOG_FILE_NAME);
        merge_logs(Path::new(&self.config.log_dir), &merged_path)?;
        Ok(LogIndex::open(&merged_path)?)
    }
}

/// Walk every record of `source` and fold the steering column.
fn steering_statistics(
    source: &dyn RecordSource,
    rig: &RigConfig,
) -> Result<SteeringStats, DatasetError> {
    let records = source.len();
    let mut raw_min = i32::MAX;
    let mut raw_max = i32::MIN;
    let mut normalized_sum = 0.0f64;

    for i in 0..records {
        let record = source.record_at(i)?;
        raw_min = raw_min.min(record.steering_raw);
        raw_max = raw_max.max(record.steering_raw);
        normalized_sum += rig.steering.normalize(record.steering_raw) as f64;
    }

    Ok(SteeringStats {
        records,
        raw_min,
        raw_max,
        normalized_mean: if records > 0 {
            normalized_sum / records as f64
        } else {
            0.0
        },
    })
}

/// Streaming per-channel sum / sum-of-squares accumulator.
#[derive(Default)]
struct ChannelAccum {
    sum: [f64; 3],
    sum_sq: [f64; 3],
    count: usize,
}

impl ChannelAccum {
    fn add(&mut self, planes: &[f32]) {
        let plane_len = planes.len() / 3;
        for c in 0..3 {
            for &value in &planes[c * plane_len..(c + 1) * plane_len] {
                self.sum[c] += value as f64;
                self.sum_sq[c] += (value as f64) * (value as f64);
            }
        }
        self.count += plane_len;
    }

    fn finish(&self, camera: &'static str) -> ChannelStats {
        let mut mean = [0.0; 3];
        let mut std = [0.0; 3];
        if self.count > 0 {
            let n = self.count as f64;
            for c in 0..3 {
                mean[c] = self.sum[c] / n;
                // Var = E[x²] − E[x]²; clamp tiny negatives from rounding
                std[c] = (self.sum_sq[c] / n - mean[c] * mean[c]).max(0.0).sqrt();
            }
        }
        ChannelStats { camera, mean, std }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::LogRecord;

    /// In-memory record source for exercising the fold without files.
    struct FakeSource(Vec<i32>);

    impl RecordSource for FakeSource {
        fn len(&self) -> usize {
            self.0.len()
        }

        fn record_at(&self, index: usize) -> Result<LogRecord, DatasetError> {
            let raw = *self.0.get(index).ok_or(DatasetError::IndexOutOfRange {
                index,
                len: self.0.len(),
            })?;
            LogRecord::parse(&format!("t f l r {raw}"), index)
        }
    }

    #[test]
    fn test_steering_statistics_fold() {
        let source = FakeSource(vec![451, 512, 573]);
        let stats = steering_statistics(&source, &RigConfig::default()).unwrap();

        assert_eq!(stats.records, 3);
        assert_eq!(stats.raw_min, 451);
        assert_eq!(stats.raw_max, 573);
        // (-1 + 0 + 1) / 3
        assert!(stats.normalized_mean.abs() < 1e-9);
    }

    #[test]
    fn test_steering_statistics_empty_source() {
        let source = FakeSource(Vec::new());
        let stats = steering_statistics(&source, &RigConfig::default()).unwrap();
        assert_eq!(stats.records, 0);
        assert_eq!(stats.normalized_mean, 0.0);
    }

    #[test]
    fn test_channel_accum_constant_planes() {
        let mut accum = ChannelAccum::default();
        // 2×2 planes: channel values 0.5, 0.25, 1.0
        let mut planes = vec![0.5f32; 4];
        planes.extend(vec![0.25f32; 4]);
        planes.extend(vec![1.0f32; 4]);
        accum.add(&planes);

        let stats = accum.finish("front");
        assert!((stats.mean[0] - 0.5).abs() < 1e-9);
        assert!((stats.mean[1] - 0.25).abs() < 1e-9);
        assert!((stats.mean[2] - 1.0).abs() < 1e-9);
        // Constant planes have zero spread
        assert!(stats.std.iter().all(|s| s.abs() < 1e-6));
    }
}
