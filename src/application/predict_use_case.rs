// ============================================================
// Layer 2 — PredictUseCase
// ============================================================
// Loads a trained checkpoint and replays one dataset record
// through it: the record's frames are materialized exactly as
// during training (the rig travels inside the persisted config),
// the model estimates steering, and the logged value is returned
// next to the estimate for comparison.

use anyhow::{Context, Result};
use std::path::Path;

use crate::data::dataset::DriveDataset;
use crate::domain::record::LogRecord;
use crate::domain::traits::SteeringEstimator;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::predictor::Predictor;

/// Steering estimate for one record, next to the logged ground truth.
pub struct Prediction {
    pub record: LogRecord,
    pub logged: f32,
    pub estimated: f32,
}

pub struct PredictUseCase {
    dataset: DriveDataset,
    predictor: Predictor,
}

impl PredictUseCase {
    /// Rebuild the dataset and the model from a checkpoint directory.
    /// The persisted TrainConfig supplies the data locations and rig.
    pub fn new(checkpoint_dir: impl Into<String>) -> Result<Self> {
        let ckpt_manager = CheckpointManager::new(checkpoint_dir);
        let config = ckpt_manager.load_config()?;

        let dataset = DriveDataset::open(
            Path::new(&config.image_dir),
            Path::new(&config.log_dir),
            Path::new(&config.work_dir),
            config.rig.clone(),
        )
        .context("Cannot reopen the dataset recorded in train_config.json")?;

        let predictor = Predictor::from_checkpoint(&ckpt_manager)?;

        Ok(Self { dataset, predictor })
    }

    /// Estimate steering for the record at `index` in the merged log.
    pub fn predict(&self, index: usize) -> Result<Prediction> {
        let record = self.dataset.record_at(index)?;
        let sample = self.dataset.try_get(index)?;
        let estimated = self.predictor.estimate(&sample.image)?;

        Ok(Prediction {
            record,
            logged: sample.steering,
            estimated,
        })
    }
}
