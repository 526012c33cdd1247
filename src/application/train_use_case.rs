// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Merge per-run logs        (Layer 4 - data)
//   Step 2: Index the merged log      (Layer 4 - data)
//   Step 3: Wire up the materializer  (Layer 4 - data)
//   Step 4: Split train/validation    (Layer 4 - data)
//   Step 5: Save config               (Layer 6 - infra)
//   Step 6: Run training loop         (Layer 5 - ml)
//
// Reference: Burn Book §5 (Training)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::data::{
    dataset::DriveDataset,
    log_index::LogIndex,
    materializer::SampleMaterializer,
    merger::{merge_logs, MERGED_LOG_FILE_NAME},
};
use crate::domain::calibration::RigConfig;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::trainer::run_training;

// ─── Training Configuration ──────────────────────────────────────────────────
// All settings for one training run. Serialisable so it can be saved
// next to the checkpoints and reloaded for prediction — the rig that
// produced the tensors travels with the weights trained on them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub image_dir: String,
    pub log_dir: String,
    pub work_dir: String,
    pub checkpoint_dir: String,
    pub batch_size: usize,
    pub epochs: usize,
    pub lr: f64,
    pub dropout: f64,
    /// Validation predictions within this distance of the logged
    /// steering count as correct
    pub accuracy_threshold: f64,
    pub train_fraction: f64,
    pub rig: RigConfig,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            image_dir: "data/image_data".to_string(),
            log_dir: "data/logging_data".to_string(),
            work_dir: "data".to_string(),
            checkpoint_dir: "checkpoints".to_string(),
            batch_size: 8,
            epochs: 10,
            lr: 1e-4,
            dropout: 0.1,
            accuracy_threshold: 0.1,
            train_fraction: 0.8,
            rig: RigConfig::default(),
        }
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
// Owns the config and runs the full training pipeline.
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    /// Create a new TrainUseCase with the given configuration
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end
    pub fn execute(&self) -> Result<()> {
        let cfg = &self.config;

        // ── Step 1: Merge per-run logs ────────────────────────────────────────
        // A merged log left by an earlier run short-circuits the merge.
        let merged_path = Path::new(&cfg.work_dir).join(MERGED_LOG_FILE_NAME);
        tracing::info!(
            "Merging logs from '{}' into '{}'",
            cfg.log_dir,
            merged_path.display()
        );
        merge_logs(Path::new(&cfg.log_dir), &merged_path)?;

        // ── Step 2: Index the merged log ──────────────────────────────────────
        let index = Arc::new(LogIndex::open(&merged_path)?);
        tracing::info!("Indexed {} records", index.len());

        // ── Step 3: Materializer over the image directory ─────────────────────
        let materializer = SampleMaterializer::new(cfg.image_dir.as_str(), cfg.rig.clone())?;

        // ── Step 4: Train / validation split ──────────────────────────────────
        // Shuffled index split so the model is evaluated on road it
        // did not train on.
        let dataset = DriveDataset::new(index, materializer);
        let (train_dataset, val_dataset) = dataset.split(cfg.train_fraction);
        tracing::info!(
            "Split: {} train, {} validation",
            train_dataset.record_count(),
            val_dataset.record_count()
        );

        // ── Step 5: Save config for prediction ────────────────────────────────
        let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_dir);
        ckpt_manager.save_config(cfg)?;

        // ── Step 6: Run training loop (Layer 5) ───────────────────────────────
        run_training(cfg, train_dataset, val_dataset, ckpt_manager)?;

        Ok(())
    }
}
