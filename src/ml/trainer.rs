// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Full train + validation loop using Burn's DataLoader and Adam.
//
// Key Burn 0.16 insight:
//   - Training uses SteerBackend (Autodiff<Wgpu>) for gradients
//   - model.valid() returns model on SteerInnerBackend (Wgpu)
//   - Validation batcher must also use SteerInnerBackend
//
// Validation accuracy: a prediction counts as correct when it lands
// within `accuracy_threshold` of the logged steering value.
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::Result;
use burn::{
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    nn::loss::{MseLoss, Reduction},
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::DriveBatcher, dataset::DriveDataset};
use crate::infra::checkpoint::CheckpointManager;
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::model::{SteeringNet, SteeringNetConfig};

type SteerBackend = burn::backend::Autodiff<burn::backend::Wgpu>;
type SteerInnerBackend = burn::backend::Wgpu;

pub fn run_training(
    cfg: &TrainConfig,
    train_dataset: DriveDataset,
    val_dataset: DriveDataset,
    ckpt_manager: CheckpointManager,
) -> Result<()> {
    let device = burn::backend::wgpu::WgpuDevice::default();
    tracing::info!("Using WGPU device: {:?}", device);
    train_loop(cfg, train_dataset, val_dataset, ckpt_manager, device)
}

fn train_loop(
    cfg: &TrainConfig,
    train_dataset: DriveDataset,
    val_dataset: DriveDataset,
    ckpt_manager: CheckpointManager,
    device: burn::backend::wgpu::WgpuDevice,
) -> Result<()> {
    let height = cfg.rig.input_height as usize;
    let width = cfg.rig.input_width as usize;

    // ── Build model ───────────────────────────────────────────────────────────
    let model_cfg = SteeringNetConfig::new(height, width, cfg.dropout);
    let mut model: SteeringNet<SteerBackend> = model_cfg.init(&device);
    tracing::info!("Model ready for {}×{} input", height, width);

    // ── Adam optimiser ────────────────────────────────────────────────────────
    let optim_cfg = AdamConfig::new().with_epsilon(1e-8);
    let mut optim = optim_cfg.init();

    // ── Training data loader (AutodiffBackend) ────────────────────────────────
    let train_batcher = DriveBatcher::<SteerBackend>::new(device.clone(), height, width);
    let train_loader = DataLoaderBuilder::new(train_batcher)
        .batch_size(cfg.batch_size)
        .shuffle(42)
        .num_workers(1)
        .build(train_dataset);

    // ── Validation data loader (InnerBackend — no autodiff overhead) ──────────
    let val_batcher = DriveBatcher::<SteerInnerBackend>::new(device.clone(), height, width);
    let val_loader = DataLoaderBuilder::new(val_batcher)
        .batch_size(cfg.batch_size)
        .num_workers(1)
        .build(val_dataset);

    let metrics = MetricsLogger::new(&cfg.checkpoint_dir)?;

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=cfg.epochs {
        // ── Training phase ────────────────────────────────────────────────────
        let mut train_loss_sum = 0.0f64;
        let mut train_batches = 0usize;

        for batch in train_loader.iter() {
            let (loss, _) = model.forward_loss(batch.images, batch.steering);

            let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
            train_loss_sum += loss_val;
            train_batches += 1;

            // Backward pass + Adam update
            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.lr, model, grads);
        }

        let avg_train_loss = if train_batches > 0 {
            train_loss_sum / train_batches as f64
        } else {
            f64::NAN
        };

        // ── Validation phase ──────────────────────────────────────────────────
        // model.valid() → SteeringNet<SteerInnerBackend>
        // dropout disabled for deterministic evaluation
        let model_valid = model.valid();

        let mut val_loss_sum = 0.0f64;
        let mut val_batches = 0usize;
        let mut within_threshold = 0usize;
        let mut total_samples = 0usize;

        for batch in val_loader.iter() {
            let output = model_valid.forward(batch.images);

            let batch_loss: f64 = MseLoss::new()
                .forward(output.clone(), batch.steering.clone(), Reduction::Mean)
                .into_scalar()
                .elem::<f64>();
            val_loss_sum += batch_loss;
            val_batches += 1;

            total_samples += batch.steering.dims()[0];

            // |prediction − target| < threshold counts as a hit
            let hits: i64 = (output - batch.steering)
                .abs()
                .lower_elem(cfg.accuracy_threshold)
                .int()
                .sum()
                .into_scalar()
                .elem::<i64>();
            within_threshold += hits as usize;
        }

        let avg_val_loss = if val_batches > 0 {
            val_loss_sum / val_batches as f64
        } else {
            f64::NAN
        };
        let accuracy = if total_samples > 0 {
            within_threshold as f64 / total_samples as f64
        } else {
            0.0
        };

        println!(
            "Epoch {:>3}/{} | train_loss={:.4} | val_loss={:.4} | accuracy={:.1}%",
            epoch,
            cfg.epochs,
            avg_train_loss,
            avg_val_loss,
            accuracy * 100.0,
        );

        metrics.log(&EpochMetrics::new(epoch, avg_train_loss, avg_val_loss, accuracy))?;

        ckpt_manager.save_model(&model, epoch)?;
        tracing::info!("Checkpoint saved for epoch {}", epoch);
    }

    tracing::info!("Training complete!");
    Ok(())
}
