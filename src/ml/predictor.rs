// ============================================================
// Layer 5 — Predictor
// ============================================================
use anyhow::Result;
use burn::prelude::*;

use crate::domain::traits::SteeringEstimator;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::model::{SteeringNet, SteeringNetConfig};

type InferBackend = burn::backend::Wgpu;

pub struct Predictor {
    model: SteeringNet<InferBackend>,
    input_height: usize,
    input_width: usize,
    device: burn::backend::wgpu::WgpuDevice,
}

impl Predictor {
    /// Rebuild the trained network from the newest checkpoint. The
    /// persisted config supplies the input size; dropout is zeroed so
    /// prediction is deterministic.
    pub fn from_checkpoint(ckpt_manager: &CheckpointManager) -> Result<Self> {
        let device = burn::backend::wgpu::WgpuDevice::default();
        let cfg = ckpt_manager.load_config()?;
        let input_height = cfg.rig.input_height as usize;
        let input_width = cfg.rig.input_width as usize;

        let model_cfg = SteeringNetConfig::new(input_height, input_width, 0.0);
        let model: SteeringNet<InferBackend> = model_cfg.init(&device);
        let model = ckpt_manager.load_model(model, &device)?;
        tracing::info!("Model loaded from checkpoint");

        Ok(Self {
            model,
            input_height,
            input_width,
            device,
        })
    }

    /// Estimate steering for one materialized plane set.
    pub fn predict(&self, image: &[f32]) -> Result<f32> {
        let expected = 3 * self.input_height * self.input_width;
        anyhow::ensure!(
            image.len() == expected,
            "image data has {} values, the model expects {}",
            image.len(),
            expected,
        );

        let input = Tensor::<InferBackend, 1>::from_floats(image, &self.device).reshape([
            1,
            3,
            self.input_height,
            self.input_width,
        ]);

        let output = self.model.forward(input);
        let values: Vec<f32> = output.into_data().to_vec::<f32>().unwrap_or_default();

        Ok(values.first().copied().unwrap_or(f32::NAN))
    }
}

impl SteeringEstimator for Predictor {
    fn estimate(&self, image: &[f32]) -> Result<f32> {
        self.predict(image)
    }
}
