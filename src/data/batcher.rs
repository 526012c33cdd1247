// ============================================================
// Layer 4 — Drive Batcher
// ============================================================
// Implements Burn's Batcher trait to stack DriveSamples into one
// batch of device tensors:
//
//   images:   [batch, 3, height, width]
//   steering: [batch, 1]
//
// Every sample carries flat planar f32 data of identical length
// (the materializer resizes to the rig's input size), so batching
// is one concatenation plus a reshape per field.
//
// Reference: Burn Book §4 (Batcher)

use burn::{data::dataloader::batcher::Batcher, prelude::*};

use crate::data::dataset::DriveSample;

// ─── DriveBatch ───────────────────────────────────────────────────────────────
/// A batch of samples ready for the model forward pass.
#[derive(Debug, Clone)]
pub struct DriveBatch<B: Backend> {
    /// Image planes — shape: [batch_size, 3, height, width]
    pub images: Tensor<B, 4>,

    /// Target steering values — shape: [batch_size, 1]
    pub steering: Tensor<B, 2>,
}

// ─── DriveBatcher ─────────────────────────────────────────────────────────────
/// Stacks samples on the configured device. Input height and width
/// come from the rig so the reshape matches the materialized planes.
#[derive(Clone, Debug)]
pub struct DriveBatcher<B: Backend> {
    device: B::Device,
    input_height: usize,
    input_width: usize,
}

impl<B: Backend> DriveBatcher<B> {
    pub fn new(device: B::Device, input_height: usize, input_width: usize) -> Self {
        Self {
            device,
            input_height,
            input_width,
        }
    }
}

impl<B: Backend> Batcher<DriveSample, DriveBatch<B>> for DriveBatcher<B> {
    /// Convert a Vec of DriveSamples into a single DriveBatch.
    fn batch(&self, items: Vec<DriveSample>) -> DriveBatch<B> {
        let batch_size = items.len();
        let (height, width) = (self.input_height, self.input_width);

        // ── Flatten the image planes ──────────────────────────────────────────
        let image_flat: Vec<f32> = items
            .iter()
            .flat_map(|sample| sample.image.iter().copied())
            .collect();

        // ── Collect the steering targets ──────────────────────────────────────
        let steering_flat: Vec<f32> = items.iter().map(|sample| sample.steering).collect();

        // ── Create tensors ────────────────────────────────────────────────────
        let images = Tensor::<B, 1>::from_floats(image_flat.as_slice(), &self.device)
            .reshape([batch_size, 3, height, width]);

        let steering = Tensor::<B, 1>::from_floats(steering_flat.as_slice(), &self.device)
            .reshape([batch_size, 1]);

        DriveBatch { images, steering }
    }
}
