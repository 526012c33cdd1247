// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// This layer contains ALL Burn training and inference code.
//
// What's in this layer:
//
//   model.rs     — The convolutional steering regressor
//                  Five valid convolutions, a fully connected
//                  head and a tanh output, plus the MSE loss
//
//   trainer.rs   — The training loop
//                  Forward pass, loss computation, backward pass,
//                  Adam step, validation accuracy, checkpoint and
//                  metrics output per epoch
//
//   predictor.rs — The inference engine
//                  Loads a checkpoint and estimates steering for
//                  a materialized sample
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)
//            Bojarski et al. (2016) End to End Learning for
//            Self-Driving Cars

/// Convolutional steering regression model
pub mod model;

/// Full training loop with validation and checkpointing
pub mod trainer;

/// Inference engine — loads a checkpoint and predicts steering
pub mod predictor;
