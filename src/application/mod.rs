// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates all the other layers to accomplish a
// specific goal (training, predicting, or reporting statistics).
//
// Rules for this layer:
//   - No ML math or model code here
//   - No UI or printing here (that's Layer 1)
//   - No direct file access beyond wiring Layer 4 and 6 together
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// The training workflow
pub mod train_use_case;

// The steering prediction workflow
pub mod predict_use_case;

// The dataset statistics workflow
pub mod stats_use_case;
