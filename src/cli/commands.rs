// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the three subcommands: `train`, `predict` and `stats`,
// and all their configurable flags.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → usize, f64, etc.)
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};

use crate::application::train_use_case::TrainConfig;
use crate::domain::calibration::RigConfig;

/// The top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Merge the driving logs and train the steering model
    Train(TrainArgs),

    /// Estimate steering for one record using a trained checkpoint
    Predict(PredictArgs),

    /// Report dataset statistics (steering range, channel mean/std)
    Stats(StatsArgs),
}

/// All arguments for the `train` command.
/// Each field becomes a --flag on the command line.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Directory containing the camera frames (<frame>.jpg)
    #[arg(long, default_value = "data/image_data")]
    pub image_dir: String,

    /// Directory containing the per-run log files
    #[arg(long, default_value = "data/logging_data")]
    pub log_dir: String,

    /// Directory the merged log file is written to
    #[arg(long, default_value = "data")]
    pub work_dir: String,

    /// Directory for model checkpoints, metrics and the run config
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Number of samples processed together in one forward pass
    #[arg(long, default_value_t = 8)]
    pub batch_size: usize,

    /// Number of full passes through the training data
    #[arg(long, default_value_t = 10)]
    pub epochs: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 1e-4)]
    pub lr: f64,

    /// Dropout probability in the fully connected head
    #[arg(long, default_value_t = 0.1)]
    pub dropout: f64,

    /// A validation prediction within this distance of the logged
    /// steering counts as correct
    #[arg(long, default_value_t = 0.1)]
    pub accuracy_threshold: f64,

    /// Proportion of samples used for training, e.g. 0.8 = 80%
    #[arg(long, default_value_t = 0.8)]
    pub train_fraction: f64,

    /// JSON file overriding the built-in rig calibration
    /// (steering range, crop rectangle, channel statistics)
    #[arg(long)]
    pub rig: Option<String>,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// The --rig override is file-backed and therefore resolved by the
/// CLI layer after this conversion.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            image_dir: a.image_dir,
            log_dir: a.log_dir,
            work_dir: a.work_dir,
            checkpoint_dir: a.checkpoint_dir,
            batch_size: a.batch_size,
            epochs: a.epochs,
            lr: a.lr,
            dropout: a.dropout,
            accuracy_threshold: a.accuracy_threshold,
            train_fraction: a.train_fraction,
            rig: RigConfig::default(),
        }
    }
}

/// All arguments for the `predict` command
#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Record index into the merged log
    #[arg(long)]
    pub index: usize,

    /// Directory where checkpoints were saved during training
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,
}

/// All arguments for the `stats` command
#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Directory containing the camera frames
    #[arg(long, default_value = "data/image_data")]
    pub image_dir: String,

    /// Directory containing the per-run log files
    #[arg(long, default_value = "data/logging_data")]
    pub log_dir: String,

    /// Directory the merged log file is written to
    #[arg(long, default_value = "data")]
    pub work_dir: String,

    /// Also measure per-camera channel mean/std (loads images)
    #[arg(long, default_value_t = false)]
    pub channel_stats: bool,

    /// How many records feed the channel measurement
    #[arg(long, default_value_t = 100)]
    pub sample_limit: usize,

    /// JSON file overriding the built-in rig calibration
    #[arg(long)]
    pub rig: Option<String>,
}
