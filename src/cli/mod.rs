// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application).
//
// Three commands are supported:
//   1. `train`   — merges the driving logs and trains the model
//   2. `predict` — loads a checkpoint and estimates steering
//   3. `stats`   — prints dataset statistics
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

// Declare the commands submodule
pub mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use commands::{Commands, PredictArgs, StatsArgs, TrainArgs};

use crate::domain::calibration::RigConfig;

/// The main CLI struct — clap reads the fields and generates
/// argument parsing code automatically via the Parser derive macro.
#[derive(Parser, Debug)]
#[command(
    name = "steernet",
    version = "0.1.0",
    about = "Train an end-to-end steering model from driving logs, then predict steering angles."
)]
pub struct Cli {
    /// The subcommand to run (train, predict or stats)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    /// This keeps the CLI layer thin — it only routes, never computes.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args) => Self::run_train(args),
            Commands::Predict(args) => Self::run_predict(args),
            Commands::Stats(args) => Self::run_stats(args),
        }
    }

    /// Handles the `train` subcommand.
    /// Converts CLI args into a TrainConfig and hands off to Layer 2.
    fn run_train(args: TrainArgs) -> Result<()> {
        use crate::application::train_use_case::{TrainConfig, TrainUseCase};

        tracing::info!("Starting training on logs in: {}", args.log_dir);

        let rig = load_rig(args.rig.as_deref())?;
        let mut config: TrainConfig = args.into();
        config.rig = rig;

        let use_case = TrainUseCase::new(config);
        use_case.execute()?;

        println!("Training complete. Checkpoint saved.");
        Ok(())
    }

    /// Handles the `predict` subcommand.
    /// Replays one record through the trained model and prints the
    /// estimate next to the logged steering value.
    fn run_predict(args: PredictArgs) -> Result<()> {
        use crate::application::predict_use_case::PredictUseCase;

        let use_case = PredictUseCase::new(args.checkpoint_dir.clone())?;
        let prediction = use_case.predict(args.index)?;

        println!("\nRecord {} @ {}", args.index, prediction.record.timestamp);
        println!("Logged steering:    {:+.4}", prediction.logged);
        println!("Estimated steering: {:+.4}", prediction.estimated);
        Ok(())
    }

    /// Handles the `stats` subcommand.
    fn run_stats(args: StatsArgs) -> Result<()> {
        use crate::application::stats_use_case::{StatsConfig, StatsUseCase};

        let rig = load_rig(args.rig.as_deref())?;
        let use_case = StatsUseCase::new(StatsConfig {
            image_dir: args.image_dir,
            log_dir: args.log_dir,
            work_dir: args.work_dir,
            rig,
            sample_limit: args.sample_limit,
        });

        let steering = use_case.steering_stats()?;
        if steering.records == 0 {
            println!("Merged log contains no records.");
            return Ok(());
        }

        println!("Records:            {}", steering.records);
        println!(
            "Raw steering range: {} ..= {}",
            steering.raw_min, steering.raw_max
        );
        println!("Normalized mean:    {:+.4}", steering.normalized_mean);

        if args.channel_stats {
            println!();
            for stats in use_case.channel_stats()? {
                println!(
                    "{:<6} mean=({:.4}, {:.4}, {:.4})  std=({:.4}, {:.4}, {:.4})",
                    stats.camera,
                    stats.mean[0],
                    stats.mean[1],
                    stats.mean[2],
                    stats.std[0],
                    stats.std[1],
                    stats.std[2],
                );
            }
        }
        Ok(())
    }
}

/// Read a rig override from JSON, or fall back to the built-in values.
fn load_rig(path: Option<&str>) -> Result<RigConfig> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Cannot read rig config '{path}'"))?;
            serde_json::from_str(&json)
                .with_context(|| format!("Cannot parse rig config '{path}'"))
        }
        None => Ok(RigConfig::default()),
    }
}
