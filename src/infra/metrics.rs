// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records training metrics to a CSV file after each epoch.
//
// Metrics recorded per epoch:
//   - epoch:      the epoch number (1, 2, 3, ...)
//   - train_loss: average MSE loss on the training set
//   - val_loss:   average MSE loss on the validation set
//   - accuracy:   fraction of validation predictions within the
//                 configured threshold of the logged steering
//
// Output file: checkpoints/metrics.csv
//
// Example CSV output:
//   epoch,train_loss,val_loss,accuracy
//   1,0.182400,0.164900,0.213000
//   2,0.094100,0.088300,0.402000
//   ...
//
// If val_loss rises while train_loss keeps falling the model is
// overfitting the recorded drive.
//
// Reference: Rust Book §9 (Error Handling)
//            Rust Book §12 (I/O and File Handling)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};

/// One epoch's worth of training numbers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// Epoch number, starting at 1
    pub epoch: usize,

    /// Average MSE loss over the training batches
    pub train_loss: f64,

    /// Average MSE loss over the validation batches
    pub val_loss: f64,

    /// Fraction of validation predictions that landed within the
    /// accuracy threshold of the logged steering, in [0.0, 1.0]
    pub accuracy: f64,
}

impl EpochMetrics {
    pub fn new(epoch: usize, train_loss: f64, val_loss: f64, accuracy: f64) -> Self {
        Self {
            epoch,
            train_loss,
            val_loss,
            accuracy,
        }
    }

    /// True when this epoch beat the best validation loss seen so far.
    pub fn is_improvement(&self, best_val_loss: f64) -> bool {
        self.val_loss < best_val_loss
    }
}

/// Appends epoch metrics to a CSV file, one row per epoch.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Open (or start) the metrics CSV inside `dir`. A fresh file gets
    /// the header row; an existing one is appended to, so interrupted
    /// runs restarted against the same directory share one log.
    pub fn new(dir: impl Into<String>) -> Result<Self> {
        let dir = PathBuf::from(dir.into());
        fs::create_dir_all(&dir)?;

        let csv_path = dir.join("metrics.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "epoch,train_loss,val_loss,accuracy")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one epoch's row.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new().append(true).open(&self.csv_path)?;
        writeln!(
            f,
            "{},{:.6},{:.6},{:.6}",
            m.epoch, m.train_loss, m.val_loss, m.accuracy,
        )?;

        tracing::debug!(
            "Logged epoch {}: train_loss={:.4}, val_loss={:.4}, accuracy={:.3}",
            m.epoch,
            m.train_loss,
            m.val_loss,
            m.accuracy,
        );
        Ok(())
    }

    /// Path of the metrics CSV.
    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_is_improvement() {
        let m = EpochMetrics::new(2, 0.09, 0.08, 0.4);
        assert!(m.is_improvement(0.1));
        assert!(!m.is_improvement(0.05));
    }

    #[test]
    fn test_rows_append_under_one_header() {
        let dir = tempdir().unwrap();
        let logger = MetricsLogger::new(dir.path().to_str().unwrap()).unwrap();

        logger.log(&EpochMetrics::new(1, 0.2, 0.18, 0.2)).unwrap();
        logger.log(&EpochMetrics::new(2, 0.1, 0.09, 0.4)).unwrap();

        let content = fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "epoch,train_loss,val_loss,accuracy");
        assert!(lines[2].starts_with("2,"));
    }
}
