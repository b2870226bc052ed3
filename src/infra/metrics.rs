// ============================================================
// Layer 6 - Metrics Logger
// ============================================================
// Appends one CSV row per training epoch:
//
//   epoch,train_loss,steps
//   1,0.693147,2
//   2,0.681022,2
//
// Output file: <output_dir>/metrics.csv. An existing file is
// appended to, so several runs into the same directory stack up.

use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const METRICS_FILE: &str = "metrics.csv";

/// One row of metrics data for a single training epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// The epoch number (starts at 1)
    pub epoch: usize,

    /// Mean cross-entropy over the epoch's mini-batches
    pub train_loss: f64,

    /// Optimizer steps taken in the epoch
    pub steps: usize,
}

impl EpochMetrics {
    pub fn new(epoch: usize, train_loss: f64, steps: usize) -> Self {
        Self {
            epoch,
            train_loss,
            steps,
        }
    }
}

pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create the directory and the CSV header if needed.
    pub fn new(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir).map_err(|e| Error::persistence(dir, e))?;

        let csv_path = dir.join(METRICS_FILE);
        if !csv_path.exists() {
            fs::write(&csv_path, "epoch,train_loss,steps\n")
                .map_err(|e| Error::persistence(&csv_path, e))?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .map_err(|e| Error::persistence(&self.csv_path, e))?;

        writeln!(f, "{},{:.6},{}", m.epoch, m.train_loss, m.steps)
            .map_err(|e| Error::persistence(&self.csv_path, e))?;

        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_are_appended_after_header() {
        let dir = tempfile::tempdir().unwrap();
        let logger = MetricsLogger::new(dir.path()).unwrap();
        logger.log(&EpochMetrics::new(1, 0.75, 2)).unwrap();
        logger.log(&EpochMetrics::new(2, 0.5, 2)).unwrap();

        let csv = fs::read_to_string(logger.csv_path()).unwrap();
        assert_eq!(
            csv,
            "epoch,train_loss,steps\n1,0.750000,2\n2,0.500000,2\n"
        );
    }

    #[test]
    fn test_second_logger_keeps_existing_rows() {
        let dir = tempfile::tempdir().unwrap();
        MetricsLogger::new(dir.path())
            .unwrap()
            .log(&EpochMetrics::new(1, 1.0, 1))
            .unwrap();
        let logger = MetricsLogger::new(dir.path()).unwrap();
        logger.log(&EpochMetrics::new(1, 0.9, 1)).unwrap();

        let csv = fs::read_to_string(logger.csv_path()).unwrap();
        assert_eq!(csv.lines().count(), 3);
    }
}
