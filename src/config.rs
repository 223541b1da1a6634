use crate::error::{Result, TrackerError};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_INPUT_CAPACITY: usize = 50;
pub const DEFAULT_OUTPUT_CAPACITY: usize = 20;
pub const DEFAULT_WORKER_THREADS: usize = 3;
pub const DEFAULT_SNAPSHOT_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_SHUTDOWN_GRACE_SECS: u64 = 10;

/// Sizing and timing of the payment pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Batch file ingested before interactive input is read.
    pub input_file: Option<PathBuf>,
    /// Capacity of the event queue feeding the ledger processor.
    pub input_capacity: usize,
    /// Capacity of the snapshot queue feeding the output consumer.
    pub output_capacity: usize,
    /// Worker threads of the runtime running ingest, processor and output.
    pub worker_threads: usize,
    /// Delay between the end of one snapshot request and the next.
    pub snapshot_interval: Duration,
    /// Time the ledger processor gets to stop after shutdown is requested.
    pub shutdown_grace: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_file: None,
            input_capacity: DEFAULT_INPUT_CAPACITY,
            output_capacity: DEFAULT_OUTPUT_CAPACITY,
            worker_threads: DEFAULT_WORKER_THREADS,
            snapshot_interval: Duration::from_secs(DEFAULT_SNAPSHOT_INTERVAL_SECS),
            shutdown_grace: Duration::from_secs(DEFAULT_SHUTDOWN_GRACE_SECS),
        }
    }
}

impl PipelineConfig {
    /// An empty path means no batch file.
    pub fn with_input_file(mut self, path: Option<PathBuf>) -> Self {
        self.input_file = path.filter(|p| !p.as_os_str().is_empty());
        self
    }

    pub fn with_input_capacity(mut self, capacity: usize) -> Self {
        self.input_capacity = capacity;
        self
    }

    pub fn with_output_capacity(mut self, capacity: usize) -> Self {
        self.output_capacity = capacity;
        self
    }

    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = threads;
        self
    }

    pub fn with_snapshot_interval(mut self, interval: Duration) -> Self {
        self.snapshot_interval = interval;
        self
    }

    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    /// Rejects values the pipeline cannot run with. Channels need a
    /// non-zero capacity and a zero interval would spin the scheduler.
    pub fn validate(&self) -> Result<()> {
        if self.input_capacity == 0 {
            return Err(TrackerError::Config("input capacity must be positive".into()));
        }
        if self.output_capacity == 0 {
            return Err(TrackerError::Config("output capacity must be positive".into()));
        }
        if self.worker_threads == 0 {
            return Err(TrackerError::Config("worker threads must be positive".into()));
        }
        if self.snapshot_interval.is_zero() {
            return Err(TrackerError::Config("snapshot interval must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.input_file, None);
        assert_eq!(config.input_capacity, 50);
        assert_eq!(config.output_capacity, 20);
        assert_eq!(config.worker_threads, 3);
        assert_eq!(config.snapshot_interval, Duration::from_secs(60));
        assert_eq!(config.shutdown_grace, Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_input_file_means_none() {
        let config = PipelineConfig::default().with_input_file(Some(PathBuf::new()));
        assert_eq!(config.input_file, None);

        let config = PipelineConfig::default().with_input_file(Some("payments.txt".into()));
        assert_eq!(config.input_file, Some(PathBuf::from("payments.txt")));
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let invalid = [
            PipelineConfig::default().with_input_capacity(0),
            PipelineConfig::default().with_output_capacity(0),
            PipelineConfig::default().with_worker_threads(0),
            PipelineConfig::default().with_snapshot_interval(Duration::ZERO),
        ];
        for config in invalid {
            assert!(matches!(config.validate(), Err(TrackerError::Config(_))));
        }
    }
}
