use std::time::Duration;
use thiserror::Error;

/// Rejection of a single payment line. The line is skipped, never enqueued.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid payment line: {0}")]
    InvalidLine(String),
    #[error("Amount out of range in payment line: {0}")]
    AmountOutOfRange(String),
}

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("IO error on {origin}: {source}")]
    Io {
        origin: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Queue closed: {0}")]
    QueueClosed(&'static str),
    #[error("Ledger processor did not stop within {0:?}")]
    ProcessorTimeout(Duration),
    #[error("Balance overflow for {0}")]
    Overflow(String),
    #[error("Invalid currency code: {0}")]
    InvalidCurrency(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, TrackerError>;
