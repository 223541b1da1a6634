use crate::domain::event::Event;
use crate::domain::ports::PaymentParserArc;
use crate::error::{ParseError, Result, TrackerError};
use std::fmt;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Line that ends interactive input. Matched exactly.
pub const QUIT_COMMAND: &str = "quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestSource {
    File,
    Interactive,
}

impl fmt::Display for IngestSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestSource::File => f.write_str("file"),
            IngestSource::Interactive => f.write_str("interactive"),
        }
    }
}

/// Counts of lines turned into events and lines dropped as invalid.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestSummary {
    pub accepted: usize,
    pub rejected: usize,
}

/// Producer that turns text lines into `Add` events on the input queue.
///
/// Invalid lines are logged and skipped. Enqueueing waits while the queue is
/// full, so a slow ledger processor throttles reading.
pub struct LineIngest {
    source: IngestSource,
    parser: PaymentParserArc,
    queue: mpsc::Sender<Event>,
}

impl LineIngest {
    pub fn new(source: IngestSource, parser: PaymentParserArc, queue: mpsc::Sender<Event>) -> Self {
        Self {
            source,
            parser,
            queue,
        }
    }

    pub fn file(parser: PaymentParserArc, queue: mpsc::Sender<Event>) -> Self {
        Self::new(IngestSource::File, parser, queue)
    }

    pub fn interactive(parser: PaymentParserArc, queue: mpsc::Sender<Event>) -> Self {
        Self::new(IngestSource::Interactive, parser, queue)
    }

    /// Reads until end of input, or until `quit` for interactive input.
    ///
    /// Lines that are not valid UTF-8 are rejected like any other invalid
    /// line; only a failing read ends the ingest with an error.
    pub async fn run<R>(self, mut reader: R) -> Result<IngestSummary>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut summary = IngestSummary::default();
        let mut buf = Vec::new();

        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .await
                .map_err(|source| TrackerError::Io {
                    origin: format!("{} input", self.source),
                    source,
                })?;
            if read == 0 {
                break;
            }

            let raw = strip_line_ending(&buf);
            let Ok(line) = std::str::from_utf8(raw) else {
                let e = ParseError::InvalidLine(String::from_utf8_lossy(raw).into_owned());
                warn!(source = %self.source, "{}", e);
                summary.rejected += 1;
                continue;
            };

            if self.source == IngestSource::Interactive && line == QUIT_COMMAND {
                debug!(source = %self.source, "quit command received");
                break;
            }
            if line.is_empty() {
                continue;
            }

            match self.parser.parse(line) {
                Ok(payment) => {
                    debug!(source = %self.source, %payment, "enqueueing payment");
                    self.queue
                        .send(Event::Add(payment))
                        .await
                        .map_err(|_| TrackerError::QueueClosed("input"))?;
                    summary.accepted += 1;
                }
                Err(e) => {
                    warn!(source = %self.source, "{}", e);
                    summary.rejected += 1;
                }
            }
        }

        info!(
            source = %self.source,
            accepted = summary.accepted,
            rejected = summary.rejected,
            "ingest finished"
        );
        Ok(summary)
    }
}

/// Drops a trailing `\n` or `\r\n`.
fn strip_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Ingests a batch file. Failing to open it ends the ingest with an error
/// and no events.
pub async fn ingest_file(
    path: &Path,
    parser: PaymentParserArc,
    queue: mpsc::Sender<Event>,
) -> Result<IngestSummary> {
    let file = File::open(path).await.map_err(|source| TrackerError::Io {
        origin: path.display().to_string(),
        source,
    })?;
    LineIngest::file(parser, queue).run(BufReader::new(file)).await
}
