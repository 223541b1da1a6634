use super::ingest::{IngestSummary, LineIngest, ingest_file};
use super::output::OutputConsumer;
use super::processor::{LedgerProcessor, StopReason};
use super::scheduler::{SchedulerHandle, SnapshotScheduler};
use crate::config::PipelineConfig;
use crate::domain::event::Event;
use crate::domain::ledger::{Ledger, Snapshot};
use crate::domain::ports::{BalanceDecoratorArc, PaymentParserArc, SnapshotSinkBox};
use crate::error::{Result, TrackerError};
use crate::interfaces::text::balance_decorator::ExchangeRateDecorator;
use crate::interfaces::text::payment_parser::RegexPaymentParser;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncBufRead;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, timeout, timeout_at};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// How the ledger processor ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorOutcome {
    /// Left its loop on its own within the grace period.
    Stopped(StopReason),
    /// Did not stop in time and was aborted.
    Cancelled,
    /// Panicked.
    Failed,
}

/// What happened during a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShutdownReport {
    pub file: Option<IngestSummary>,
    pub interactive: Option<IngestSummary>,
    pub processor: ProcessorOutcome,
    /// Ledger balances at the moment the processor stopped.
    pub final_balances: Option<Snapshot>,
    pub snapshots_requested: usize,
    pub snapshots_written: usize,
}

/// Wires producers, the ledger processor and the output consumer together
/// over two bounded queues and tears them down in a fixed order.
pub struct Pipeline {
    config: PipelineConfig,
    parser: PaymentParserArc,
    decorator: BalanceDecoratorArc,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            parser: Arc::new(RegexPaymentParser::new()),
            decorator: Arc::new(ExchangeRateDecorator::usd()),
        }
    }

    pub fn with_parser(mut self, parser: PaymentParserArc) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_decorator(mut self, decorator: BalanceDecoratorArc) -> Self {
        self.decorator = decorator;
        self
    }

    /// Runs the pipeline until interactive input ends, then shuts it down.
    ///
    /// The batch file, if any, is fully ingested before interactive input
    /// is read.
    pub async fn run<R>(self, interactive: R, sink: SnapshotSinkBox) -> Result<ShutdownReport>
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        self.config.validate()?;
        let Pipeline {
            config,
            parser,
            decorator,
        } = self;

        let (input_tx, input_rx) = mpsc::channel(config.input_capacity);
        let (output_tx, output_rx) = mpsc::channel(config.output_capacity);
        let cancel = CancellationToken::new();

        let processor = tokio::spawn(LedgerProcessor::new(input_rx, output_tx).run());
        info!("ledger processor started");

        let file = match config.input_file.clone() {
            Some(path) => {
                let (parser, queue) = (parser.clone(), input_tx.clone());
                let ingest = tokio::spawn(async move { ingest_file(&path, parser, queue).await });
                join_ingest("file", ingest).await
            }
            None => None,
        };

        let interactive_task = tokio::spawn(LineIngest::interactive(parser, input_tx.clone()).run(interactive));

        let scheduler = match SnapshotScheduler::new(input_tx.clone(), config.snapshot_interval)
            .spawn_dedicated(cancel.child_token())
        {
            Ok(handle) => Some(handle),
            Err(e) => {
                error!("snapshot scheduler could not start: {}", e);
                None
            }
        };

        let consumer = tokio::spawn(OutputConsumer::new(output_rx, decorator, sink).run(cancel.child_token()));
        info!("pipeline running");

        let interactive = join_ingest("interactive", interactive_task).await;

        let teardown = RunningPipeline {
            input: input_tx,
            processor,
            scheduler,
            consumer,
            cancel,
        }
        .shutdown(config.shutdown_grace)
        .await;

        Ok(ShutdownReport {
            file,
            interactive,
            processor: teardown.processor,
            final_balances: teardown.final_balances,
            snapshots_requested: teardown.snapshots_requested,
            snapshots_written: teardown.snapshots_written,
        })
    }
}

async fn join_ingest(name: &str, handle: JoinHandle<Result<IngestSummary>>) -> Option<IngestSummary> {
    match handle.await {
        Ok(Ok(summary)) => Some(summary),
        Ok(Err(e)) => {
            error!("{} ingest failed: {}", name, e);
            None
        }
        Err(e) => {
            error!("{} ingest task failed: {}", name, e);
            None
        }
    }
}

/// Handles to the long running parts of a started pipeline.
struct RunningPipeline {
    input: mpsc::Sender<Event>,
    processor: JoinHandle<(StopReason, Ledger)>,
    scheduler: Option<SchedulerHandle>,
    consumer: JoinHandle<usize>,
    cancel: CancellationToken,
}

struct Teardown {
    processor: ProcessorOutcome,
    final_balances: Option<Snapshot>,
    snapshots_requested: usize,
    snapshots_written: usize,
}

impl RunningPipeline {
    /// Sends the poison pill, gives the processor `grace` to stop, then
    /// cancels the scheduler and the output consumer.
    async fn shutdown(self, grace: Duration) -> Teardown {
        let RunningPipeline {
            input,
            mut processor,
            scheduler,
            mut consumer,
            cancel,
        } = self;
        let deadline = Instant::now() + grace;

        info!("sending shutdown event");
        match timeout_at(deadline, input.send(Event::Shutdown)).await {
            Ok(Ok(())) => {}
            Ok(Err(_)) => warn!("input queue closed, shutdown event not delivered"),
            Err(_) => error!("input queue full, shutdown event not delivered"),
        }
        drop(input);

        let (outcome, final_balances) = match timeout_at(deadline, &mut processor).await {
            Ok(Ok((reason, ledger))) => (ProcessorOutcome::Stopped(reason), Some(ledger.snapshot())),
            Ok(Err(e)) => {
                error!("ledger processor failed: {}", e);
                (ProcessorOutcome::Failed, None)
            }
            Err(_) => {
                error!("{}, forcing cancellation", TrackerError::ProcessorTimeout(grace));
                processor.abort();
                match processor.await {
                    Ok((reason, ledger)) => (ProcessorOutcome::Stopped(reason), Some(ledger.snapshot())),
                    Err(_) => (ProcessorOutcome::Cancelled, None),
                }
            }
        };

        cancel.cancel();
        let snapshots_requested = match scheduler {
            Some(handle) => handle.stop().await,
            None => 0,
        };
        let snapshots_written = match timeout(grace, &mut consumer).await {
            Ok(Ok(written)) => written,
            Ok(Err(e)) => {
                error!("output consumer failed: {}", e);
                0
            }
            Err(_) => {
                warn!("output consumer did not stop, aborting it");
                consumer.abort();
                0
            }
        };

        info!(?outcome, snapshots_requested, snapshots_written, "pipeline shut down");
        Teardown {
            processor: outcome,
            final_balances,
            snapshots_requested,
            snapshots_written,
        }
    }
}
