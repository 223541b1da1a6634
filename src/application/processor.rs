use crate::domain::event::Event;
use crate::domain::ledger::{Ledger, Snapshot};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Why the processor left its loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A `Shutdown` event was dequeued.
    Shutdown,
    /// Every producer dropped its end of the input queue.
    InputClosed,
}

/// Single consumer of the input queue and sole owner of the [`Ledger`].
///
/// Other tasks only ever see balances through snapshots placed on the
/// output queue, so the ledger needs no locking. The processor is running
/// while [`LedgerProcessor::run`] is pending and stopped once it returns.
pub struct LedgerProcessor {
    input: mpsc::Receiver<Event>,
    output: mpsc::Sender<Snapshot>,
    ledger: Ledger,
}

impl LedgerProcessor {
    pub fn new(input: mpsc::Receiver<Event>, output: mpsc::Sender<Snapshot>) -> Self {
        Self {
            input,
            output,
            ledger: Ledger::new(),
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Processes events until `Shutdown` or until the input queue closes.
    ///
    /// Events still queued behind `Shutdown` are never applied. Dropping the
    /// processor on return closes the output queue.
    pub async fn run(mut self) -> (StopReason, Ledger) {
        let reason = loop {
            let Some(event) = self.input.recv().await else {
                warn!("input queue closed, stopping ledger processor");
                break StopReason::InputClosed;
            };
            debug!(kind = event.kind(), "processing event");

            match event {
                Event::Add(payment) => {
                    if let Err(e) = self.ledger.add_payment(&payment) {
                        error!(%payment, "payment dropped: {}", e);
                    }
                }
                Event::SnapshotRequest => self.publish_snapshot().await,
                Event::Shutdown => break StopReason::Shutdown,
            }
        };

        info!(?reason, currencies = self.ledger.balances().len(), "ledger processor stopped");
        (reason, self.ledger)
    }

    async fn publish_snapshot(&mut self) {
        let snapshot = self.ledger.snapshot();
        debug!(currencies = snapshot.balances().len(), "publishing snapshot");
        if self.output.send(snapshot).await.is_err() {
            warn!("output queue closed, snapshot discarded");
        }
    }
}
