use crate::domain::ledger::Snapshot;
use crate::domain::ports::{BalanceDecorator, BalanceDecoratorArc, SnapshotSinkBox};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Renders the non-zero balances of a snapshot, or `None` when every
/// balance is zero.
pub fn render_snapshot(snapshot: &Snapshot, decorator: &dyn BalanceDecorator) -> Option<String> {
    let balances = snapshot.non_zero();
    if balances.is_empty() {
        return None;
    }
    Some(decorator.decorate(&balances))
}

/// Drains the output queue and writes each snapshot to the sink.
pub struct OutputConsumer {
    queue: mpsc::Receiver<Snapshot>,
    decorator: BalanceDecoratorArc,
    sink: SnapshotSinkBox,
}

impl OutputConsumer {
    pub fn new(queue: mpsc::Receiver<Snapshot>, decorator: BalanceDecoratorArc, sink: SnapshotSinkBox) -> Self {
        Self {
            queue,
            decorator,
            sink,
        }
    }

    /// Runs until the queue closes or the token is cancelled. Returns the
    /// number of snapshots written.
    ///
    /// Snapshots already queued are still written after cancellation; the
    /// token is only observed while waiting for an empty queue or a stuck
    /// sink.
    pub async fn run(mut self, cancel: CancellationToken) -> usize {
        let mut written = 0;
        loop {
            let snapshot = tokio::select! {
                biased;
                received = self.queue.recv() => match received {
                    Some(snapshot) => snapshot,
                    None => {
                        debug!("output queue closed");
                        break;
                    }
                },
                _ = cancel.cancelled() => break,
            };

            let Some(rendered) = render_snapshot(&snapshot, self.decorator.as_ref()) else {
                debug!("snapshot has no non-zero balances, nothing to write");
                continue;
            };

            tokio::select! {
                biased;
                result = self.sink.emit(&rendered) => match result {
                    Ok(()) => written += 1,
                    Err(e) => error!("failed to write snapshot: {}", e),
                },
                _ = cancel.cancelled() => {
                    warn!("snapshot write cancelled");
                    break;
                }
            }
        }
        info!(written, "output consumer stopped");
        written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::CurrencyCode;
    use crate::domain::ports::SnapshotSink;
    use crate::infrastructure::in_memory::InMemorySink;
    use crate::interfaces::text::balance_decorator::ExchangeRateDecorator;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::io;
    use std::sync::Arc;
    use std::time::Duration;

    fn snapshot(entries: &[(&str, Decimal)]) -> Snapshot {
        entries
            .iter()
            .map(|(c, a)| (CurrencyCode::new(c).unwrap(), *a))
            .collect()
    }

    fn consumer(queue: mpsc::Receiver<Snapshot>, sink: SnapshotSinkBox) -> OutputConsumer {
        OutputConsumer::new(queue, Arc::new(ExchangeRateDecorator::usd()), sink)
    }

    struct StalledSink;

    #[async_trait]
    impl SnapshotSink for StalledSink {
        async fn emit(&mut self, _rendered: &str) -> io::Result<()> {
            std::future::pending().await
        }
    }

    struct BrokenSink;

    #[async_trait]
    impl SnapshotSink for BrokenSink {
        async fn emit(&mut self, _rendered: &str) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn test_render_filters_zero_balances() {
        let rendered = render_snapshot(
            &snapshot(&[("USD", dec!(100)), ("CZK", dec!(0))]),
            &ExchangeRateDecorator::usd(),
        );
        assert_eq!(rendered.as_deref(), Some("USD 100\n"));
    }

    #[test]
    fn test_render_all_zero_is_none() {
        let decorator = ExchangeRateDecorator::usd();
        assert_eq!(render_snapshot(&snapshot(&[("USD", dec!(0.00))]), &decorator), None);
        assert_eq!(render_snapshot(&Snapshot::default(), &decorator), None);
    }

    #[test]
    fn test_render_converts_with_rate() {
        let rendered = render_snapshot(&snapshot(&[("GBP", dec!(10))]), &ExchangeRateDecorator::usd());
        assert_eq!(rendered.as_deref(), Some("GBP 10 (USD 12.10)\n"));
    }

    #[tokio::test]
    async fn test_writes_each_snapshot_until_queue_closes() {
        let (tx, rx) = mpsc::channel(4);
        let sink = InMemorySink::new();

        tx.send(snapshot(&[("USD", dec!(11))])).await.unwrap();
        tx.send(snapshot(&[("USD", dec!(0))])).await.unwrap();
        tx.send(snapshot(&[("USD", dec!(11)), ("HKD", dec!(100))])).await.unwrap();
        drop(tx);

        let written = consumer(rx, Box::new(sink.clone())).run(CancellationToken::new()).await;
        assert_eq!(written, 2);
        assert_eq!(
            sink.blocks().await,
            vec!["USD 11\n", "HKD 100 (USD 13.00)\nUSD 11\n"]
        );
    }

    #[tokio::test]
    async fn test_cancel_while_waiting_on_empty_queue() {
        let (_tx, rx) = mpsc::channel::<Snapshot>(4);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(consumer(rx, Box::new(InMemorySink::new())).run(cancel.clone()));

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!task.is_finished());
        cancel.cancel();
        assert_eq!(task.await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_queued_snapshots_flushed_before_cancellation() {
        let (tx, rx) = mpsc::channel(4);
        let sink = InMemorySink::new();
        let cancel = CancellationToken::new();

        tx.send(snapshot(&[("EUR", dec!(1))])).await.unwrap();
        tx.send(snapshot(&[("EUR", dec!(2))])).await.unwrap();
        cancel.cancel();

        let written = consumer(rx, Box::new(sink.clone())).run(cancel).await;
        assert_eq!(written, 2);
        assert_eq!(sink.blocks().await.len(), 2);
        drop(tx);
    }

    #[tokio::test]
    async fn test_cancel_unblocks_stalled_sink() {
        let (tx, rx) = mpsc::channel(4);
        let cancel = CancellationToken::new();
        tx.send(snapshot(&[("USD", dec!(1))])).await.unwrap();

        let task = tokio::spawn(consumer(rx, Box::new(StalledSink)).run(cancel.clone()));
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!task.is_finished());

        cancel.cancel();
        assert_eq!(task.await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_sink_error_is_not_fatal() {
        let (tx, rx) = mpsc::channel(4);
        tx.send(snapshot(&[("USD", dec!(1))])).await.unwrap();
        tx.send(snapshot(&[("USD", dec!(2))])).await.unwrap();
        drop(tx);

        let written = consumer(rx, Box::new(BrokenSink)).run(CancellationToken::new()).await;
        assert_eq!(written, 0);
    }
}
