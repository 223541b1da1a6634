use crate::domain::event::Event;
use std::io;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Periodically asks the ledger processor for a snapshot.
///
/// Fixed delay: the next wait only starts once the previous request has
/// been enqueued, so a full queue pushes later firings back instead of
/// letting them pile up.
pub struct SnapshotScheduler {
    queue: mpsc::Sender<Event>,
    interval: Duration,
}

impl SnapshotScheduler {
    pub fn new(queue: mpsc::Sender<Event>, interval: Duration) -> Self {
        Self { queue, interval }
    }

    /// Runs until cancelled or until the input queue closes. Returns the
    /// number of requests enqueued.
    pub async fn run(self, cancel: CancellationToken) -> usize {
        let mut fired = 0;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = sleep(self.interval) => {}
            }

            let sent = tokio::select! {
                _ = cancel.cancelled() => break,
                sent = self.queue.send(Event::SnapshotRequest) => sent,
            };
            if sent.is_err() {
                warn!("input queue closed, stopping snapshot scheduler");
                break;
            }
            fired += 1;
            debug!(fired, "snapshot requested");
        }
        info!(fired, "snapshot scheduler stopped");
        fired
    }

    /// Runs the scheduler on a dedicated thread with its own single
    /// threaded runtime, apart from the worker pool.
    pub fn spawn_dedicated(self, cancel: CancellationToken) -> io::Result<SchedulerHandle> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()?;
        let token = cancel.clone();
        let thread = thread::Builder::new()
            .name("snapshot-scheduler".into())
            .spawn(move || runtime.block_on(self.run(token)))?;
        Ok(SchedulerHandle { cancel, thread })
    }
}

/// Owner of the scheduler thread.
pub struct SchedulerHandle {
    cancel: CancellationToken,
    thread: JoinHandle<usize>,
}

impl SchedulerHandle {
    /// Cancels the scheduler and waits for its thread to exit.
    pub async fn stop(self) -> usize {
        self.cancel.cancel();
        let thread = self.thread;
        match tokio::task::spawn_blocking(move || thread.join()).await {
            Ok(Ok(fired)) => fired,
            _ => {
                warn!("snapshot scheduler thread did not exit cleanly");
                0
            }
        }
    }
}
