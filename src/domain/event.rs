use super::money::Money;

/// A unit of work on the input queue.
///
/// The ledger processor matches on this exhaustively, so adding a variant
/// forces every consumer to decide how to handle it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Accumulate a payment into the ledger.
    Add(Money),
    /// Publish a copy of the current balances to the output queue.
    SnapshotRequest,
    /// Poison pill: the processor stops after observing it.
    Shutdown,
}

impl Event {
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Add(_) => "add",
            Event::SnapshotRequest => "snapshot_request",
            Event::Shutdown => "shutdown",
        }
    }
}
