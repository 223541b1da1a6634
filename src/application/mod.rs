//! The concurrent pipeline.
//!
//! Producers (file and interactive ingest, the snapshot scheduler) feed a
//! bounded input queue. A single [`processor::LedgerProcessor`] owns the
//! ledger and publishes snapshots to a bounded output queue, which the
//! [`output::OutputConsumer`] renders. [`pipeline::Pipeline`] starts the
//! pieces and runs the shutdown protocol.

pub mod ingest;
pub mod output;
pub mod pipeline;
pub mod processor;
pub mod scheduler;
