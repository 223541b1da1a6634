//! Domain types: payments, pipeline events, the ledger and the seams
//! through which the pipeline talks to parsing, rendering and output.

pub mod event;
pub mod ledger;
pub mod money;
pub mod ports;
