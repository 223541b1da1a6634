use super::money::{CurrencyCode, Money};
use crate::error::ParseError;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::io;

/// Turns one line of text into a payment.
pub trait PaymentParser: Send + Sync {
    fn parse(&self, line: &str) -> Result<Money, ParseError>;
}

/// Renders non-zero balances, one line per currency.
pub trait BalanceDecorator: Send + Sync {
    fn decorate(&self, balances: &BTreeMap<CurrencyCode, Decimal>) -> String;
}

/// Destination for rendered snapshots.
#[async_trait]
pub trait SnapshotSink: Send {
    /// Writes a rendered block and flushes it.
    async fn emit(&mut self, rendered: &str) -> io::Result<()>;
}

pub type PaymentParserArc = std::sync::Arc<dyn PaymentParser>;
pub type BalanceDecoratorArc = std::sync::Arc<dyn BalanceDecorator>;
pub type SnapshotSinkBox = Box<dyn SnapshotSink>;
