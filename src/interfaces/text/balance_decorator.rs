use crate::domain::money::CurrencyCode;
use crate::domain::ports::BalanceDecorator;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use std::collections::{BTreeMap, HashMap};

/// Renders balances and, where a rate is known, their value in the
/// reference currency: `GBP 10 (USD 12.10)`.
#[derive(Debug, Clone)]
pub struct ExchangeRateDecorator {
    reference: CurrencyCode,
    rates: HashMap<CurrencyCode, Decimal>,
}

impl ExchangeRateDecorator {
    pub fn new(reference: CurrencyCode, rates: HashMap<CurrencyCode, Decimal>) -> Self {
        Self { reference, rates }
    }

    /// Static table of rates to USD.
    pub fn usd() -> Self {
        let rates = [
            ("CZK", dec!(0.04)),
            ("GBP", dec!(1.21)),
            ("EUR", dec!(1.11)),
            ("RMB", dec!(0.14)),
            ("HKD", dec!(0.13)),
        ]
        .into_iter()
        .map(|(code, rate)| (CurrencyCode::from_static(code), rate))
        .collect();

        Self::new(CurrencyCode::from_static("USD"), rates)
    }

    pub fn reference(&self) -> &CurrencyCode {
        &self.reference
    }

    /// Converted amount rounded half-up to two decimals, if a rate is known.
    pub fn convert(&self, currency: &CurrencyCode, amount: Decimal) -> Option<Decimal> {
        if *currency == self.reference {
            return None;
        }
        self.rates.get(currency).and_then(|rate| {
            rate.checked_mul(amount)
                .map(|value| value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
        })
    }
}

impl Default for ExchangeRateDecorator {
    fn default() -> Self {
        Self::usd()
    }
}

impl BalanceDecorator for ExchangeRateDecorator {
    fn decorate(&self, balances: &BTreeMap<CurrencyCode, Decimal>) -> String {
        let mut out = String::new();
        for (currency, amount) in balances {
            out.push_str(&format!("{currency} {amount}"));
            if let Some(converted) = self.convert(currency, *amount) {
                out.push_str(&format!(" ({} {converted:.2})", self.reference));
            }
            out.push('\n');
        }
        out
    }
}
