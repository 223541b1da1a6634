use super::money::{CurrencyCode, Money};
use crate::error::{Result, TrackerError};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

/// Running per-currency balances.
///
/// Owned by exactly one ledger processor. It is deliberately not `Clone`:
/// the only way to hand balances to another task is through [`Snapshot`].
#[derive(Debug, Default)]
pub struct Ledger {
    balances: HashMap<CurrencyCode, Decimal>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the payment amount to the balance of its currency.
    ///
    /// On overflow the ledger is left untouched.
    pub fn add_payment(&mut self, payment: &Money) -> Result<&mut Self> {
        let current = self.balance(&payment.currency);
        let updated = current
            .checked_add(payment.amount)
            .ok_or_else(|| TrackerError::Overflow(payment.currency.to_string()))?;
        self.balances.insert(payment.currency.clone(), updated);
        Ok(self)
    }

    /// Balance for a currency; absent currencies are zero.
    pub fn balance(&self, currency: &CurrencyCode) -> Decimal {
        self.balances.get(currency).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn balances(&self) -> &HashMap<CurrencyCode, Decimal> {
        &self.balances
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    /// Point-in-time copy of the balances, detached from the ledger.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            balances: self
                .balances
                .iter()
                .map(|(currency, amount)| (currency.clone(), *amount))
                .collect(),
        }
    }
}

/// Immutable copy of ledger balances, ordered by currency code.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Snapshot {
    balances: BTreeMap<CurrencyCode, Decimal>,
}

impl Snapshot {
    pub fn balances(&self) -> &BTreeMap<CurrencyCode, Decimal> {
        &self.balances
    }

    pub fn get(&self, currency: &CurrencyCode) -> Option<Decimal> {
        self.balances.get(currency).copied()
    }

    /// Balances that are not exactly zero, whatever their scale.
    pub fn non_zero(&self) -> BTreeMap<CurrencyCode, Decimal> {
        self.balances
            .iter()
            .filter(|(_, amount)| !amount.is_zero())
            .map(|(currency, amount)| (currency.clone(), *amount))
            .collect()
    }
}

impl FromIterator<(CurrencyCode, Decimal)> for Snapshot {
    fn from_iter<T: IntoIterator<Item = (CurrencyCode, Decimal)>>(iter: T) -> Self {
        Self {
            balances: iter.into_iter().collect(),
        }
    }
}
