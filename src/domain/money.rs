use crate::error::TrackerError;
use rust_decimal::Decimal;
use std::fmt;

/// A three letter, upper case currency code such as `USD`.
///
/// Comparison is by content, so two codes built from separate strings are
/// always equal when their letters are.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: &str) -> Result<Self, TrackerError> {
        if code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase()) {
            Ok(Self(code.to_owned()))
        } else {
            Err(TrackerError::InvalidCurrency(code.to_owned()))
        }
    }

    /// For codes known at compile time; only checked in debug builds.
    pub(crate) fn from_static(code: &'static str) -> Self {
        debug_assert!(code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase()));
        Self(code.to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A currency paired with an exact decimal amount. Amounts may be negative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Money {
    pub currency: CurrencyCode,
    pub amount: Decimal,
}

impl Money {
    pub fn new(currency: CurrencyCode, amount: Decimal) -> Self {
        Self { currency, amount }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.currency, self.amount)
    }
}
