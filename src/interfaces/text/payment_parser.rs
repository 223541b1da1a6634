use crate::domain::money::{CurrencyCode, Money};
use crate::domain::ports::PaymentParser;
use crate::error::ParseError;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::LazyLock;

static PAYMENT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Z]{3})[ \t]+(-?[0-9]+(?:\.[0-9]{1,2})?)$").expect("payment line pattern is valid")
});

/// Parses lines of the form `USD 1000` or `USD -1000.50`.
///
/// The whole line must match: no leading whitespace, no trailing text, at
/// most two fractional digits and a digit after any decimal point.
#[derive(Debug, Default, Clone, Copy)]
pub struct RegexPaymentParser;

impl RegexPaymentParser {
    pub fn new() -> Self {
        Self
    }
}

impl PaymentParser for RegexPaymentParser {
    fn parse(&self, line: &str) -> Result<Money, ParseError> {
        let captures = PAYMENT_LINE
            .captures(line)
            .ok_or_else(|| ParseError::InvalidLine(line.to_owned()))?;

        let currency = CurrencyCode::new(&captures[1])
            .map_err(|_| ParseError::InvalidLine(line.to_owned()))?;
        let amount = Decimal::from_str(&captures[2])
            .map_err(|_| ParseError::AmountOutOfRange(line.to_owned()))?;

        Ok(Money::new(currency, amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn parse(line: &str) -> Result<Money, ParseError> {
        RegexPaymentParser::new().parse(line)
    }

    #[test]
    fn test_valid_line() {
        let payment = parse("USD 1000").unwrap();
        assert_eq!(payment.currency.as_str(), "USD");
        assert_eq!(payment.amount, dec!(1000));
    }

    #[test]
    fn test_negative_line() {
        let payment = parse("USD -1000").unwrap();
        assert_eq!(payment.amount, dec!(-1000));
    }

    #[test]
    fn test_negative_with_decimals() {
        assert_eq!(parse("USD -1000.0").unwrap().amount, dec!(-1000.0));
        let payment = parse("USD -1000.50").unwrap();
        assert_eq!(payment.amount.to_string(), "-1000.50");
    }

    #[test]
    fn test_multiple_separating_spaces() {
        assert_eq!(parse("GBP    12.5").unwrap().amount, dec!(12.5));
    }

    #[test]
    fn test_invalid_lines() {
        for line in [
            "US 1000",
            "USD 1000.",
            "USD .",
            " USD 1000",
            "USD 1000 ",
            "usd 1000",
            "USD1000",
            "USD 1000.123",
            "USD +1000",
            "USD --1",
            "USD",
            "",
            "quit",
        ] {
            assert_eq!(
                parse(line),
                Err(ParseError::InvalidLine(line.to_owned())),
                "{line:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_amount_beyond_decimal_range() {
        let line = format!("USD {}", "9".repeat(40));
        assert_eq!(parse(&line), Err(ParseError::AmountOutOfRange(line.clone())));
    }
}
