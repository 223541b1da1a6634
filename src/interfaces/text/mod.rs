//! Plain text adapters: the payment line grammar and the console rendering
//! of balances.

pub mod balance_decorator;
pub mod payment_parser;
