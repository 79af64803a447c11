#![forbid(unsafe_code)]
#![warn(
    unused,
    clippy::cognitive_complexity,
    unused_crate_dependencies,
    unused_extern_crates,
    clippy::unused_self,
    clippy::useless_let_if_seq,
    missing_debug_implementations,
    rust_2018_idioms
)]
#![allow(clippy::type_complexity, type_alias_bounds)]

//! # Feedmux-Instrument
//! Feedmux-Instrument contains the core Exchange, Symbol and Market identity data structures
//! shared across the Feedmux ecosystem, plus associated utilities.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Defines the [`ExchangeId`](exchange::ExchangeId) new type identifying an exchange server.
pub mod exchange;

/// [`Symbol`](asset::Symbol) new type representing a currency identifier.
pub mod asset;

/// [`Market`](market::Market) and [`CurrencyPair`](market::CurrencyPair) identifying a tradeable
/// market on an exchange.
pub mod market;

/// [`MarketMetadata`](metadata::MarketMetadata) describing the price and amount scales of a
/// market.
pub mod metadata;

/// Side of a trade or order - Buy or Sell.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    #[serde(alias = "buy", alias = "BUY", alias = "b")]
    Buy,
    #[serde(alias = "sell", alias = "SELL", alias = "s")]
    Sell,
}

impl Display for Side {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Side::Buy => "buy",
                Side::Sell => "sell",
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_de_side() {
        struct TestCase {
            input: &'static str,
            expected: Result<Side, serde_json::Error>,
        }

        let cases = vec![
            TestCase {
                // TC0: Valid lowercase Side::Buy
                input: r#""buy""#,
                expected: Ok(Side::Buy),
            },
            TestCase {
                // TC1: Valid uppercase Side::SELL
                input: r#""SELL""#,
                expected: Ok(Side::Sell),
            },
            TestCase {
                // TC2: Invalid Side
                input: r#""hold""#,
                expected: Err(serde::de::Error::custom("")),
            },
        ];

        for (index, test) in cases.into_iter().enumerate() {
            let actual = serde_json::from_str::<Side>(test.input);
            match (actual, test.expected) {
                (Ok(actual), Ok(expected)) => {
                    assert_eq!(actual, expected, "TC{} failed", index)
                }
                (Err(_), Err(_)) => {
                    // Test passed
                }
                (actual, expected) => {
                    // Test failed
                    panic!("TC{index} failed because actual != expected. \nActual: {actual:?}\nExpected: {expected:?}\n");
                }
            }
        }
    }
}
