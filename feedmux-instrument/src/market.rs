use crate::{asset::Symbol, exchange::ExchangeId};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// A base and quote currency combination identifying a tradeable pair.
///
/// eg/ CurrencyPair { base: "btc", quote: "usdt" }
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize)]
pub struct CurrencyPair {
    pub base: Symbol,
    pub quote: Symbol,
}

impl CurrencyPair {
    /// Constructs a new [`CurrencyPair`] using the provided base and quote currencies.
    pub fn new<S>(base: S, quote: S) -> Self
    where
        S: Into<Symbol>,
    {
        Self {
            base: base.into(),
            quote: quote.into(),
        }
    }
}

impl Display for CurrencyPair {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

impl<S> From<(S, S)> for CurrencyPair
where
    S: Into<Symbol>,
{
    fn from((base, quote): (S, S)) -> Self {
        Self::new(base, quote)
    }
}

/// Represents a unique combination of an [`ExchangeId`] & a [`CurrencyPair`] - one tradeable
/// market on one exchange.
///
/// eg/ Market { exchange: "binance", pair: "btc/usdt" }
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize)]
pub struct Market {
    pub exchange: ExchangeId,
    #[serde(flatten)]
    pub pair: CurrencyPair,
}

impl Market {
    /// Constructs a new [`Market`] using the provided [`ExchangeId`] & [`CurrencyPair`].
    pub fn new<E, P>(exchange: E, pair: P) -> Self
    where
        E: Into<ExchangeId>,
        P: Into<CurrencyPair>,
    {
        Self {
            exchange: exchange.into(),
            pair: pair.into(),
        }
    }
}

impl Display for Market {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.exchange, self.pair)
    }
}

impl<E, S> From<(E, S, S)> for Market
where
    E: Into<ExchangeId>,
    S: Into<Symbol>,
{
    fn from((exchange, base, quote): (E, S, S)) -> Self {
        Self::new(exchange, (base, quote))
    }
}
