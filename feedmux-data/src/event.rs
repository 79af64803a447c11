use crate::subscription::{
    book::OrderBook,
    order::{OpenOrders, TradeHistory},
    ticker::Ticker,
    trade::PublicTrade,
};
use chrono::{DateTime, Utc};
use derive_more::From;
use feedmux_instrument::market::Market;
use serde::{Deserialize, Serialize};

/// Normalised Feedmux [`MarketEvent<T>`](Self) wrapping the `T` data variant in metadata.
///
/// The embedded [`Market`] always matches the [`Subscription`](crate::subscription::Subscription)
/// the event originates from, so consumers filter by [`Market`] equality.
///
/// Note: `T` can be the [`MarketDataKind`] enum if an erased event type is required.
#[derive(Clone, PartialEq, Debug, Deserialize, Serialize)]
pub struct MarketEvent<T = MarketDataKind> {
    pub time_received: DateTime<Utc>,
    pub market: Market,
    pub kind: T,
}

impl<T> MarketEvent<T> {
    /// Construct a new [`MarketEvent<T>`](MarketEvent) received now.
    pub fn now(market: Market, kind: T) -> Self {
        Self {
            time_received: Utc::now(),
            market,
            kind,
        }
    }

    pub fn map_kind<F, O>(self, op: F) -> MarketEvent<O>
    where
        F: FnOnce(T) -> O,
    {
        MarketEvent {
            time_received: self.time_received,
            market: self.market,
            kind: op(self.kind),
        }
    }
}

/// Available kinds of normalised Feedmux [`MarketEvent<T>`](MarketEvent).
///
/// Used as the `Output` of the dynamically typed
/// [`MarketDataManager::subscription`](crate::manager::MarketDataManager::subscription) accessor.
/// The typed accessors yield the inner models directly.
#[derive(Clone, PartialEq, Debug, Deserialize, Serialize, From)]
pub enum MarketDataKind {
    Ticker(Ticker),
    OrderBook(OrderBook),
    Trade(PublicTrade),
    OpenOrders(OpenOrders),
    TradeHistory(TradeHistory),
}

impl From<MarketEvent<Ticker>> for MarketEvent<MarketDataKind> {
    fn from(value: MarketEvent<Ticker>) -> Self {
        value.map_kind(MarketDataKind::from)
    }
}

impl From<MarketEvent<OrderBook>> for MarketEvent<MarketDataKind> {
    fn from(value: MarketEvent<OrderBook>) -> Self {
        value.map_kind(MarketDataKind::from)
    }
}

impl From<MarketEvent<PublicTrade>> for MarketEvent<MarketDataKind> {
    fn from(value: MarketEvent<PublicTrade>) -> Self {
        value.map_kind(MarketDataKind::from)
    }
}

impl From<MarketEvent<OpenOrders>> for MarketEvent<MarketDataKind> {
    fn from(value: MarketEvent<OpenOrders>) -> Self {
        value.map_kind(MarketDataKind::from)
    }
}

impl From<MarketEvent<TradeHistory>> for MarketEvent<MarketDataKind> {
    fn from(value: MarketEvent<TradeHistory>) -> Self {
        value.map_kind(MarketDataKind::from)
    }
}
