use chrono::{DateTime, Utc};
use derive_more::Constructor;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Normalised Feedmux [`OrderBook`] snapshot.
///
/// Adapters provide `bids` sorted descending and `asks` sorted ascending by price, so the first
/// [`Level`] on each side is the best.
#[derive(Debug, Clone, Eq, PartialEq, Default, Deserialize, Serialize)]
pub struct OrderBook {
    pub time_exchange: Option<DateTime<Utc>>,
    pub bids: Vec<Level>,
    pub asks: Vec<Level>,
}

impl OrderBook {
    /// Construct a new [`OrderBook`] snapshot from the provided bid and ask levels.
    pub fn new<IterBids, IterAsks, L>(
        time_exchange: Option<DateTime<Utc>>,
        bids: IterBids,
        asks: IterAsks,
    ) -> Self
    where
        IterBids: IntoIterator<Item = L>,
        IterAsks: IntoIterator<Item = L>,
        L: Into<Level>,
    {
        Self {
            time_exchange,
            bids: bids.into_iter().map(L::into).collect(),
            asks: asks.into_iter().map(L::into).collect(),
        }
    }

    pub fn best_bid(&self) -> Option<&Level> {
        self.bids.first()
    }

    pub fn best_ask(&self) -> Option<&Level> {
        self.asks.first()
    }

    /// Calculate the mid-price by taking the average of the best bid and ask prices.
    pub fn mid_price(&self) -> Option<Decimal> {
        match (self.best_bid(), self.best_ask()) {
            (Some(best_bid), Some(best_ask)) => {
                Some((best_bid.price + best_ask.price) / Decimal::TWO)
            }
            _ => None,
        }
    }
}

/// Normalised Feedmux [`OrderBook`] [`Level`] - a price and the aggregated amount resting at it.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize, Constructor,
)]
pub struct Level {
    pub price: Decimal,
    pub amount: Decimal,
}

impl From<(Decimal, Decimal)> for Level {
    fn from((price, amount): (Decimal, Decimal)) -> Self {
        Self::new(price, amount)
    }
}
