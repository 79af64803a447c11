use chrono::{DateTime, Utc};
use derive_more::Constructor;
use feedmux_instrument::{market::CurrencyPair, Side};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt::{Display, Formatter};

/// Feedmux new type representing a unique exchange-assigned order `String` identifier.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize)]
pub struct OrderId(pub SmolStr);

impl OrderId {
    pub fn new<S>(input: S) -> Self
    where
        S: Into<SmolStr>,
    {
        Self(input.into())
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Normalised Feedmux [`Order`] model - one order currently resting on an exchange.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize, Constructor)]
pub struct Order {
    pub id: OrderId,
    pub pair: CurrencyPair,
    pub side: Side,
    pub price: Decimal,
    pub amount: Decimal,
    pub filled: Decimal,
}

/// Collection of the [`Order`]s currently open on an exchange for one market.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct OpenOrders(pub Vec<Order>);

/// Normalised Feedmux [`PrivateTrade`] model - a fill belonging to the authenticated user.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize, Constructor)]
pub struct PrivateTrade {
    pub id: String,
    pub order_id: Option<OrderId>,
    pub pair: CurrencyPair,
    pub side: Side,
    pub price: Decimal,
    pub amount: Decimal,
    pub fee: Option<Decimal>,
    pub time: DateTime<Utc>,
}

/// Page of the authenticated user's [`PrivateTrade`] history for one market.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct TradeHistory(pub Vec<PrivateTrade>);

/// A limit order to be placed via
/// [`TradeAdapter::place_limit_order`](crate::exchange::TradeAdapter::place_limit_order).
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize, Constructor)]
pub struct LimitOrder {
    pub pair: CurrencyPair,
    pub side: Side,
    pub price: Decimal,
    pub amount: Decimal,
}
