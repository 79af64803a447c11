use feedmux_instrument::{
    asset::Symbol,
    exchange::ExchangeId,
    market::Market,
};
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::{Display, Formatter},
};

/// Order book payload models yielded by [`SubKind::OrderBooks`] subscriptions.
pub mod book;

/// Open order & trade history payload models yielded by [`SubKind::OpenOrders`] and
/// [`SubKind::TradeHistory`] subscriptions.
pub mod order;

/// Ticker payload model yielded by [`SubKind::Ticker`] subscriptions.
pub mod ticker;

/// Public trade payload model yielded by [`SubKind::PublicTrades`] subscriptions.
pub mod trade;

/// Tag communicating the type of market data a [`Subscription`] yields.
///
/// Closed enumeration - every consumer dispatching on [`SubKind`] matches exhaustively.
#[derive(
    Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Deserialize, Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SubKind {
    Ticker,
    OrderBooks,
    PublicTrades,
    OpenOrders,
    TradeHistory,
}

impl SubKind {
    /// [`SubKind`]s deliverable over a push-based streaming connection.
    ///
    /// [`SubKind::OpenOrders`] and [`SubKind::TradeHistory`] are always polled, even on
    /// streaming-capable exchanges.
    pub const STREAMING: [SubKind; 3] = [
        SubKind::Ticker,
        SubKind::OrderBooks,
        SubKind::PublicTrades,
    ];

    /// Returns true if this [`SubKind`] is deliverable over a streaming connection.
    pub fn is_streaming(&self) -> bool {
        Self::STREAMING.contains(self)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SubKind::Ticker => "ticker",
            SubKind::OrderBooks => "order_books",
            SubKind::PublicTrades => "public_trades",
            SubKind::OpenOrders => "open_orders",
            SubKind::TradeHistory => "trade_history",
        }
    }
}

impl Display for SubKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Feedmux [`Subscription`] used to subscribe to a [`SubKind`] for a particular exchange
/// [`Market`].
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize)]
pub struct Subscription {
    #[serde(flatten)]
    pub market: Market,
    #[serde(alias = "type")]
    pub kind: SubKind,
}

impl Subscription {
    /// Constructs a new [`Subscription`] using the provided configuration.
    pub fn new<M>(market: M, kind: SubKind) -> Self
    where
        M: Into<Market>,
    {
        Self {
            market: market.into(),
            kind,
        }
    }
}

impl Display for Subscription {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.kind, self.market)
    }
}

impl<M> From<(M, SubKind)> for Subscription
where
    M: Into<Market>,
{
    fn from((market, kind): (M, SubKind)) -> Self {
        Self::new(market, kind)
    }
}

impl<E, S> From<(E, S, S, SubKind)> for Subscription
where
    E: Into<ExchangeId>,
    S: Into<Symbol>,
{
    fn from((exchange, base, quote, kind): (E, S, S, SubKind)) -> Self {
        Self::new(Market::new(exchange, (base, quote)), kind)
    }
}

/// Immutable set of desired [`Subscription`]s - the declarative global state the
/// [`MarketDataManager`](crate::manager::MarketDataManager) reconciles live exchange connections
/// towards.
///
/// Duplicates collapse and insertion order is irrelevant; equality is structural.
#[derive(
    Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default, Deserialize, Serialize,
)]
#[serde(transparent)]
pub struct SubscriptionSet(BTreeSet<Subscription>);

impl SubscriptionSet {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, subscription: &Subscription) -> bool {
        self.0.contains(subscription)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Subscription> {
        self.0.iter()
    }

    /// Group this set by [`ExchangeId`], producing one [`SubscriptionSet`] per exchange.
    pub fn group_by_exchange(&self) -> BTreeMap<ExchangeId, SubscriptionSet> {
        self.0
            .iter()
            .fold(BTreeMap::new(), |mut groups, subscription| {
                groups
                    .entry(subscription.market.exchange.clone())
                    .or_default()
                    .0
                    .insert(subscription.clone());
                groups
            })
    }

    /// Filter this set down to the [`Subscription`]s deliverable over a streaming connection.
    pub fn streaming_target(&self) -> SubscriptionSet {
        self.0
            .iter()
            .filter(|subscription| subscription.kind.is_streaming())
            .cloned()
            .collect()
    }
}

impl FromIterator<Subscription> for SubscriptionSet {
    fn from_iter<Iter>(iter: Iter) -> Self
    where
        Iter: IntoIterator<Item = Subscription>,
    {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Subscription> for SubscriptionSet {
    fn extend<Iter>(&mut self, iter: Iter)
    where
        Iter: IntoIterator<Item = Subscription>,
    {
        self.0.extend(iter)
    }
}

impl IntoIterator for SubscriptionSet {
    type Item = Subscription;
    type IntoIter = std::collections::btree_set::IntoIter<Subscription>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a SubscriptionSet {
    type Item = &'a Subscription;
    type IntoIter = std::collections::btree_set::Iter<'a, Subscription>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod de {
        use super::*;

        #[test]
        fn test_subscription_binance_ticker() {
            let input = r#"
            {
                "exchange": "binance",
                "base": "btc",
                "quote": "usdt",
                "kind": "ticker"
            }
            "#;

            assert_eq!(
                serde_json::from_str::<Subscription>(input).unwrap(),
                Subscription::from(("binance", "btc", "usdt", SubKind::Ticker)),
            );
        }

        #[test]
        fn test_subscription_kraken_trade_history_with_type_alias() {
            let input = r#"
            {
                "exchange": "kraken",
                "base": "eth",
                "quote": "usd",
                "type": "trade_history"
            }
            "#;

            assert_eq!(
                serde_json::from_str::<Subscription>(input).unwrap(),
                Subscription::from(("kraken", "eth", "usd", SubKind::TradeHistory)),
            );
        }
    }

    #[test]
    fn test_subscription_set_collapses_duplicates() {
        let set = SubscriptionSet::from_iter([
            Subscription::from(("binance", "btc", "usdt", SubKind::Ticker)),
            Subscription::from(("binance", "btc", "usdt", SubKind::Ticker)),
            Subscription::from(("binance", "btc", "usdt", SubKind::OpenOrders)),
        ]);

        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_group_by_exchange() {
        let set = SubscriptionSet::from_iter([
            Subscription::from(("binance", "btc", "usdt", SubKind::Ticker)),
            Subscription::from(("binance", "eth", "usdt", SubKind::PublicTrades)),
            Subscription::from(("kraken", "eth", "usd", SubKind::Ticker)),
        ]);

        let groups = set.group_by_exchange();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups.get(&ExchangeId::new("binance")).unwrap().len(), 2);
        assert_eq!(groups.get(&ExchangeId::new("kraken")).unwrap().len(), 1);
    }

    #[test]
    fn test_streaming_target_excludes_polled_kinds() {
        struct TestCase {
            input: SubscriptionSet,
            expected: SubscriptionSet,
        }

        let cases = vec![
            TestCase {
                // TC0: streaming kinds survive, polled kinds are excluded
                input: SubscriptionSet::from_iter([
                    Subscription::from(("binance", "btc", "usdt", SubKind::Ticker)),
                    Subscription::from(("binance", "btc", "usdt", SubKind::OpenOrders)),
                    Subscription::from(("binance", "btc", "usdt", SubKind::TradeHistory)),
                ]),
                expected: SubscriptionSet::from_iter([Subscription::from((
                    "binance",
                    "btc",
                    "usdt",
                    SubKind::Ticker,
                ))]),
            },
            TestCase {
                // TC1: empty input produces empty target
                input: SubscriptionSet::default(),
                expected: SubscriptionSet::default(),
            },
        ];

        for (index, test) in cases.into_iter().enumerate() {
            assert_eq!(
                test.input.streaming_target(),
                test.expected,
                "TC{} failed",
                index
            );
        }
    }
}
