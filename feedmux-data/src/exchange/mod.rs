use crate::{
    error::AdapterError,
    subscription::{
        book::OrderBook,
        order::{LimitOrder, OpenOrders, OrderId, TradeHistory},
        ticker::Ticker,
        trade::PublicTrade,
        SubKind, SubscriptionSet,
    },
};
use async_trait::async_trait;
use derive_more::Constructor;
use feedmux_instrument::{market::CurrencyPair, metadata::MarketMetadata};
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter};

/// Defines the [`ExchangeRegistry`](registry::ExchangeRegistry) resolving an
/// [`ExchangeId`](feedmux_instrument::exchange::ExchangeId) to its registered adapters.
pub mod registry;

/// Convenient type alias for a stream of payloads pushed by a streaming exchange connection.
///
/// An `Err` item signals the upstream stream failed - the associated route is considered dead
/// until the owning session is rebuilt.
pub type MarketStream<T> = BoxStream<'static, Result<T, AdapterError>>;

/// Connect-time manifest declaring which [`CurrencyPair`]s a streaming exchange should push, per
/// data type.
///
/// Streaming exchange libraries in this space do not expose per-topic add/remove - only
/// connect-with-subscriptions - so a [`ProductSubscription`] describes one connection in full.
#[derive(Debug, Clone, Eq, PartialEq, Default, Deserialize, Serialize)]
pub struct ProductSubscription {
    pub tickers: Vec<CurrencyPair>,
    pub order_books: Vec<CurrencyPair>,
    pub trades: Vec<CurrencyPair>,
}

impl ProductSubscription {
    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty() && self.order_books.is_empty() && self.trades.is_empty()
    }
}

impl From<&SubscriptionSet> for ProductSubscription {
    fn from(subscriptions: &SubscriptionSet) -> Self {
        subscriptions
            .iter()
            .fold(Self::default(), |mut product, subscription| {
                let pair = subscription.market.pair.clone();
                match subscription.kind {
                    SubKind::Ticker => product.tickers.push(pair),
                    SubKind::OrderBooks => product.order_books.push(pair),
                    SubKind::PublicTrades => product.trades.push(pair),
                    SubKind::OpenOrders | SubKind::TradeHistory => {}
                }
                product
            })
    }
}

/// Collection of per-[`CurrencyPair`] payload streams produced by
/// [`ExchangeAdapter::connect`] for one streaming connection.
#[derive(Default)]
pub struct MarketStreams {
    pub tickers: Vec<(CurrencyPair, MarketStream<Ticker>)>,
    pub order_books: Vec<(CurrencyPair, MarketStream<OrderBook>)>,
    pub trades: Vec<(CurrencyPair, MarketStream<PublicTrade>)>,
}

impl Debug for MarketStreams {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketStreams")
            .field("tickers", &self.tickers.len())
            .field("order_books", &self.order_books.len())
            .field("trades", &self.trades.len())
            .finish()
    }
}

/// Paging hints for [`TradeAdapter::fetch_trade_history`] requests.
#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Deserialize,
    Serialize,
    Constructor,
)]
pub struct PageFilter {
    pub page: usize,
    pub limit: usize,
}

/// Market data contract implemented once per exchange integration.
///
/// Polling-only exchanges implement the fetch methods and leave the streaming methods defaulted.
/// Streaming-capable exchanges additionally return `true` from [`Self::is_streaming`] and
/// implement [`Self::connect`] / [`Self::disconnect`]. Exchange quirks (order book depth typing,
/// paging parameter shapes, etc.) are adapter-side concerns - the core never branches on an
/// exchange name.
#[async_trait]
pub trait ExchangeAdapter: Send + Sync {
    /// Returns true if this exchange exposes push-based streaming market data.
    fn is_streaming(&self) -> bool {
        false
    }

    async fn fetch_ticker(&self, pair: &CurrencyPair) -> Result<Ticker, AdapterError>;

    async fn fetch_order_book(
        &self,
        pair: &CurrencyPair,
        depth: usize,
    ) -> Result<OrderBook, AdapterError>;

    /// Fetch recent public trades for the provided [`CurrencyPair`].
    ///
    /// Many request/response exchange APIs do not serve the public tape, so the default
    /// implementation reports the operation as unsupported.
    async fn fetch_trades(&self, pair: &CurrencyPair) -> Result<Vec<PublicTrade>, AdapterError> {
        Err(AdapterError::unsupported(
            "exchange adapter",
            format!("public trades polling for {pair}"),
        ))
    }

    /// Open a streaming connection pushing exactly the markets declared in the provided
    /// [`ProductSubscription`], returning one payload stream per `(data type, pair)`.
    async fn connect(
        &self,
        product: &ProductSubscription,
    ) -> Result<MarketStreams, AdapterError> {
        let _ = product;
        Err(AdapterError::unsupported(
            "exchange adapter",
            "streaming connections",
        ))
    }

    /// Close the live streaming connection, blocking until the exchange acknowledges.
    async fn disconnect(&self) -> Result<(), AdapterError> {
        Ok(())
    }
}

/// Authenticated trading contract implemented once per exchange integration.
#[async_trait]
pub trait TradeAdapter: Send + Sync {
    async fn fetch_open_orders(&self, pair: &CurrencyPair) -> Result<OpenOrders, AdapterError>;

    async fn fetch_trade_history(
        &self,
        pair: &CurrencyPair,
        page: PageFilter,
    ) -> Result<TradeHistory, AdapterError>;

    async fn place_limit_order(&self, order: LimitOrder) -> Result<OrderId, AdapterError>;
}

/// Provides the price & amount scales of a market, consumed by downstream strategy code.
pub trait MarketMetadataProvider: Send + Sync {
    fn metadata(&self, pair: &CurrencyPair) -> Option<MarketMetadata>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscription::Subscription;

    #[test]
    fn test_product_subscription_from_streaming_target() {
        struct TestCase {
            input: SubscriptionSet,
            expected: ProductSubscription,
        }

        let cases = vec![
            TestCase {
                // TC0: streaming kinds are mapped to their product lists, polled kinds ignored
                input: SubscriptionSet::from_iter([
                    Subscription::from(("binance", "btc", "usdt", SubKind::Ticker)),
                    Subscription::from(("binance", "eth", "usdt", SubKind::PublicTrades)),
                    Subscription::from(("binance", "btc", "usdt", SubKind::OpenOrders)),
                ]),
                expected: ProductSubscription {
                    tickers: vec![CurrencyPair::new("btc", "usdt")],
                    order_books: vec![],
                    trades: vec![CurrencyPair::new("eth", "usdt")],
                },
            },
            TestCase {
                // TC1: empty set produces empty manifest
                input: SubscriptionSet::default(),
                expected: ProductSubscription::default(),
            },
        ];

        for (index, test) in cases.into_iter().enumerate() {
            let actual = ProductSubscription::from(&test.input);
            assert_eq!(actual, test.expected, "TC{} failed", index);
            assert_eq!(actual.is_empty(), test.expected.is_empty(), "TC{} failed", index);
        }
    }
}
