use async_trait::async_trait;
use feedmux_data::{
    config::ManagerConfig,
    error::AdapterError,
    exchange::{
        registry::{ExchangeRegistry, ExchangeServices},
        ExchangeAdapter, MarketStream, MarketStreams, ProductSubscription,
    },
    manager::MarketDataManager,
    subscription::{
        book::{Level, OrderBook},
        ticker::Ticker,
        SubKind, Subscription, SubscriptionSet,
    },
};
use feedmux_instrument::market::CurrencyPair;
use futures::{stream, StreamExt};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use tokio::time::{interval, Duration};
use tracing::info;

/// Simulated streaming-capable exchange pushing a synthetic ticker walk for every subscribed
/// pair.
struct SimulatedStreamingExchange;

#[async_trait]
impl ExchangeAdapter for SimulatedStreamingExchange {
    fn is_streaming(&self) -> bool {
        true
    }

    async fn fetch_ticker(&self, _: &CurrencyPair) -> Result<Ticker, AdapterError> {
        Ok(synthetic_ticker(dec!(63000)))
    }

    async fn fetch_order_book(
        &self,
        _: &CurrencyPair,
        depth: usize,
    ) -> Result<OrderBook, AdapterError> {
        Ok(synthetic_order_book(dec!(63000), depth))
    }

    async fn connect(
        &self,
        product: &ProductSubscription,
    ) -> Result<MarketStreams, AdapterError> {
        let mut streams = MarketStreams::default();
        for pair in &product.tickers {
            streams.tickers.push((pair.clone(), synthetic_ticker_stream()));
        }
        Ok(streams)
    }
}

/// Simulated polling-only exchange answering request/response fetches.
struct SimulatedPollingExchange;

#[async_trait]
impl ExchangeAdapter for SimulatedPollingExchange {
    async fn fetch_ticker(&self, _: &CurrencyPair) -> Result<Ticker, AdapterError> {
        Ok(synthetic_ticker(dec!(3400)))
    }

    async fn fetch_order_book(
        &self,
        _: &CurrencyPair,
        depth: usize,
    ) -> Result<OrderBook, AdapterError> {
        Ok(synthetic_order_book(dec!(3400), depth))
    }
}

fn synthetic_ticker(last: Decimal) -> Ticker {
    Ticker::new(last - dec!(0.5), last + dec!(0.5), last, Some(dec!(1234.5)))
}

fn synthetic_order_book(mid: Decimal, depth: usize) -> OrderBook {
    let levels = |side: Decimal| {
        (1..=depth)
            .map(|level| {
                Level::new(
                    mid + side * Decimal::from(level),
                    dec!(0.1) * Decimal::from(level),
                )
            })
            .collect::<Vec<_>>()
    };
    OrderBook::new(None, levels(dec!(-1)), levels(dec!(1)))
}

fn synthetic_ticker_stream() -> MarketStream<Ticker> {
    let ticks = interval(Duration::from_millis(250));
    stream::unfold((ticks, dec!(63000)), |(mut ticks, last)| async move {
        ticks.tick().await;
        let last = last + dec!(0.25);
        Some((Ok(synthetic_ticker(last)), (ticks, last)))
    })
    .boxed()
}

#[tokio::main]
async fn main() {
    // Initialise INFO Tracing log subscriber
    init_logging();

    // Register one streaming-capable and one polling-only simulated exchange
    let registry = ExchangeRegistry::default()
        .with_exchange(
            "hyperion",
            ExchangeServices::new(Arc::new(SimulatedStreamingExchange)),
        )
        .with_exchange(
            "meridian",
            ExchangeServices::new(Arc::new(SimulatedPollingExchange)),
        );

    let config = ManagerConfig {
        interval_secs: 1,
        ..ManagerConfig::default()
    };

    let mut manager = MarketDataManager::new(registry, config).unwrap();

    // Declare the complete desired subscription set - the manager reconciles towards it
    manager.update_subscriptions(SubscriptionSet::from_iter([
        Subscription::from(("hyperion", "btc", "usdt", SubKind::Ticker)),
        Subscription::from(("meridian", "eth", "usd", SubKind::Ticker)),
        Subscription::from(("meridian", "eth", "usd", SubKind::OrderBooks)),
    ]));

    let mut streamed = manager.tickers(("hyperion", "btc", "usdt").into());
    let mut polled = manager.tickers(("meridian", "eth", "usd").into());
    let mut books = manager.order_books(("meridian", "eth", "usd").into());

    manager.start();

    for _ in 0..5 {
        if let Some(event) = streamed.next().await {
            info!(market = %event.market, last = %event.kind.last, "streamed ticker");
        }
    }

    if let Some(event) = polled.next().await {
        info!(market = %event.market, last = %event.kind.last, "polled ticker");
    }

    if let Some(event) = books.next().await {
        info!(
            market = %event.market,
            mid_price = ?event.kind.mid_price(),
            "polled order book"
        );
    }

    manager.stop().await;
}

// Initialise an INFO `Subscriber` for `Tracing` Json logs and install it as the global default.
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::builder()
                .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .json()
        .init()
}
