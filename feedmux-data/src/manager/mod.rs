use crate::{
    bus::EventBus,
    config::ManagerConfig,
    error::DataError,
    event::{MarketDataKind, MarketEvent},
    exchange::registry::ExchangeRegistry,
    manager::reconciler::Reconciler,
    shutdown::{shutdown_channel, ShutdownListener, ShutdownNotifier},
    subscription::{
        book::OrderBook,
        order::{OpenOrders, TradeHistory},
        ticker::Ticker,
        trade::PublicTrade,
        SubKind, Subscription, SubscriptionSet,
    },
};
use feedmux_instrument::market::Market;
use futures::{stream::BoxStream, Stream, StreamExt};
use parking_lot::Mutex;
use std::{sync::Arc, time::Instant};
use tokio::{sync::Notify, task::JoinHandle};
use tracing::{error, info};

mod reconciler;
mod session;

/// The outward surface of the market data subscription manager.
///
/// A [`MarketDataManager`] accepts a declarative [`SubscriptionSet`] describing every desired
/// market data feed across all registered exchanges, and continuously reconciles live streaming
/// connections & polling activity towards it on a dedicated engine task. Consumers read the
/// resulting events from hot, filtered per-data-type streams.
///
/// Instantiate one per process and inject it wherever market data is consumed.
#[derive(Debug)]
pub struct MarketDataManager {
    registry: Arc<ExchangeRegistry>,
    bus: Arc<EventBus>,
    config: ManagerConfig,
    pending: Arc<Mutex<Option<SubscriptionSet>>>,
    nudge: Arc<Notify>,
    last_pass: Arc<Mutex<Option<Instant>>>,
    shutdown: ShutdownNotifier,
    shutdown_listener: ShutdownListener,
    engine: Option<JoinHandle<()>>,
}

impl MarketDataManager {
    /// Construct a new [`MarketDataManager`] from the provided registry and validated
    /// configuration.
    pub fn new(registry: ExchangeRegistry, config: ManagerConfig) -> Result<Self, DataError> {
        let config = config.validate()?;
        let (shutdown, shutdown_listener) = shutdown_channel();

        Ok(Self {
            registry: Arc::new(registry),
            bus: Arc::new(EventBus::new(config.bus_capacity)),
            config,
            pending: Arc::new(Mutex::new(None)),
            nudge: Arc::new(Notify::new()),
            last_pass: Arc::new(Mutex::new(None)),
            shutdown,
            shutdown_listener,
            engine: None,
        })
    }

    /// Declare the complete desired [`SubscriptionSet`].
    ///
    /// The set is stored as the pending next state, superseding any not-yet-consumed previous
    /// call - between two reconciliation passes only the latest set takes effect. The engine is
    /// woken early only when the last pass completed more than one interval ago, so bursts of
    /// updates coalesce into a single pass while sparse updates get fast turnaround.
    ///
    /// Never fails and never blocks.
    pub fn update_subscriptions(&self, desired: SubscriptionSet) {
        *self.pending.lock() = Some(desired);

        let due = self
            .last_pass
            .lock()
            .map_or(true, |at| at.elapsed() >= self.config.interval());
        if due {
            self.nudge.notify_one();
        }
    }

    /// Start the reconciliation engine task.
    pub fn start(&mut self) {
        let reconciler = Reconciler::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.bus),
            self.config.clone(),
            Arc::clone(&self.pending),
            Arc::clone(&self.nudge),
            Arc::clone(&self.last_pass),
            self.shutdown_listener.clone(),
        );

        info!("starting market data subscription manager");
        self.engine = Some(tokio::spawn(reconciler.run()));
    }

    /// Stop the reconciliation engine.
    ///
    /// Stores the empty set as the desired state, signals shutdown, and waits for the engine to
    /// complete its final pass - every live streaming adapter receives exactly one disconnect and
    /// no further fetches are issued once this returns.
    pub async fn stop(&mut self) {
        *self.pending.lock() = Some(SubscriptionSet::default());
        self.shutdown.send();
        self.nudge.notify_one();

        if let Some(engine) = self.engine.take() {
            if let Err(error) = engine.await {
                error!(%error, "reconciliation task terminated abnormally");
            }
        }
        info!("market data subscription manager stopped");
    }

    /// Hot [`Stream`] of [`Ticker`] events for the provided [`Market`].
    ///
    /// The stream is lazy, multiply subscribable and shares the upstream subscription - dropping
    /// it never affects other consumers.
    pub fn tickers(&self, market: Market) -> impl Stream<Item = MarketEvent<Ticker>> + Send + 'static {
        self.bus.tickers(market)
    }

    /// Hot [`Stream`] of [`OrderBook`] events for the provided [`Market`].
    pub fn order_books(
        &self,
        market: Market,
    ) -> impl Stream<Item = MarketEvent<OrderBook>> + Send + 'static {
        self.bus.order_books(market)
    }

    /// Hot [`Stream`] of [`PublicTrade`] events for the provided [`Market`].
    pub fn trades(
        &self,
        market: Market,
    ) -> impl Stream<Item = MarketEvent<PublicTrade>> + Send + 'static {
        self.bus.trades(market)
    }

    /// Hot [`Stream`] of [`OpenOrders`] events for the provided [`Market`].
    pub fn open_orders(
        &self,
        market: Market,
    ) -> impl Stream<Item = MarketEvent<OpenOrders>> + Send + 'static {
        self.bus.open_orders(market)
    }

    /// Hot [`Stream`] of [`TradeHistory`] events for the provided [`Market`].
    pub fn trade_history(
        &self,
        market: Market,
    ) -> impl Stream<Item = MarketEvent<TradeHistory>> + Send + 'static {
        self.bus.trade_history(market)
    }

    /// Dynamically typed variant of the typed accessors, dispatching on the
    /// [`SubKind`] of the provided [`Subscription`].
    ///
    /// Yields the same underlying events as the corresponding typed accessor, erased into
    /// [`MarketDataKind`].
    pub fn subscription(
        &self,
        subscription: &Subscription,
    ) -> BoxStream<'static, MarketEvent<MarketDataKind>> {
        let market = subscription.market.clone();
        match subscription.kind {
            SubKind::Ticker => self.bus.tickers(market).map(MarketEvent::from).boxed(),
            SubKind::OrderBooks => self.bus.order_books(market).map(MarketEvent::from).boxed(),
            SubKind::PublicTrades => self.bus.trades(market).map(MarketEvent::from).boxed(),
            SubKind::OpenOrders => self.bus.open_orders(market).map(MarketEvent::from).boxed(),
            SubKind::TradeHistory => self
                .bus
                .trade_history(market)
                .map(MarketEvent::from)
                .boxed(),
        }
    }

    /// Shared handle to the underlying [`EventBus`].
    pub fn event_bus(&self) -> Arc<EventBus> {
        Arc::clone(&self.bus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_update_subscriptions_coalesces_to_latest() {
        let manager =
            MarketDataManager::new(ExchangeRegistry::default(), ManagerConfig::default()).unwrap();

        let first = SubscriptionSet::from_iter([Subscription::from((
            "binance",
            "btc",
            "usdt",
            SubKind::Ticker,
        ))]);
        let second = SubscriptionSet::from_iter([Subscription::from((
            "kraken",
            "eth",
            "usd",
            SubKind::Ticker,
        ))]);

        manager.update_subscriptions(first);
        manager.update_subscriptions(second.clone());

        assert_eq!(*manager.pending.lock(), Some(second));
    }
}
