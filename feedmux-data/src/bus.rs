use crate::{
    event::MarketEvent,
    subscription::{
        book::OrderBook,
        order::{OpenOrders, TradeHistory},
        ticker::Ticker,
        trade::PublicTrade,
    },
};
use feedmux_instrument::market::Market;
use futures::{stream, Stream, StreamExt};
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use tracing::warn;

/// Multi-producer / multi-consumer fan-out of [`MarketEvent`]s with one hot [`Topic`] per data
/// type.
///
/// Backpressure is latest-wins: each topic is a bounded broadcast ring that drops the oldest
/// events when a consumer lags, so a slow consumer may miss intermediate values but always
/// converges on the most recent one. Each topic additionally retains its latest value, which is
/// replayed to new subscribers.
///
/// Filtering is consumer-side by [`Market`] equality - the bus itself does not index by market.
/// Events from a single source arrive at a single consumer in publish order; there is no ordering
/// guarantee across sources or across consumers.
#[derive(Debug)]
pub struct EventBus {
    tickers: Topic<Ticker>,
    order_books: Topic<OrderBook>,
    trades: Topic<PublicTrade>,
    open_orders: Topic<OpenOrders>,
    trade_history: Topic<TradeHistory>,
}

impl EventBus {
    /// Construct a new [`EventBus`] with the provided per-topic channel capacity.
    ///
    /// Capacity bounds how far a consumer can lag before intermediate events are dropped.
    pub fn new(capacity: usize) -> Self {
        Self {
            tickers: Topic::new(capacity),
            order_books: Topic::new(capacity),
            trades: Topic::new(capacity),
            open_orders: Topic::new(capacity),
            trade_history: Topic::new(capacity),
        }
    }

    pub fn publish_ticker(&self, event: MarketEvent<Ticker>) {
        self.tickers.publish(event)
    }

    pub fn publish_order_book(&self, event: MarketEvent<OrderBook>) {
        self.order_books.publish(event)
    }

    pub fn publish_trade(&self, event: MarketEvent<PublicTrade>) {
        self.trades.publish(event)
    }

    pub fn publish_open_orders(&self, event: MarketEvent<OpenOrders>) {
        self.open_orders.publish(event)
    }

    pub fn publish_trade_history(&self, event: MarketEvent<TradeHistory>) {
        self.trade_history.publish(event)
    }

    /// Hot [`Stream`] of ticker events for the provided [`Market`].
    pub fn tickers(&self, market: Market) -> impl Stream<Item = MarketEvent<Ticker>> + Send + 'static {
        filtered(self.tickers.subscribe(), market)
    }

    /// Hot [`Stream`] of order book events for the provided [`Market`].
    pub fn order_books(
        &self,
        market: Market,
    ) -> impl Stream<Item = MarketEvent<OrderBook>> + Send + 'static {
        filtered(self.order_books.subscribe(), market)
    }

    /// Hot [`Stream`] of public trade events for the provided [`Market`].
    pub fn trades(
        &self,
        market: Market,
    ) -> impl Stream<Item = MarketEvent<PublicTrade>> + Send + 'static {
        filtered(self.trades.subscribe(), market)
    }

    /// Hot [`Stream`] of open order events for the provided [`Market`].
    pub fn open_orders(
        &self,
        market: Market,
    ) -> impl Stream<Item = MarketEvent<OpenOrders>> + Send + 'static {
        filtered(self.open_orders.subscribe(), market)
    }

    /// Hot [`Stream`] of trade history events for the provided [`Market`].
    pub fn trade_history(
        &self,
        market: Market,
    ) -> impl Stream<Item = MarketEvent<TradeHistory>> + Send + 'static {
        filtered(self.trade_history.subscribe(), market)
    }
}

fn filtered<T>(
    stream: impl Stream<Item = MarketEvent<T>> + Send + 'static,
    market: Market,
) -> impl Stream<Item = MarketEvent<T>> + Send + 'static
where
    T: Send + 'static,
{
    stream.filter(move |event| std::future::ready(event.market == market))
}

/// One hot, shared topic of the [`EventBus`].
#[derive(Debug)]
struct Topic<T> {
    tx: broadcast::Sender<MarketEvent<T>>,
    latest: Mutex<Option<MarketEvent<T>>>,
}

impl<T> Topic<T>
where
    T: Clone + Send + 'static,
{
    fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            tx,
            latest: Mutex::new(None),
        }
    }

    /// Publish an event to every current subscriber and retain it as the topic's latest value.
    ///
    /// The latest lock imposes a total order on concurrent publishers, keeping the retained value
    /// consistent with the channel.
    fn publish(&self, event: MarketEvent<T>) {
        let mut latest = self.latest.lock();
        *latest = Some(event.clone());
        // An Err means no subscriber is currently listening; the latest cell retains the value
        // for subscribers arriving later
        let _ = self.tx.send(event);
    }

    /// Subscribe to this topic, yielding the retained latest value (if any) followed by all
    /// subsequently published events.
    fn subscribe(&self) -> impl Stream<Item = MarketEvent<T>> + Send + 'static {
        // Holding the latest lock while subscribing excludes concurrent publishes, so the
        // retained value and the receiver never duplicate or miss an event between them
        let (latest, rx) = {
            let latest = self.latest.lock();
            (latest.clone(), self.tx.subscribe())
        };

        stream::iter(latest).chain(BroadcastStream::new(rx).filter_map(|result| {
            std::future::ready(match result {
                Ok(event) => Some(event),
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    warn!(
                        skipped,
                        "EventBus consumer lagging; resuming from the most recent events"
                    );
                    None
                }
            })
        }))
    }
}
