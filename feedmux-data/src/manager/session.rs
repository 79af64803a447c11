use crate::{
    bus::EventBus,
    error::DataError,
    event::MarketEvent,
    exchange::{ExchangeAdapter, MarketStream, ProductSubscription},
    subscription::SubscriptionSet,
};
use feedmux_instrument::{
    exchange::ExchangeId,
    market::{CurrencyPair, Market},
};
use futures::StreamExt;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Owns one live streaming exchange connection: the adapter it was opened through, the exact
/// streaming [`SubscriptionSet`] it was opened with, and one route task per `(data type, pair)`
/// stream forwarding payloads into the [`EventBus`].
pub(crate) struct StreamingSession {
    exchange: ExchangeId,
    adapter: Arc<dyn ExchangeAdapter>,
    subscriptions: SubscriptionSet,
    routes: Vec<JoinHandle<()>>,
}

impl StreamingSession {
    /// Open a new streaming connection pushing exactly the provided streaming target, and spawn
    /// the route tasks tying each upstream stream to the [`EventBus`].
    pub async fn open(
        exchange: ExchangeId,
        adapter: Arc<dyn ExchangeAdapter>,
        subscriptions: SubscriptionSet,
        bus: Arc<EventBus>,
    ) -> Result<Self, DataError> {
        let product = ProductSubscription::from(&subscriptions);
        let streams = adapter.connect(&product).await?;

        info!(
            %exchange,
            tickers = product.tickers.len(),
            order_books = product.order_books.len(),
            trades = product.trades.len(),
            "opened streaming connection"
        );

        let mut routes = Vec::new();

        for (pair, stream) in streams.tickers {
            let bus = Arc::clone(&bus);
            routes.push(route(exchange.clone(), pair, stream, move |event| {
                bus.publish_ticker(event)
            }));
        }
        for (pair, stream) in streams.order_books {
            let bus = Arc::clone(&bus);
            routes.push(route(exchange.clone(), pair, stream, move |event| {
                bus.publish_order_book(event)
            }));
        }
        for (pair, stream) in streams.trades {
            let bus = Arc::clone(&bus);
            routes.push(route(exchange.clone(), pair, stream, move |event| {
                bus.publish_trade(event)
            }));
        }

        Ok(Self {
            exchange,
            adapter,
            subscriptions,
            routes,
        })
    }

    /// The streaming [`SubscriptionSet`] this session was opened with.
    pub fn subscriptions(&self) -> &SubscriptionSet {
        &self.subscriptions
    }

    /// Release every route (best-effort), then disconnect and wait for the exchange to
    /// acknowledge.
    pub async fn close(self) {
        for route in self.routes {
            route.abort();
        }

        if let Err(error) = self.adapter.disconnect().await {
            error!(exchange = %self.exchange, %error, "failed to disconnect streaming connection");
        } else {
            info!(exchange = %self.exchange, "closed streaming connection");
        }
    }
}

/// Spawn a route task forwarding one upstream payload stream into the [`EventBus`] as
/// [`MarketEvent`]s stamped with the originating [`Market`].
fn route<T, FnPublish>(
    exchange: ExchangeId,
    pair: CurrencyPair,
    mut stream: MarketStream<T>,
    publish: FnPublish,
) -> JoinHandle<()>
where
    T: Send + 'static,
    FnPublish: Fn(MarketEvent<T>) + Send + 'static,
{
    tokio::spawn(async move {
        let market = Market::new(exchange, pair);
        while let Some(item) = stream.next().await {
            match item {
                Ok(kind) => publish(MarketEvent::now(market.clone(), kind)),
                Err(error) => {
                    // Dead until the owning session is rebuilt by a later reconciliation
                    error!(%market, %error, "streaming market data produced an error; route stopped");
                    break;
                }
            }
        }
    })
}
