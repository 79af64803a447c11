use crate::{
    bus::EventBus,
    config::ManagerConfig,
    error::{AdapterError, DataError},
    event::MarketEvent,
    exchange::{registry::ExchangeRegistry, PageFilter},
    manager::session::StreamingSession,
    shutdown::ShutdownListener,
    subscription::{SubKind, Subscription, SubscriptionSet},
};
use feedmux_instrument::exchange::ExchangeId;
use parking_lot::Mutex;
use std::{sync::Arc, time::Instant};
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};
use vecmap::VecMap;

/// The reconciliation engine - a single cooperative loop that moves the live subscription state
/// towards the most recently declared desired [`SubscriptionSet`], polls the request/response
/// subscriptions, and sleeps until nudged or the interval elapses.
///
/// The engine exclusively owns the per-exchange [`StreamingSession`] map and the active polling
/// set; no other task mutates them.
pub(crate) struct Reconciler {
    registry: Arc<ExchangeRegistry>,
    bus: Arc<EventBus>,
    config: ManagerConfig,
    pending: Arc<Mutex<Option<SubscriptionSet>>>,
    nudge: Arc<Notify>,
    last_pass: Arc<Mutex<Option<Instant>>>,
    shutdown: ShutdownListener,
    sessions: VecMap<ExchangeId, StreamingSession>,
    active_polling: SubscriptionSet,
}

impl Reconciler {
    pub fn new(
        registry: Arc<ExchangeRegistry>,
        bus: Arc<EventBus>,
        config: ManagerConfig,
        pending: Arc<Mutex<Option<SubscriptionSet>>>,
        nudge: Arc<Notify>,
        last_pass: Arc<Mutex<Option<Instant>>>,
        shutdown: ShutdownListener,
    ) -> Self {
        Self {
            registry,
            bus,
            config,
            pending,
            nudge,
            last_pass,
            shutdown,
            sessions: VecMap::new(),
            active_polling: SubscriptionSet::default(),
        }
    }

    pub async fn run(mut self) {
        info!(
            interval_secs = self.config.interval_secs,
            "reconciliation loop running"
        );

        loop {
            if let Some(desired) = self.take_pending() {
                if let Err(error) = self.reconcile(&desired).await {
                    error!(%error, "reconciliation failed; restoring desired set for retry");
                    self.restore_pending(desired);
                }
            }

            self.poll().await;
            *self.last_pass.lock() = Some(Instant::now());

            tokio::select! {
                _ = self.shutdown.recv() => break,
                _ = self.nudge.notified() => {}
                _ = tokio::time::sleep(self.config.interval()) => {}
            }
        }

        self.teardown().await;
        info!("reconciliation loop stopped");
    }

    /// One reconciliation pass towards the provided desired [`SubscriptionSet`].
    async fn reconcile(&mut self, desired: &SubscriptionSet) -> Result<(), DataError> {
        debug!(subscriptions = desired.len(), "reconciling desired subscriptions");

        let desired_by_exchange = desired.group_by_exchange();

        // Diff each live session against the new streaming target of its exchange
        let mut unchanged = Vec::new();
        let mut changed = Vec::new();
        for (exchange, session) in self.sessions.iter() {
            let target = desired_by_exchange
                .get(exchange)
                .map(SubscriptionSet::streaming_target)
                .unwrap_or_default();

            if &target == session.subscriptions() {
                unchanged.push(exchange.clone());
            } else {
                changed.push(exchange.clone());
            }
        }

        // Streaming libraries only expose connect-with-subscriptions, so a changed streaming
        // target is a full teardown; the exchange is re-opened with its fresh target below
        for exchange in changed {
            if let Some(session) = self.sessions.remove(&exchange) {
                info!(%exchange, "streaming target changed; closing session");
                session.close().await;
            }
        }

        let mut polling = SubscriptionSet::default();
        for (exchange, subscriptions) in desired_by_exchange {
            let Some(services) = self.registry.services(&exchange) else {
                warn!(%exchange, "subscriptions reference an unregistered exchange; skipping");
                continue;
            };
            let streaming = services.market_data.is_streaming();

            if streaming && !unchanged.contains(&exchange) {
                let target = subscriptions.streaming_target();
                if !target.is_empty() {
                    let session = StreamingSession::open(
                        exchange.clone(),
                        Arc::clone(&services.market_data),
                        target,
                        Arc::clone(&self.bus),
                    )
                    .await?;
                    self.sessions.insert(exchange.clone(), session);
                }
            }

            // Everything a streaming session does not cover is polled each pass
            polling.extend(
                subscriptions
                    .iter()
                    .filter(|subscription| !(streaming && subscription.kind.is_streaming()))
                    .cloned(),
            );
        }

        self.active_polling = polling;
        Ok(())
    }

    /// Fetch every active polling subscription sequentially, respecting single-IP rate limits.
    ///
    /// A failed fetch never suppresses a sibling's fetch on the same or any later pass.
    async fn poll(&self) {
        for subscription in self.active_polling.iter() {
            // Cooperative cancellation so stop takes effect promptly between fetches
            if self.shutdown.is_shutdown() {
                return;
            }

            if let Err(error) = self.poll_subscription(subscription).await {
                match error {
                    DataError::Unsupported { .. }
                    | DataError::Adapter(AdapterError::Unsupported { .. }) => {
                        warn!(%subscription, %error, "subscription unsupported; skipped this pass")
                    }
                    error => {
                        error!(%subscription, %error, "failed to poll subscription")
                    }
                }
            }
        }
    }

    async fn poll_subscription(&self, subscription: &Subscription) -> Result<(), DataError> {
        let market = &subscription.market;
        let services = self
            .registry
            .services(&market.exchange)
            .ok_or_else(|| DataError::UnknownExchange(market.exchange.clone()))?;
        let pair = &market.pair;

        match subscription.kind {
            SubKind::Ticker => {
                let ticker = services.market_data.fetch_ticker(pair).await?;
                self.bus
                    .publish_ticker(MarketEvent::now(market.clone(), ticker));
            }
            SubKind::OrderBooks => {
                let book = services
                    .market_data
                    .fetch_order_book(pair, self.config.order_book_depth)
                    .await?;
                self.bus
                    .publish_order_book(MarketEvent::now(market.clone(), book));
            }
            SubKind::PublicTrades => {
                let trades = services.market_data.fetch_trades(pair).await?;
                for trade in trades {
                    self.bus
                        .publish_trade(MarketEvent::now(market.clone(), trade));
                }
            }
            SubKind::OpenOrders => {
                let trade = services.trade.as_ref().ok_or_else(|| DataError::Unsupported {
                    exchange: market.exchange.clone(),
                    kind: subscription.kind,
                })?;
                let orders = trade.fetch_open_orders(pair).await?;
                self.bus
                    .publish_open_orders(MarketEvent::now(market.clone(), orders));
            }
            SubKind::TradeHistory => {
                let trade = services.trade.as_ref().ok_or_else(|| DataError::Unsupported {
                    exchange: market.exchange.clone(),
                    kind: subscription.kind,
                })?;
                let history = trade
                    .fetch_trade_history(
                        pair,
                        PageFilter::new(0, self.config.trade_history_limit),
                    )
                    .await?;
                self.bus
                    .publish_trade_history(MarketEvent::now(market.clone(), history));
            }
        }

        Ok(())
    }

    /// Final pass equivalent to reconciling the empty set - every remaining session is closed so
    /// streaming adapters are deterministically disconnected.
    async fn teardown(&mut self) {
        let sessions = std::mem::replace(&mut self.sessions, VecMap::new());
        for (exchange, session) in sessions {
            debug!(%exchange, "closing streaming session on shutdown");
            session.close().await;
        }
        self.active_polling = SubscriptionSet::default();
    }

    /// Atomically take-and-clear the pending desired set.
    fn take_pending(&self) -> Option<SubscriptionSet> {
        self.pending.lock().take()
    }

    /// Restore a desired set whose reconciliation failed, unless a newer set has already arrived.
    fn restore_pending(&self, saved: SubscriptionSet) {
        let mut pending = self.pending.lock();
        if pending.is_none() {
            *pending = Some(saved);
        }
    }
}
