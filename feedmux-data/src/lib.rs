#![forbid(unsafe_code)]
#![warn(
    unused,
    clippy::cognitive_complexity,
    unused_crate_dependencies,
    unused_extern_crates,
    clippy::unused_self,
    clippy::useless_let_if_seq,
    missing_debug_implementations,
    rust_2018_idioms
)]
#![allow(clippy::type_complexity, clippy::too_many_arguments, type_alias_bounds)]

//! # Feedmux-Data
//! A market data subscription manager for cryptocurrency exchanges - batteries included. It is:
//! * **Declarative**: Describe the complete set of desired market data [`Subscription`](subscription::Subscription)s
//!   and let the [`MarketDataManager`](manager::MarketDataManager) reconcile live exchange connections towards it.
//! * **Uniform**: Streaming (push) exchanges and polling-only (request/response) exchanges are
//!   delivered through the same hot, multiplexed event streams - one per data type.
//! * **Resilient**: Transient upstream failures are logged and isolated; unrelated data flows keep
//!   running, and the next reconciliation pass retries.
//!
//! ## User API
//! - Register exchange adapters with an [`ExchangeRegistry`](exchange::registry::ExchangeRegistry).
//! - Construct a [`MarketDataManager`](manager::MarketDataManager) and call
//!   [`start`](manager::MarketDataManager::start).
//! - Declare the desired subscriptions via
//!   [`update_subscriptions`](manager::MarketDataManager::update_subscriptions) - repeated calls
//!   between reconciliation passes coalesce, and only the latest set takes effect.
//! - Consume filtered hot streams via the typed accessors
//!   ([`tickers`](manager::MarketDataManager::tickers),
//!   [`order_books`](manager::MarketDataManager::order_books), ...) or the dynamically typed
//!   [`subscription`](manager::MarketDataManager::subscription) accessor.
//!
//! ## Example
//! ```rust,no_run
//! use feedmux_data::{
//!     config::ManagerConfig,
//!     exchange::registry::ExchangeRegistry,
//!     manager::MarketDataManager,
//!     subscription::{SubKind, Subscription, SubscriptionSet},
//! };
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() {
//!     // Register adapters for each exchange (see the exchange module for the adapter contracts)
//!     let registry = ExchangeRegistry::default();
//!
//!     let mut manager = MarketDataManager::new(registry, ManagerConfig::default()).unwrap();
//!
//!     manager.update_subscriptions(SubscriptionSet::from_iter([
//!         Subscription::from(("binance", "btc", "usdt", SubKind::Ticker)),
//!         Subscription::from(("kraken", "eth", "usd", SubKind::Ticker)),
//!     ]));
//!
//!     let mut tickers = manager.tickers(("binance", "btc", "usdt").into());
//!     manager.start();
//!
//!     while let Some(event) = tickers.next().await {
//!         println!("{event:?}");
//!     }
//! }
//! ```

/// Multi-producer / multi-consumer [`EventBus`](bus::EventBus) with one hot topic per
/// [`SubKind`](subscription::SubKind), applying latest-wins backpressure.
pub mod bus;

/// [`ManagerConfig`](config::ManagerConfig) consumed from the enclosing application.
pub mod config;

/// All [`Error`](std::error::Error)s generated in Feedmux-Data.
pub mod error;

/// Defines the generic [`MarketEvent<T>`](event::MarketEvent) emitted on every bus topic.
pub mod event;

/// Adapter contracts ([`ExchangeAdapter`](exchange::ExchangeAdapter),
/// [`TradeAdapter`](exchange::TradeAdapter)) and the
/// [`ExchangeRegistry`](exchange::registry::ExchangeRegistry) resolving exchange names to them.
pub mod exchange;

/// The [`MarketDataManager`](manager::MarketDataManager) surface and its reconciliation engine.
pub mod manager;

/// Cooperative shutdown signalling between the manager and its reconciliation task.
pub mod shutdown;

/// Types that communicate which market data streams to maintain -
/// [`Subscription`](subscription::Subscription), [`SubscriptionSet`](subscription::SubscriptionSet)
/// and the payload models they yield.
pub mod subscription;
