use super::{ExchangeAdapter, MarketMetadataProvider, TradeAdapter};
use feedmux_instrument::exchange::ExchangeId;
use fnv::FnvHashMap;
use std::{
    fmt::{Debug, Formatter},
    sync::Arc,
};

/// The adapters registered for one exchange.
///
/// Every exchange carries a market data adapter; authenticated trading and market metadata are
/// optional capabilities.
#[derive(Clone)]
pub struct ExchangeServices {
    pub market_data: Arc<dyn ExchangeAdapter>,
    pub trade: Option<Arc<dyn TradeAdapter>>,
    pub metadata: Option<Arc<dyn MarketMetadataProvider>>,
}

impl ExchangeServices {
    /// Construct a new [`ExchangeServices`] from the mandatory market data adapter.
    pub fn new(market_data: Arc<dyn ExchangeAdapter>) -> Self {
        Self {
            market_data,
            trade: None,
            metadata: None,
        }
    }

    pub fn with_trade(self, trade: Arc<dyn TradeAdapter>) -> Self {
        Self {
            trade: Some(trade),
            ..self
        }
    }

    pub fn with_metadata(self, metadata: Arc<dyn MarketMetadataProvider>) -> Self {
        Self {
            metadata: Some(metadata),
            ..self
        }
    }
}

impl Debug for ExchangeServices {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExchangeServices")
            .field("is_streaming", &self.market_data.is_streaming())
            .field("trade", &self.trade.is_some())
            .field("metadata", &self.metadata.is_some())
            .finish()
    }
}

/// Resolves an [`ExchangeId`] to its registered [`ExchangeServices`] and classifies the exchange
/// as streaming-capable or polling-only.
///
/// The registry is immutable once built - register every exchange up front and share it with the
/// [`MarketDataManager`](crate::manager::MarketDataManager).
#[derive(Debug, Clone, Default)]
pub struct ExchangeRegistry {
    services: FnvHashMap<ExchangeId, ExchangeServices>,
}

impl ExchangeRegistry {
    /// Register the provided [`ExchangeServices`] under an [`ExchangeId`], replacing any previous
    /// registration.
    pub fn with_exchange<E>(mut self, exchange: E, services: ExchangeServices) -> Self
    where
        E: Into<ExchangeId>,
    {
        self.services.insert(exchange.into(), services);
        self
    }

    pub fn services(&self, exchange: &ExchangeId) -> Option<&ExchangeServices> {
        self.services.get(exchange)
    }

    /// Returns true if the provided exchange is registered and streaming-capable.
    pub fn is_streaming(&self, exchange: &ExchangeId) -> bool {
        self.services
            .get(exchange)
            .is_some_and(|services| services.market_data.is_streaming())
    }

    pub fn contains(&self, exchange: &ExchangeId) -> bool {
        self.services.contains_key(exchange)
    }

    pub fn exchanges(&self) -> impl Iterator<Item = &ExchangeId> {
        self.services.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::AdapterError,
        subscription::{book::OrderBook, ticker::Ticker},
    };
    use async_trait::async_trait;
    use feedmux_instrument::market::CurrencyPair;

    struct StubAdapter {
        streaming: bool,
    }

    #[async_trait]
    impl ExchangeAdapter for StubAdapter {
        fn is_streaming(&self) -> bool {
            self.streaming
        }

        async fn fetch_ticker(&self, _: &CurrencyPair) -> Result<Ticker, AdapterError> {
            Err(AdapterError::Connectivity("stub".to_string()))
        }

        async fn fetch_order_book(
            &self,
            _: &CurrencyPair,
            _: usize,
        ) -> Result<OrderBook, AdapterError> {
            Err(AdapterError::Connectivity("stub".to_string()))
        }
    }

    #[test]
    fn test_registry_classifies_streaming_capability() {
        let registry = ExchangeRegistry::default()
            .with_exchange(
                "binance",
                ExchangeServices::new(Arc::new(StubAdapter { streaming: true })),
            )
            .with_exchange(
                "kraken",
                ExchangeServices::new(Arc::new(StubAdapter { streaming: false })),
            );

        struct TestCase {
            input: ExchangeId,
            expected: bool,
        }

        let cases = vec![
            TestCase {
                // TC0: streaming-capable exchange
                input: ExchangeId::new("binance"),
                expected: true,
            },
            TestCase {
                // TC1: polling-only exchange
                input: ExchangeId::new("kraken"),
                expected: false,
            },
            TestCase {
                // TC2: unknown exchange is never streaming
                input: ExchangeId::new("unknown"),
                expected: false,
            },
        ];

        for (index, test) in cases.into_iter().enumerate() {
            assert_eq!(
                registry.is_streaming(&test.input),
                test.expected,
                "TC{} failed",
                index
            );
        }
    }

    #[test]
    fn test_registry_resolves_registered_services_only() {
        let registry = ExchangeRegistry::default().with_exchange(
            "binance",
            ExchangeServices::new(Arc::new(StubAdapter { streaming: true })),
        );

        assert!(registry.services(&ExchangeId::new("binance")).is_some());
        assert!(registry.services(&ExchangeId::new("kraken")).is_none());
        assert!(registry.contains(&ExchangeId::new("binance")));
    }
}
