use crate::error::DataError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default minimum interval between reconciliation passes, in seconds.
pub const DEFAULT_INTERVAL_SECS: u64 = 5;

/// Default per-topic [`EventBus`](crate::bus::EventBus) channel capacity.
pub const DEFAULT_BUS_CAPACITY: usize = 16;

/// Default order book depth requested on both sides when polling.
pub const DEFAULT_ORDER_BOOK_DEPTH: usize = 20;

/// Default page size for polled trade history requests.
pub const DEFAULT_TRADE_HISTORY_LIMIT: usize = 20;

/// Configuration for a [`MarketDataManager`](crate::manager::MarketDataManager), consumed from
/// the enclosing application.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Minimum interval between reconciliation passes and the sleep unit of the engine loop.
    ///
    /// Bursts of subscription updates arriving within one interval coalesce into a single pass,
    /// keeping churn within exchange rate limits.
    pub interval_secs: u64,

    /// Per-topic [`EventBus`](crate::bus::EventBus) channel capacity - how far a consumer may lag
    /// before intermediate events are dropped.
    pub bus_capacity: usize,

    /// Order book depth requested on both sides when polling.
    pub order_book_depth: usize,

    /// Page size for polled trade history requests (always page 0).
    pub trade_history_limit: usize,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_INTERVAL_SECS,
            bus_capacity: DEFAULT_BUS_CAPACITY,
            order_book_depth: DEFAULT_ORDER_BOOK_DEPTH,
            trade_history_limit: DEFAULT_TRADE_HISTORY_LIMIT,
        }
    }
}

impl ManagerConfig {
    /// Validate this configuration, returning it unchanged if every field is usable.
    pub fn validate(self) -> Result<Self, DataError> {
        if self.interval_secs < 1 {
            return Err(DataError::Config(
                "interval_secs must be at least 1".to_string(),
            ));
        }
        if self.bus_capacity < 1 {
            return Err(DataError::Config(
                "bus_capacity must be at least 1".to_string(),
            ));
        }
        if self.order_book_depth < 1 {
            return Err(DataError::Config(
                "order_book_depth must be at least 1".to_string(),
            ));
        }
        Ok(self)
    }

    /// The reconciliation loop interval as a [`Duration`].
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_manager_config() {
        struct TestCase {
            input: ManagerConfig,
            expected: Result<ManagerConfig, DataError>,
        }

        let cases = vec![
            TestCase {
                // TC0: default configuration is valid
                input: ManagerConfig::default(),
                expected: Ok(ManagerConfig::default()),
            },
            TestCase {
                // TC1: zero interval is rejected
                input: ManagerConfig {
                    interval_secs: 0,
                    ..ManagerConfig::default()
                },
                expected: Err(DataError::Config("".to_string())),
            },
            TestCase {
                // TC2: zero bus capacity is rejected
                input: ManagerConfig {
                    bus_capacity: 0,
                    ..ManagerConfig::default()
                },
                expected: Err(DataError::Config("".to_string())),
            },
        ];

        for (index, test) in cases.into_iter().enumerate() {
            let actual = test.input.validate();
            match (actual, test.expected) {
                (Ok(actual), Ok(expected)) => {
                    assert_eq!(actual, expected, "TC{} failed", index)
                }
                (Err(_), Err(_)) => {
                    // Test passed
                }
                (actual, expected) => {
                    // Test failed
                    panic!("TC{index} failed because actual != expected. \nActual: {actual:?}\nExpected: {expected:?}\n");
                }
            }
        }
    }

    #[test]
    fn test_de_manager_config_with_partial_fields() {
        let config = serde_json::from_str::<ManagerConfig>(r#"{ "interval_secs": 1 }"#).unwrap();
        assert_eq!(
            config,
            ManagerConfig {
                interval_secs: 1,
                ..ManagerConfig::default()
            }
        );
    }
}
