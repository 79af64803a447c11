use crate::subscription::SubKind;
use feedmux_instrument::exchange::ExchangeId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors generated at the adapter seam - the transport-level taxonomy shared by every
/// [`ExchangeAdapter`](crate::exchange::ExchangeAdapter) and
/// [`TradeAdapter`](crate::exchange::TradeAdapter) implementation.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize, Error)]
pub enum AdapterError {
    #[error("connectivity failure: {0}")]
    Connectivity(String),

    #[error("rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("{entity} does not support: {item}")]
    Unsupported { entity: String, item: String },

    #[error("protocol violation: {0}")]
    Protocol(String),
}

impl AdapterError {
    /// Construct an [`AdapterError::Unsupported`] for the provided entity and unsupported item.
    pub fn unsupported<E, I>(entity: E, item: I) -> Self
    where
        E: Into<String>,
        I: Into<String>,
    {
        Self::Unsupported {
            entity: entity.into(),
            item: item.into(),
        }
    }
}

/// All errors generated in `feedmux-data`.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize, Error)]
pub enum DataError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("subscriptions reference unknown exchange: {0}")]
    UnknownExchange(ExchangeId),

    #[error("unsupported Subscription for exchange: {exchange}, kind: {kind}")]
    Unsupported {
        exchange: ExchangeId,
        kind: SubKind,
    },

    #[error("AdapterError: {0}")]
    Adapter(#[from] AdapterError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adapter_error_propagates_into_data_error() {
        let error = AdapterError::unsupported("kraken", "public_trades polling");
        assert_eq!(
            DataError::from(error.clone()),
            DataError::Adapter(error),
        );
    }
}
