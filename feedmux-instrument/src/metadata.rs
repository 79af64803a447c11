use derive_more::Constructor;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Describes the tick scales and minimum order size of a market.
///
/// Consumed by downstream strategy code when rounding prices and amounts to values the exchange
/// will accept.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize, Constructor)]
pub struct MarketMetadata {
    /// Number of decimal places the exchange accepts for a price.
    pub price_scale: u32,
    /// Number of decimal places the exchange accepts for an amount.
    pub amount_scale: u32,
    /// Minimum order amount accepted by the exchange, if published.
    pub min_amount: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_metadata_round_trip() {
        let metadata = MarketMetadata::new(2, 8, Some(Decimal::new(1, 4)));
        let json = serde_json::to_string(&metadata).unwrap();
        assert_eq!(
            serde_json::from_str::<MarketMetadata>(&json).unwrap(),
            metadata
        );
    }
}
