use derive_more::Constructor;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Normalised Feedmux [`Ticker`] model - a point-in-time summary of a market.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize, Constructor,
)]
pub struct Ticker {
    pub bid: Decimal,
    pub ask: Decimal,
    pub last: Decimal,
    pub volume_24h: Option<Decimal>,
}

impl Ticker {
    /// Calculate the mid-price by taking the average of the bid and ask prices.
    pub fn mid_price(&self) -> Decimal {
        (self.bid + self.ask) / Decimal::TWO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_ticker_mid_price() {
        let ticker = Ticker::new(dec!(100), dec!(102), dec!(101.5), None);
        assert_eq!(ticker.mid_price(), dec!(101));
    }
}
