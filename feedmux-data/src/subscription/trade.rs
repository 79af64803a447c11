use feedmux_instrument::Side;
use serde::{Deserialize, Serialize};

/// Normalised Feedmux [`PublicTrade`] model - a single trade printed on the public tape.
#[derive(Clone, PartialEq, PartialOrd, Debug, Deserialize, Serialize)]
pub struct PublicTrade {
    pub id: String,
    pub price: f64,
    pub amount: f64,
    pub side: Side,
}
