use serde::{Deserialize, Deserializer, Serialize};
use smol_str::{SmolStr, StrExt};
use std::fmt::{Display, Formatter};

/// Unique identifier for an exchange server.
///
/// [`ExchangeId`] is an open set - the exchanges available to an application are defined by the
/// adapters registered with its
/// `ExchangeRegistry`, not by this crate. Identifiers are lowercase-normalised on construction so
/// configuration keys, registry keys and subscriptions always agree.
///
/// eg/ "binance", "kraken", "coinbase"
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
pub struct ExchangeId(SmolStr);

impl ExchangeId {
    /// Construct a new lowercase-normalised [`ExchangeId`] from the provided value.
    pub fn new<S>(input: S) -> Self
    where
        S: Into<SmolStr>,
    {
        Self(input.into().to_lowercase_smolstr())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ExchangeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ExchangeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for ExchangeId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(ExchangeId::new)
    }
}

impl<S> From<S> for ExchangeId
where
    S: Into<SmolStr>,
{
    fn from(input: S) -> Self {
        ExchangeId::new(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exchange_id_is_lowercase_normalised() {
        assert_eq!(ExchangeId::new("Binance"), ExchangeId::new("binance"));
        assert_eq!(ExchangeId::new("KRAKEN").as_str(), "kraken");
    }
}
