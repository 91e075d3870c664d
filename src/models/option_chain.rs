use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

/// One strike of the `filtered.data` array returned by the NSE option-chain API
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawChainEntry {
    #[serde(rename = "strikePrice")]
    pub strike_price: Option<f64>,

    #[serde(rename = "CE", default)]
    pub call: Option<OptionQuote>,

    #[serde(rename = "PE", default)]
    pub put: Option<OptionQuote>,
}

/// Quote for one side (CE or PE) of a strike.
///
/// Every field is optional: NSE omits keys on illiquid strikes and only some
/// PE records carry `underlyingValue`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OptionQuote {
    #[serde(rename = "strikePrice")]
    pub strike_price: Option<f64>,

    #[serde(rename = "underlyingValue")]
    pub underlying_value: Option<f64>,

    #[serde(rename = "openInterest", default, deserialize_with = "quantity")]
    pub open_interest: Option<i64>,

    #[serde(rename = "changeinOpenInterest", default, deserialize_with = "quantity")]
    pub change_in_open_interest: Option<i64>,

    #[serde(rename = "totalTradedVolume", default, deserialize_with = "quantity")]
    pub total_traded_volume: Option<i64>,

    #[serde(rename = "impliedVolatility")]
    pub implied_volatility: Option<f64>,

    #[serde(rename = "lastPrice")]
    pub last_price: Option<f64>,

    #[serde(rename = "pChange")]
    pub percent_change: Option<f64>,
}

impl RawChainEntry {
    /// Strike as quoted by the CE side, falling back to PE and then the entry itself
    pub fn quoted_strike(&self) -> Option<f64> {
        self.call
            .as_ref()
            .and_then(|q| q.strike_price)
            .or_else(|| self.put.as_ref().and_then(|q| q.strike_price))
            .or(self.strike_price)
    }
}

/// Contract counts arrive as `1234` or `1234.0` depending on the endpoint revision
fn quantity<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(number) = Option::<serde_json::Number>::deserialize(deserializer)? else {
        return Ok(None);
    };

    if let Some(value) = number.as_i64() {
        return Ok(Some(value));
    }

    match number.as_f64() {
        Some(value) if value.is_finite() && value.fract() == 0.0 => Ok(Some(value as i64)),
        _ => Err(D::Error::custom(format!(
            "expected a whole contract count, got {}",
            number
        ))),
    }
}
