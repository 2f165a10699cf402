//! Raw brokerage payloads
//!
//! Wire shapes as returned by the brokerage, before normalization. Numeric
//! fields tolerate numbers, numeric strings and nulls.

use serde::{Deserialize, Deserializer};

/// One quote row of the quotes endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawQuote {
    #[serde(rename = "n")]
    pub symbol: String,
    #[serde(rename = "lp", default, deserialize_with = "flexible_f64")]
    pub ltp: Option<f64>,
    #[serde(rename = "o", default, deserialize_with = "flexible_f64")]
    pub open: Option<f64>,
    #[serde(rename = "h", default, deserialize_with = "flexible_f64")]
    pub high: Option<f64>,
    #[serde(rename = "l", default, deserialize_with = "flexible_f64")]
    pub low: Option<f64>,
    #[serde(rename = "c", default, deserialize_with = "flexible_f64")]
    pub close: Option<f64>,
    #[serde(rename = "pc", default, deserialize_with = "flexible_f64")]
    pub previous_close: Option<f64>,
    #[serde(rename = "v", default, deserialize_with = "flexible_f64")]
    pub volume: Option<f64>,
}

/// Columnar candle arrays of the history endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawCandles {
    #[serde(default)]
    pub t: Vec<i64>,
    #[serde(default)]
    pub o: Vec<f64>,
    #[serde(default)]
    pub h: Vec<f64>,
    #[serde(default)]
    pub l: Vec<f64>,
    #[serde(default)]
    pub c: Vec<f64>,
    #[serde(default)]
    pub v: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawDepthLevel {
    #[serde(default, deserialize_with = "flexible_f64")]
    pub price: Option<f64>,
    #[serde(alias = "volume", alias = "qty", default, deserialize_with = "flexible_f64")]
    pub quantity: Option<f64>,
    #[serde(alias = "ord", default)]
    pub orders: u32,
}

/// Order-book depth of the depth endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawDepth {
    #[serde(default)]
    pub bids: Vec<RawDepthLevel>,
    #[serde(alias = "ask", default)]
    pub asks: Vec<RawDepthLevel>,
}

/// One entry of the order book endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOrder {
    pub id: String,
    pub symbol: String,
    #[serde(rename = "type")]
    pub order_type: i64,
    pub side: i64,
    pub status: i64,
    pub qty: u32,
    #[serde(default)]
    pub filled_qty: u32,
    #[serde(default, deserialize_with = "flexible_f64")]
    pub limit_price: Option<f64>,
    #[serde(default, deserialize_with = "flexible_f64")]
    pub stop_price: Option<f64>,
    #[serde(default)]
    pub order_timestamp: Option<i64>,
    #[serde(default)]
    pub exchange_order_id: Option<String>,
    #[serde(default)]
    pub product_type: Option<String>,
    #[serde(default)]
    pub validity: Option<String>,
}

/// Acknowledgement of an order write.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OrderAck {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

/// Accepts `1.5`, `"1.5"`, `""` and `null`.
fn flexible_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Number(n)) => Ok(Some(n)),
        Some(NumberOrString::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(NumberOrString::Text(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
