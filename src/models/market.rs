//! Market data models
//!
//! Normalized shapes for quotes, candles and order-book depth, plus the
//! conversions from the brokerage's raw payloads.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::CacheKey;
use crate::error::{RemoteError, ServiceError};
use crate::source::{RawCandles, RawDepth, RawDepthLevel, RawQuote};

// == Quote ==
/// A normalized quote for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    /// Last traded price
    pub ltp: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    /// Close, or the last traded price while the session is open
    pub close: f64,
    pub previous_close: f64,
    pub volume: f64,
    /// `ltp - open`
    pub change: f64,
    /// `change / open * 100`, 0 when open is 0
    pub change_percent: f64,
    pub fetched_at: DateTime<Utc>,
}

impl TryFrom<RawQuote> for Quote {
    type Error = RemoteError;

    fn try_from(raw: RawQuote) -> Result<Self, Self::Error> {
        let ltp = raw.ltp.ok_or_else(|| {
            RemoteError::Malformed(format!("quote for {} has no last traded price", raw.symbol))
        })?;
        let open = raw.open.unwrap_or(0.0);
        let change = ltp - open;
        let change_percent = if open == 0.0 {
            0.0
        } else {
            change / open * 100.0
        };

        Ok(Self {
            symbol: raw.symbol,
            ltp,
            open,
            high: raw.high.unwrap_or(0.0),
            low: raw.low.unwrap_or(0.0),
            close: raw.close.unwrap_or(ltp),
            previous_close: raw.previous_close.unwrap_or(0.0),
            volume: raw.volume.unwrap_or(0.0),
            change,
            change_percent,
            fetched_at: Utc::now(),
        })
    }
}

// == Timeframe ==
/// Candle resolution, serialized with the brokerage's resolution codes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1")]
    Minute1,
    #[serde(rename = "5")]
    Minute5,
    #[serde(rename = "15")]
    Minute15,
    #[serde(rename = "30")]
    Minute30,
    #[serde(rename = "60")]
    Hour1,
    #[default]
    #[serde(rename = "D", alias = "daily")]
    Day,
    #[serde(rename = "W", alias = "weekly")]
    Week,
    #[serde(rename = "M", alias = "monthly")]
    Month,
}

impl Timeframe {
    /// Resolution code sent upstream.
    pub fn resolution(&self) -> &'static str {
        match self {
            Timeframe::Minute1 => "1",
            Timeframe::Minute5 => "5",
            Timeframe::Minute15 => "15",
            Timeframe::Minute30 => "30",
            Timeframe::Hour1 => "60",
            Timeframe::Day => "D",
            Timeframe::Week => "W",
            Timeframe::Month => "M",
        }
    }
}

// == History Request ==
/// Parameters of a historical candles lookup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HistoryRequest {
    pub symbol: String,
    #[serde(default)]
    pub timeframe: Timeframe,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl HistoryRequest {
    pub fn new(symbol: impl Into<String>, timeframe: Timeframe, from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe,
            from,
            to,
        }
    }

    /// Rejects blank symbols and inverted date ranges.
    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.symbol.trim().is_empty() {
            return Err(ServiceError::InvalidRequest("Symbol cannot be empty".to_string()));
        }
        if self.from > self.to {
            return Err(ServiceError::InvalidRequest(format!(
                "Invalid date range: from {} is after to {}",
                self.from, self.to
            )));
        }
        Ok(())
    }

    pub fn cache_key(&self) -> String {
        CacheKey::new("historical")
            .param("symbol", self.symbol.as_str())
            .param("timeframe", self.timeframe.resolution())
            .param("from", self.from.to_string())
            .param("to", self.to.to_string())
            .build()
    }
}

// == Candles ==
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Bar open time, Unix seconds
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Candles for one symbol over a date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandleSeries {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub candles: Vec<Candle>,
}

impl CandleSeries {
    /// Zips the columnar upstream arrays into candles.
    ///
    /// Fails when the columns disagree on length.
    pub fn from_raw(request: &HistoryRequest, raw: RawCandles) -> Result<Self, RemoteError> {
        let len = raw.t.len();
        let columns = [raw.o.len(), raw.h.len(), raw.l.len(), raw.c.len(), raw.v.len()];
        if columns.iter().any(|&n| n != len) {
            return Err(RemoteError::Malformed(format!(
                "candle columns for {} have mismatched lengths",
                request.symbol
            )));
        }

        let candles = (0..len)
            .map(|i| Candle {
                time: raw.t[i],
                open: raw.o[i],
                high: raw.h[i],
                low: raw.l[i],
                close: raw.c[i],
                volume: raw.v[i],
            })
            .collect();

        Ok(Self {
            symbol: request.symbol.clone(),
            timeframe: request.timeframe,
            from: request.from,
            to: request.to,
            candles,
        })
    }
}

// == Market Depth ==
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthLevel {
    pub price: f64,
    pub quantity: f64,
    pub orders: u32,
}

impl From<RawDepthLevel> for DepthLevel {
    fn from(raw: RawDepthLevel) -> Self {
        Self {
            price: raw.price.unwrap_or(0.0),
            quantity: raw.quantity.unwrap_or(0.0),
            orders: raw.orders,
        }
    }
}

/// Order-book snapshot for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthSnapshot {
    pub symbol: String,
    pub bids: Vec<DepthLevel>,
    pub asks: Vec<DepthLevel>,
    pub total_bid_quantity: f64,
    pub total_ask_quantity: f64,
    /// Best ask minus best bid, when both sides are quoted
    pub spread: Option<f64>,
}

impl DepthSnapshot {
    pub fn from_raw(symbol: &str, raw: RawDepth) -> Self {
        let bids: Vec<DepthLevel> = raw.bids.into_iter().map(DepthLevel::from).collect();
        let asks: Vec<DepthLevel> = raw.asks.into_iter().map(DepthLevel::from).collect();

        let best_bid = bids.iter().map(|l| l.price).reduce(f64::max);
        let best_ask = asks.iter().map(|l| l.price).reduce(f64::min);
        let spread = best_bid.zip(best_ask).map(|(bid, ask)| ask - bid);

        Self {
            symbol: symbol.to_string(),
            total_bid_quantity: bids.iter().map(|l| l.quantity).sum(),
            total_ask_quantity: asks.iter().map(|l| l.quantity).sum(),
            bids,
            asks,
            spread,
        }
    }
}

// == Market Data ==
/// Payloads stored in the quotes cache domain.
///
/// Quotes and depth snapshots share one store under distinct key prefixes.
#[derive(Debug, Clone, PartialEq)]
pub enum MarketData {
    Quotes(Vec<Quote>),
    Depth(DepthSnapshot),
}

impl MarketData {
    pub fn into_quotes(self) -> Option<Vec<Quote>> {
        match self {
            MarketData::Quotes(quotes) => Some(quotes),
            MarketData::Depth(_) => None,
        }
    }

    pub fn into_depth(self) -> Option<DepthSnapshot> {
        match self {
            MarketData::Depth(depth) => Some(depth),
            MarketData::Quotes(_) => None,
        }
    }
}
