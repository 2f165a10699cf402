//! HTTP Source
//!
//! `RemoteSource` backed by the brokerage REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::raw::{OrderAck, RawCandles, RawDepth, RawOrder, RawQuote};
use super::RemoteSource;
use crate::error::RemoteError;
use crate::models::{HistoryRequest, OrderDetails, OrderModification, ProductType, Validity};

// == Wire Bodies ==
#[derive(Deserialize)]
struct QuotesBody {
    #[serde(default)]
    d: Vec<RawQuote>,
}

#[derive(Deserialize)]
struct DepthBody {
    d: RawDepth,
}

#[derive(Deserialize)]
struct OrderBookBody {
    #[serde(rename = "orderBook", default)]
    order_book: Vec<RawOrder>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OrderPayload<'a> {
    symbol: &'a str,
    qty: u32,
    #[serde(rename = "type")]
    order_type: i64,
    side: i64,
    product_type: ProductType,
    limit_price: f64,
    stop_price: f64,
    validity: Validity,
    disclosed_qty: u32,
    offline_order: &'static str,
}

impl<'a> From<&'a OrderDetails> for OrderPayload<'a> {
    fn from(details: &'a OrderDetails) -> Self {
        Self {
            symbol: &details.symbol,
            qty: details.qty,
            order_type: details.order_type.code(),
            side: details.side.code(),
            product_type: details.product_type,
            limit_price: details.limit_price.unwrap_or(0.0),
            stop_price: details.stop_price.unwrap_or(0.0),
            validity: details.validity,
            disclosed_qty: details.disclosed_qty,
            offline_order: "False",
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ModifyPayload<'a> {
    id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    qty: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop_price: Option<f64>,
}

// == HTTP Source ==
/// Talks to the brokerage over HTTPS with a bearer token.
///
/// Every request carries the client-wide timeout; an elapsed timeout maps to
/// [`RemoteError::Timeout`].
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    base_url: String,
    token: String,
}

impl HttpSource {
    /// # Arguments
    /// * `base_url` - API root, e.g. `https://api.fyers.in/api/v2`
    /// * `token` - Bearer token sent with every request
    /// * `timeout` - Per-request timeout
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, RemoteError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, RemoteError> {
        let response = request.bearer_auth(&self.token).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let value: Value = response.json().await?;
        decode_envelope(value)
    }
}

/// Checks the `{"s": "ok"}` envelope and decodes the body.
fn decode_envelope<T: DeserializeOwned>(value: Value) -> Result<T, RemoteError> {
    let status = value.get("s").and_then(Value::as_str).unwrap_or_default();
    if status != "ok" {
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("no message");
        return Err(RemoteError::Rejected(message.to_string()));
    }

    serde_json::from_value(value).map_err(|e| RemoteError::Malformed(e.to_string()))
}

#[async_trait]
impl RemoteSource for HttpSource {
    async fn fetch_quotes(&self, symbols: &[String]) -> Result<Vec<RawQuote>, RemoteError> {
        debug!("GET quotes for {} symbols", symbols.len());
        let request = self
            .client
            .get(self.url("quotes"))
            .query(&[("symbols", symbols.join(",")), ("ohlcv_flag", "1".to_string())]);

        let body: QuotesBody = self.send(request).await?;
        Ok(body.d)
    }

    async fn fetch_historical_candles(
        &self,
        request: &HistoryRequest,
    ) -> Result<RawCandles, RemoteError> {
        debug!("GET history for {}", request.symbol);
        let builder = self.client.get(self.url("history")).query(&[
            ("symbol", request.symbol.clone()),
            ("resolution", request.timeframe.resolution().to_string()),
            ("date_format", "1".to_string()),
            ("range_from", request.from.to_string()),
            ("range_to", request.to.to_string()),
        ]);

        self.send(builder).await
    }

    async fn fetch_market_depth(&self, symbol: &str) -> Result<RawDepth, RemoteError> {
        let request = self.client.get(self.url("depth")).query(&[("symbol", symbol)]);

        let body: DepthBody = self.send(request).await?;
        Ok(body.d)
    }

    async fn fetch_orders(&self) -> Result<Vec<RawOrder>, RemoteError> {
        let body: OrderBookBody = self.send(self.client.get(self.url("orders"))).await?;
        Ok(body.order_book)
    }

    async fn fetch_order(&self, order_id: &str) -> Result<Option<RawOrder>, RemoteError> {
        let request = self.client.get(self.url("orders")).query(&[("id", order_id)]);

        let body: OrderBookBody = self.send(request).await?;
        Ok(body.order_book.into_iter().next())
    }

    async fn submit_order(&self, details: &OrderDetails) -> Result<OrderAck, RemoteError> {
        let request = self
            .client
            .post(self.url("orders"))
            .json(&OrderPayload::from(details));

        self.send(request).await
    }

    async fn modify_order(
        &self,
        order_id: &str,
        changes: &OrderModification,
    ) -> Result<OrderAck, RemoteError> {
        let payload = ModifyPayload {
            id: order_id,
            qty: changes.qty,
            limit_price: changes.limit_price,
            stop_price: changes.stop_price,
        };
        let request = self.client.put(self.url("orders")).json(&payload);

        self.send(request).await
    }

    async fn cancel_order(&self, order_id: &str) -> Result<OrderAck, RemoteError> {
        let request = self.client.delete(self.url("orders")).query(&[("id", order_id)]);

        self.send(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OrderType, Side};
    use serde_json::json;

    #[test]
    fn test_decode_ok_envelope() {
        let value = json!({"s": "ok", "d": [{"n": "AAA", "lp": 10.5}]});
        let body: QuotesBody = decode_envelope(value).unwrap();

        assert_eq!(body.d.len(), 1);
        assert_eq!(body.d[0].ltp, Some(10.5));
    }

    #[test]
    fn test_decode_rejected_envelope() {
        let value = json!({"s": "error", "code": -16, "message": "invalid token"});
        let result: Result<QuotesBody, _> = decode_envelope(value);

        assert!(matches!(result, Err(RemoteError::Rejected(ref msg)) if msg == "invalid token"));
    }

    #[test]
    fn test_decode_malformed_body() {
        let value = json!({"s": "ok", "d": {"bids": "nope"}});
        let result: Result<DepthBody, _> = decode_envelope(value);

        assert!(matches!(result, Err(RemoteError::Malformed(_))));
    }

    #[test]
    fn test_decode_candles_at_top_level() {
        let value = json!({"s": "ok", "t": [1], "o": [1.0], "h": [2.0], "l": [0.5], "c": [1.5], "v": [10.0]});
        let candles: RawCandles = decode_envelope(value).unwrap();

        assert_eq!(candles.t, vec![1]);
        assert_eq!(candles.c, vec![1.5]);
    }

    #[test]
    fn test_order_payload_uses_codes() {
        let mut details = OrderDetails::market("NSE:TCS-EQ", Side::Sell, 3);
        details.order_type = OrderType::Limit;
        details.limit_price = Some(3500.0);

        let value = serde_json::to_value(OrderPayload::from(&details)).unwrap();
        assert_eq!(value["type"], 1);
        assert_eq!(value["side"], -1);
        assert_eq!(value["productType"], "CNC");
        assert_eq!(value["validity"], "DAY");
        assert_eq!(value["limitPrice"], 3500.0);
        assert_eq!(value["stopPrice"], 0.0);
    }

    #[test]
    fn test_source_trims_base_url() {
        let source = HttpSource::new("https://example.test/api/", "token", Duration::from_secs(1)).unwrap();
        assert_eq!(source.url("orders"), "https://example.test/api/orders");
    }
}
