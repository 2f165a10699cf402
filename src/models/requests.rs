//! Request DTOs for the HTTP API
//!
//! Query strings accepted by the market and trading endpoints.

use serde::Deserialize;

use crate::error::ServiceError;

/// Query for `GET /market/quotes`
#[derive(Debug, Clone, Deserialize)]
pub struct QuotesQuery {
    /// Comma-separated symbols, e.g. `NSE:TCS-EQ,NSE:INFY-EQ`
    pub symbols: String,
    /// Bypass the cache for this symbol set
    #[serde(default)]
    pub refresh: bool,
}

impl QuotesQuery {
    /// Splits the symbol list, dropping blanks.
    pub fn symbols(&self) -> Vec<String> {
        split_symbols(&self.symbols)
    }
}

/// Query for `GET /market/depth`
#[derive(Debug, Clone, Deserialize)]
pub struct DepthQuery {
    pub symbol: String,
}

/// Query for `GET /trading/orders`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrdersQuery {
    #[serde(default)]
    pub refresh: bool,
}

/// Splits a comma-separated symbol list, trimming entries and dropping blanks.
pub fn split_symbols(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Rejects an empty symbol list or one containing blank symbols.
pub fn validate_symbols(symbols: &[String]) -> Result<(), ServiceError> {
    if symbols.is_empty() {
        return Err(ServiceError::InvalidRequest(
            "At least one symbol is required".to_string(),
        ));
    }
    if symbols.iter().any(|s| s.trim().is_empty()) {
        return Err(ServiceError::InvalidRequest("Symbols cannot be blank".to_string()));
    }
    Ok(())
}
