//! Cache Key Module
//!
//! Deterministic cache keys built from a prefix and a set of named parameters.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

// == Cache Key ==
/// Builder for a cache key string.
///
/// Parameters live in a sorted map, so the rendered key does not depend on
/// the order in which they were added. Each value is rendered as compact
/// JSON: `prefix:name1=value1&name2=value2`, or just `prefix` when there are
/// no parameters. Names made of ASCII letters, digits, `_`, `-` and `.` are
/// written bare; any other name is written as a JSON string, so a name
/// holding `=` or `&` cannot mimic another parameter list.
///
/// ```
/// use trade_cache::cache::CacheKey;
///
/// let key = CacheKey::new("historical")
///     .param("to", "2024-02-01")
///     .param("symbol", "NSE:TCS-EQ")
///     .build();
/// assert_eq!(key, r#"historical:symbol="NSE:TCS-EQ"&to="2024-02-01""#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey {
    prefix: String,
    params: BTreeMap<String, Value>,
}

impl CacheKey {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            params: BTreeMap::new(),
        }
    }

    /// Adds a parameter. A later value for the same name replaces the earlier one.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Adds an optional parameter; `None` renders as `null`.
    pub fn opt_param<V: Into<Value>>(self, name: impl Into<String>, value: Option<V>) -> Self {
        self.param(name, value.map_or(Value::Null, Into::into))
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    // == Build ==
    /// Renders the key string.
    pub fn build(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.prefix)?;

        for (i, (name, value)) in self.params.iter().enumerate() {
            let sep = if i == 0 { ':' } else { '&' };
            if is_bare_name(name) {
                write!(f, "{sep}{name}={value}")?;
            } else {
                write!(f, "{sep}{}={value}", Value::from(name.as_str()))?;
            }
        }
        Ok(())
    }
}

fn is_bare_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.'))
}

impl From<CacheKey> for String {
    fn from(key: CacheKey) -> Self {
        key.build()
    }
}

// == Create Cache Key ==
/// Builds a key from a prefix and any collection of `(name, value)` pairs.
///
/// # Arguments
/// * `prefix` - Domain prefix such as `quotes` or `orders`
/// * `params` - Request parameters, in any order
pub fn create_cache_key<I, K, V>(prefix: &str, params: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    params
        .into_iter()
        .fold(CacheKey::new(prefix), |key, (name, value)| key.param(name, value))
        .build()
}
