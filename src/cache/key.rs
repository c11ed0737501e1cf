//! Cache Key Module
//!
//! Derives fully-qualified cache keys from a base key and identifying parameters.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Separates the base key from the serialized parameters.
pub const PARAMS_SEPARATOR: &str = "?";

/// Separates individual `name:value` pairs.
pub const PAIR_DELIMITER: &str = "|";

// == Param Value ==
/// A scalar parameter value that can take part in a cache key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(v) => write!(f, "{}", v),
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Float(v) => write!(f, "{}", v),
            ParamValue::Str(v) => f.write_str(v),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Str(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        ParamValue::Str(value.clone())
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Int(value.into())
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Int(value.into())
    }
}

impl From<usize> for ParamValue {
    fn from(value: usize) -> Self {
        ParamValue::Int(value as i64)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

// == Cache Params ==
/// Identifying parameters for a cache lookup.
///
/// Backed by a `BTreeMap` so iteration is always in lexicographic name order,
/// which is what makes key derivation independent of insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheParams(BTreeMap<String, ParamValue>);

impl CacheParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<K, V> FromIterator<(K, V)> for CacheParams
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

// == Build Key ==
/// Builds the full cache key for `base_key` and optional `params`.
///
/// Without parameters the full key is the base key itself. Otherwise it is
/// `base?name1:value1|name2:value2` with names in lexicographic order.
pub fn build_cache_key(base_key: &str, params: Option<&CacheParams>) -> String {
    match params {
        Some(params) if !params.is_empty() => {
            let pairs: Vec<String> = params
                .0
                .iter()
                .map(|(name, value)| format!("{}:{}", name, value))
                .collect();
            format!(
                "{}{}{}",
                base_key,
                PARAMS_SEPARATOR,
                pairs.join(PAIR_DELIMITER)
            )
        }
        _ => base_key.to_string(),
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_without_params() {
        assert_eq!(build_cache_key("admin_stats", None), "admin_stats");
        assert_eq!(
            build_cache_key("admin_stats", Some(&CacheParams::new())),
            "admin_stats"
        );
    }

    #[test]
    fn test_key_with_single_param() {
        let params = CacheParams::new().with("user_id", "u-1");
        assert_eq!(
            build_cache_key("user_profile", Some(&params)),
            "user_profile?user_id:u-1"
        );
    }

    #[test]
    fn test_key_param_order_independent() {
        let ab = CacheParams::new().with("a", 1).with("b", 2);
        let ba = CacheParams::new().with("b", 2).with("a", 1);

        assert_eq!(
            build_cache_key("base", Some(&ab)),
            build_cache_key("base", Some(&ba))
        );
        assert_eq!(build_cache_key("base", Some(&ab)), "base?a:1|b:2");
    }

    #[test]
    fn test_key_from_iterator() {
        let params: CacheParams = vec![("limit", 10), ("offset", 0)].into_iter().collect();
        assert_eq!(params.len(), 2);
        assert_eq!(
            build_cache_key("published_articles", Some(&params)),
            "published_articles?limit:10|offset:0"
        );
    }

    #[test]
    fn test_param_value_display() {
        assert_eq!(ParamValue::from(true).to_string(), "true");
        assert_eq!(ParamValue::from(42i64).to_string(), "42");
        assert_eq!(ParamValue::from(1.5).to_string(), "1.5");
        assert_eq!(ParamValue::from("x").to_string(), "x");
    }
}
