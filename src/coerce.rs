use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Non-negative counter from an upstream numeric-as-string field. Anything
/// that does not parse (absent, blank, "-", negative, fractional) counts as 0.
pub fn parse_count(raw: Option<&str>) -> u32 {
    raw.map(str::trim)
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(0)
}

pub fn parse_score(raw: Option<&str>) -> Option<i64> {
    raw.map(str::trim).and_then(|s| s.parse::<i64>().ok())
}

pub fn text_or(raw: Option<&str>, sentinel: &str) -> String {
    non_empty(raw).unwrap_or(sentinel).to_string()
}

pub fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

/// Upstream sends ids, scores and counters either as strings or as bare JSON
/// numbers depending on the endpoint. Normalize both to `Option<String>`.
pub fn loose_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// List field where one malformed row must not sink the rest: items that do
/// not decode are dropped with a warning, and null or non-array input is empty.
pub fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.map(|v| lenient_items(&v)).unwrap_or_default())
}

pub fn lenient_items<T: DeserializeOwned>(value: &Value) -> Vec<T> {
    let Some(items) = value.as_array() else {
        if !value.is_null() {
            warn!("expected a list, got {value}; treating as empty");
        }
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match T::deserialize(item) {
            Ok(row) => Some(row),
            Err(err) => {
                warn!("dropping malformed row: {err}");
                None
            }
        })
        .collect()
}
