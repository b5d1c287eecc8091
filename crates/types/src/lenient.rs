//! Record-level tolerant decoding.
//!
//! A malformed record is logged and dropped; its siblings survive. Fields that
//! are themselves optional decode to `None` when garbled.

use crate::geometry::{Boundary, Ctm};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, de};
use serde_json::Value;
use std::any::type_name;
use std::collections::HashMap;
use std::sync::Arc;

fn short_type_name<T>() -> &'static str {
    type_name::<T>().rsplit("::").next().unwrap_or("record")
}

fn decode_list<T: DeserializeOwned>(values: Vec<Value>) -> Vec<T> {
    values
        .into_iter()
        .enumerate()
        .filter_map(|(i, v)| match serde_json::from_value::<T>(v) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("[MODEL] Dropping malformed {} #{}: {}", short_type_name::<T>(), i, e);
                None
            }
        })
        .collect()
}

pub(crate) fn records<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let values = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(decode_list(values))
}

/// Page-keyed record lists. JSON object keys are page indices.
pub(crate) fn record_map<'de, D, T>(deserializer: D) -> Result<HashMap<usize, Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<HashMap<String, Value>>::deserialize(deserializer)?.unwrap_or_default();
    let mut out = HashMap::with_capacity(raw.len());
    for (key, value) in raw {
        let Ok(page) = key.trim().parse::<usize>() else {
            warn!("[MODEL] Ignoring {} list under non-numeric page key '{}'", short_type_name::<T>(), key);
            continue;
        };
        let items = match value {
            Value::Array(items) => items,
            Value::Null => continue,
            single => vec![single],
        };
        let decoded = decode_list::<T>(items);
        if !decoded.is_empty() {
            out.insert(page, decoded);
        }
    }
    Ok(out)
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Sparse page-size table: blank entries mean "use the document default".
pub(crate) fn page_sizes<'de, D>(deserializer: D) -> Result<Vec<Option<Boundary>>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(values
        .into_iter()
        .enumerate()
        .map(|(i, v)| {
            if is_blank(&v) {
                return None;
            }
            serde_json::from_value::<Boundary>(v)
                .map_err(|e| warn!("[MODEL] Page size entry {} unusable: {}", i, e))
                .ok()
        })
        .collect())
}

fn optional<'de, D, T>(deserializer: D, what: &str) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if is_blank(&value) {
        return Ok(None);
    }
    Ok(serde_json::from_value::<T>(value)
        .map_err(|e| warn!("[MODEL] Ignoring malformed {}: {}", what, e))
        .ok())
}

pub(crate) fn optional_ctm<'de, D>(deserializer: D) -> Result<Option<Ctm>, D::Error>
where
    D: Deserializer<'de>,
{
    optional(deserializer, "CTM")
}

pub(crate) fn optional_boundary<'de, D>(deserializer: D) -> Result<Option<Boundary>, D::Error>
where
    D: Deserializer<'de>,
{
    optional(deserializer, "boundary")
}

/// Numeric attributes kept in their textual form (`"12.5"`, `12.5`, or absent).
pub(crate) fn numeric_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!("expected a number or string, got {}", other))),
    }
}

fn decode_base64(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD.decode(compact)
}

pub(crate) fn payload<'de, D>(deserializer: D) -> Result<Arc<Vec<u8>>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    decode_base64(&s).map(Arc::new).map_err(de::Error::custom)
}

/// Embedded font bytes are optional; a corrupt payload just means "not embedded".
pub(crate) fn optional_payload<'de, D>(deserializer: D) -> Result<Option<Arc<Vec<u8>>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(match value {
        Some(s) if !s.trim().is_empty() => decode_base64(&s)
            .map_err(|e| warn!("[MODEL] Ignoring undecodable embedded payload: {}", e))
            .ok()
            .map(Arc::new),
        _ => None,
    })
}
