//! Record API row mappings.
//!
//! Rows arrive as loosely typed JSON: numbers sometimes as strings, dates as
//! RFC 3339 timestamps or bare dates. The helpers here accept every shape the
//! record API is known to produce.

pub mod ai_log;
pub mod app;
pub mod sales_comment;
pub mod user_details;

pub use ai_log::AiLogEntity;
pub use app::AppEntity;
pub use sales_comment::SalesCommentEntity;
pub use user_details::UserDetailsEntity;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use domain::error::ServiceError;
use domain::services::RecordFields;
use serde::de::{DeserializeOwned, Error as DeError};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Decodes one row, naming the table on failure.
pub fn decode_row<T: DeserializeOwned>(table: &str, row: Value) -> Result<T, ServiceError> {
    serde_json::from_value(row)
        .map_err(|e| ServiceError::Network(format!("could not decode {} record: {}", table, e)))
}

/// Decodes every row, skipping (and logging) the ones that do not decode.
pub fn decode_rows<T: DeserializeOwned>(table: &str, rows: Vec<Value>) -> Vec<T> {
    rows.into_iter()
        .filter_map(|row| match decode_row(table, row) {
            Ok(entity) => Some(entity),
            Err(e) => {
                tracing::warn!(table = %table, error = %e, "Skipping undecodable record");
                None
            }
        })
        .collect()
}

/// Serializes a field set into the record field map sent to the API.
pub fn to_record_fields<T: Serialize>(fields: &T) -> Result<RecordFields, ServiceError> {
    match serde_json::to_value(fields) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ServiceError::invalid(format!(
            "record fields must be an object, got {}",
            other
        ))),
        Err(e) => Err(ServiceError::invalid(e.to_string())),
    }
}

/// Parses the timestamp formats the record API emits.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .map(|d| d.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|n| n.and_utc())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|n| n.and_utc())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|n| n.and_utc())
        })
}

pub(crate) fn record_id<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    let raw = Value::deserialize(d)?;
    value_to_i64(&raw).ok_or_else(|| D::Error::custom(format!("invalid record id: {}", raw)))
}

pub(crate) fn timestamp<'de, D: Deserializer<'de>>(d: D) -> Result<Option<DateTime<Utc>>, D::Error> {
    let raw = Option::<Value>::deserialize(d)?;
    Ok(raw.as_ref().and_then(Value::as_str).and_then(parse_timestamp))
}

pub(crate) fn number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let raw = Option::<Value>::deserialize(d)?;
    Ok(match raw {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

pub(crate) fn integer<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    let raw = Option::<Value>::deserialize(d)?;
    Ok(raw.as_ref().and_then(value_to_i64).unwrap_or(0))
}

pub(crate) fn text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let raw = Option::<Value>::deserialize(d)?;
    Ok(match raw {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

pub(crate) fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    let raw = Option::<Value>::deserialize(d)?;
    Ok(match raw {
        Some(Value::Bool(b)) => b,
        Some(Value::Number(n)) => n.as_i64().is_some_and(|n| n != 0),
        Some(Value::String(s)) => matches!(s.to_ascii_lowercase().as_str(), "true" | "1" | "yes"),
        _ => false,
    })
}

fn value_to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
