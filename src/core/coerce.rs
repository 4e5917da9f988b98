//! Coercion of loosely typed input values.
//!
//! Chart input usually arrives as JSON produced by other tools, so numeric
//! attributes may be numbers, numeric strings or booleans, and identities may
//! be strings or numbers. These helpers accept those shapes and reject
//! everything that would otherwise turn into NaN geometry.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Coerces a JSON value into a finite number.
///
/// Accepts numbers, numeric strings (surrounding whitespace ignored) and
/// booleans. Returns `None` for null, arrays, objects, empty or
/// non-numeric strings and non-finite results.
#[must_use]
pub fn number_from_value(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok()?
        }
        Value::Bool(flag) => {
            if *flag {
                1.0
            } else {
                0.0
            }
        }
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    number.is_finite().then_some(number)
}

/// Coerces a JSON value into an identity/tag string.
#[must_use]
pub fn identity_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

pub(crate) fn deserialize_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    number_from_value(&value)
        .ok_or_else(|| D::Error::custom(format!("expected a finite numeric value, got {value}")))
}

pub(crate) fn deserialize_identity<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    identity_from_value(&value)
        .ok_or_else(|| D::Error::custom(format!("expected a string or number identity, got {value}")))
}

pub(crate) fn deserialize_optional_tag<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    identity_from_value(&value)
        .map(Some)
        .ok_or_else(|| D::Error::custom(format!("expected a string or number tag, got {value}")))
}
