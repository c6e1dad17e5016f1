//! Tolerant field deserializers for hand-assembled datasets.
//!
//! A field that cannot be read comes out neutral (`false` or `None`) instead
//! of failing the whole record.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Booleans, non-zero numbers and `"true"`/`"yes"`/`"1"` read as true.
/// Null and everything else read as false.
pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Bool(b)) => b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        Some(Value::String(s)) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "yes" | "1"),
        _ => false,
    })
}

fn count_from_f64(value: f64) -> Option<u32> {
    (value.is_finite() && value >= 0.0 && value <= f64::from(u32::MAX)).then(|| value as u32)
}

/// Non-negative count from an integer, a float (truncated) or a numeric string.
pub fn opt_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64().and_then(count_from_f64),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok().and_then(count_from_f64),
        _ => None,
    })
}

/// Text that may have been exported as a number, e.g. a phone number.
pub fn opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
