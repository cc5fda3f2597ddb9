//! Decoding of producer lines into key events.
//!
//! Decoding happens in two steps with different failure classes: text that
//! is not JSON at all is a recoverable [`KeylogError::Decode`], while JSON of
//! the wrong shape (not an object, a non-numeric `time`) is fatal.

use serde_json::{Map, Value};

use crate::errors::{KeylogError, KeylogResult};

/// Written in place of a `key` or `action` the producer left out.
pub const MISSING_FIELD: &str = "N/A";

/// One key event, alive for a single loop iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub key: String,
    pub action: String,
    /// Producer timestamp in milliseconds.
    pub time_ms: f64,
}

/// Parses an already trimmed line as JSON.
pub fn parse_line(line: &str) -> KeylogResult<Value> {
    serde_json::from_str(line).map_err(|source| KeylogError::Decode {
        line: line.to_string(),
        source,
    })
}

impl LogEntry {
    /// Extracts the event fields, substituting `now_ms` for a missing `time`.
    pub fn from_value(value: &Value, now_ms: f64) -> KeylogResult<Self> {
        let object = value.as_object().ok_or_else(|| {
            KeylogError::unexpected(format!(
                "expected a JSON object, got {}",
                json_kind(value)
            ))
        })?;

        let time_ms = match object.get("time") {
            None => now_ms,
            Some(time) => numeric_time(time)?,
        };

        Ok(Self {
            key: text_field(object, "key"),
            action: text_field(object, "action"),
            time_ms,
        })
    }
}

/// Booleans count as 1 and 0, as in rows written by the earlier backend.
fn numeric_time(time: &Value) -> KeylogResult<f64> {
    match time {
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        other => other.as_f64().ok_or_else(|| {
            KeylogError::unexpected(format!(
                "field 'time' must be a number, got {}",
                json_kind(other)
            ))
        }),
    }
}

/// Scalars are written as `True`/`False`/`None` and plain numbers, matching
/// rows already produced by the earlier backend. Arrays and objects keep
/// their JSON text.
fn text_field(object: &Map<String, Value>, name: &str) -> String {
    match object.get(name) {
        None => MISSING_FIELD.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(true)) => "True".to_string(),
        Some(Value::Bool(false)) => "False".to_string(),
        Some(Value::Null) => "None".to_string(),
        Some(other) => other.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn all_fields_present() {
        let entry =
            LogEntry::from_value(&json!({"key": "a", "action": "down", "time": 1000}), 5.0)
                .unwrap();
        assert_eq!(
            entry,
            LogEntry {
                key: "a".to_string(),
                action: "down".to_string(),
                time_ms: 1000.0,
            }
        );
    }

    #[test]
    fn missing_fields_use_defaults() {
        let entry = LogEntry::from_value(&json!({}), 42_000.5).unwrap();
        assert_eq!(entry.key, MISSING_FIELD);
        assert_eq!(entry.action, MISSING_FIELD);
        assert_eq!(entry.time_ms, 42_000.5);
    }

    #[test]
    fn fractional_time_is_kept() {
        let entry = LogEntry::from_value(&json!({"time": 1234.5678}), 0.0).unwrap();
        assert_eq!(entry.time_ms, 1234.5678);
    }

    #[test]
    fn non_string_text_fields() {
        let entry =
            LogEntry::from_value(&json!({"key": 7, "action": null, "time": 1}), 0.0).unwrap();
        assert_eq!(entry.key, "7");
        assert_eq!(entry.action, "None");

        let entry = LogEntry::from_value(&json!({"key": true, "action": false}), 0.0).unwrap();
        assert_eq!(entry.key, "True");
        assert_eq!(entry.action, "False");

        let entry = LogEntry::from_value(&json!({"key": [1, 2]}), 0.0).unwrap();
        assert_eq!(entry.key, "[1,2]");
    }

    #[test]
    fn boolean_time_counts_as_number() {
        let entry = LogEntry::from_value(&json!({"key": "a", "time": true}), 9.0).unwrap();
        assert_eq!(entry.time_ms, 1.0);
        let entry = LogEntry::from_value(&json!({"time": false}), 9.0).unwrap();
        assert_eq!(entry.time_ms, 0.0);
    }

    #[test]
    fn non_object_is_fatal() {
        for value in [json!([1, 2]), json!(5), json!("x"), Value::Null] {
            let err = LogEntry::from_value(&value, 0.0).unwrap_err();
            assert!(!err.is_recoverable(), "{value} should be fatal");
        }
    }

    #[test]
    fn non_numeric_time_is_fatal() {
        let err = LogEntry::from_value(&json!({"time": "12"}), 0.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "An unexpected error occurred: field 'time' must be a number, got a string"
        );
        assert!(LogEntry::from_value(&json!({"time": null}), 0.0).is_err());
    }

    #[test]
    fn parse_failure_keeps_line() {
        match parse_line("not json") {
            Err(KeylogError::Decode { line, .. }) => assert_eq!(line, "not json"),
            other => panic!("expected decode error, got {other:?}"),
        }
        assert!(parse_line("").unwrap_err().is_recoverable());
    }
}
