//! Configuration values and type coercion.
//!
//! Files, environment variables and command line arguments mostly carry
//! untyped strings. A source that knows the type of a key (typically the
//! in-code defaults) coerces such strings with [`coerce`].

use crate::error::{ConfigError, ConfigResult};
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{Number, Value as JsonValue};
use std::fmt;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// A single configuration value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Bool(bool),
    Integer(i64),
    Float(f64),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    List(Vec<Value>),
}

/// The type of a [`Value`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    String,
    Bool,
    Integer,
    Float,
    Date,
    DateTime,
    List,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::String => write!(f, "string"),
            ValueKind::Bool => write!(f, "bool"),
            ValueKind::Integer => write!(f, "integer"),
            ValueKind::Float => write!(f, "float"),
            ValueKind::Date => write!(f, "date"),
            ValueKind::DateTime => write!(f, "datetime"),
            ValueKind::List => write!(f, "list"),
        }
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::String(_) => ValueKind::String,
            Value::Bool(_) => ValueKind::Bool,
            Value::Integer(_) => ValueKind::Integer,
            Value::Float(_) => ValueKind::Float,
            Value::Date(_) => ValueKind::Date,
            Value::DateTime(_) => ValueKind::DateTime,
            Value::List(_) => ValueKind::List,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Value::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Convert to JSON. Dates become ISO-8601 strings.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::String(s) => JsonValue::String(s.clone()),
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Integer(i) => JsonValue::Number((*i).into()),
            Value::Float(f) => Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Value::Date(_) | Value::DateTime(_) => JsonValue::String(self.to_string()),
            Value::List(items) => JsonValue::Array(items.iter().map(Value::to_json).collect()),
        }
    }

    /// Convert a JSON scalar or array.
    ///
    /// Returns `Ok(None)` for null, which means "not specified". Objects are
    /// sections and are rejected here.
    pub fn from_json(json: JsonValue) -> ConfigResult<Option<Value>> {
        let value = match json {
            JsonValue::Null => return Ok(None),
            JsonValue::Bool(b) => Value::Bool(b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Float(n.as_f64().unwrap_or_default()),
            },
            JsonValue::String(s) => Value::String(s),
            JsonValue::Array(items) => {
                let mut list = Vec::with_capacity(items.len());
                for item in items {
                    if let Some(value) = Value::from_json(item)? {
                        list.push(value);
                    }
                }
                Value::List(list)
            }
            JsonValue::Object(_) => {
                return Err(ConfigError::parse(
                    "mappings are only supported as sections, not as values",
                ));
            }
        };
        Ok(Some(value))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{}", s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            Value::DateTime(dt) => write!(f, "{}", dt.format(DATETIME_FORMATS[0])),
            Value::List(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "{}", parts.join(", "))
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

/// Coerce `raw` into the kind of `template`.
///
/// `key` is only used for error messages.
pub fn coerce(key: &str, raw: Value, template: &Value) -> ConfigResult<Value> {
    match template {
        Value::List(items) => {
            let element = items.first().cloned().unwrap_or_else(|| Value::from(""));
            let parts = match raw {
                Value::List(parts) => parts,
                Value::String(s) => split_list(&s),
                other => vec![other],
            };
            parts
                .into_iter()
                .map(|part| coerce(key, part, &element))
                .collect::<ConfigResult<Vec<_>>>()
                .map(Value::List)
        }
        _ => coerce_to_kind(key, raw, template.kind()),
    }
}

/// Coerce a scalar into `kind`.
pub fn coerce_to_kind(key: &str, raw: Value, kind: ValueKind) -> ConfigResult<Value> {
    if raw.kind() == kind {
        return Ok(raw);
    }

    let fail = |raw: &Value| ConfigError::coerce(key, raw, kind);
    match (kind, &raw) {
        (ValueKind::String, _) => Ok(Value::String(raw.to_string())),
        (ValueKind::List, Value::String(s)) => Ok(Value::List(split_list(s))),
        (ValueKind::List, _) => Ok(Value::List(vec![raw])),
        (ValueKind::Bool, Value::String(s)) => parse_bool(s).map(Value::Bool).ok_or_else(|| fail(&raw)),
        (ValueKind::Bool, Value::Integer(i)) => Ok(Value::Bool(*i != 0)),
        (ValueKind::Integer, Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| fail(&raw)),
        (ValueKind::Integer, Value::Float(f))
            if f.fract() == 0.0 && (i64::MIN as f64..=i64::MAX as f64).contains(f) =>
        {
            Ok(Value::Integer(*f as i64))
        }
        (ValueKind::Integer, Value::Bool(b)) => Ok(Value::Integer(i64::from(*b))),
        (ValueKind::Float, Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| fail(&raw)),
        (ValueKind::Float, Value::Integer(i)) => Ok(Value::Float(*i as f64)),
        (ValueKind::Date, Value::String(s)) => NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
            .map(Value::Date)
            .map_err(|_| fail(&raw)),
        (ValueKind::Date, Value::DateTime(dt)) => Ok(Value::Date(dt.date())),
        (ValueKind::DateTime, Value::String(s)) => parse_datetime(s.trim())
            .map(Value::DateTime)
            .ok_or_else(|| fail(&raw)),
        _ => Err(fail(&raw)),
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

fn split_list(s: &str) -> Vec<Value> {
    if s.trim().is_empty() {
        return Vec::new();
    }
    s.split(',').map(|part| Value::from(part.trim())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_string_to_integer() {
        let result = coerce("port", Value::from("7"), &Value::from(5)).unwrap();
        assert_eq!(result, Value::Integer(7));
    }

    #[test]
    fn test_coerce_rejects_garbage() {
        let err = coerce("port", Value::from("seven"), &Value::from(5)).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::Coerce);
        assert_eq!(err.key.as_deref(), Some("port"));
    }

    #[test]
    fn test_coerce_bool_spellings() {
        for (raw, expected) in [("yes", true), ("On", true), ("0", false), ("False", false)] {
            let result = coerce("flag", Value::from(raw), &Value::Bool(false)).unwrap();
            assert_eq!(result, Value::Bool(expected), "raw = {}", raw);
        }
    }

    #[test]
    fn test_coerce_dates() {
        let date = NaiveDate::from_ymd_opt(2014, 3, 5).unwrap();
        let result = coerce("when", Value::from("2014-03-05"), &Value::Date(date)).unwrap();
        assert_eq!(result, Value::Date(date));

        let dt = date.and_hms_opt(12, 30, 0).unwrap();
        let result = coerce("at", Value::from("2014-03-05 12:30:00"), &Value::DateTime(dt)).unwrap();
        assert_eq!(result, Value::DateTime(dt));
    }

    #[test]
    fn test_datetime_keeps_fraction_through_json() {
        let dt = NaiveDate::from_ymd_opt(2014, 3, 5)
            .unwrap()
            .and_hms_milli_opt(12, 30, 0, 500)
            .unwrap();
        let json = Value::DateTime(dt).to_json();
        assert_eq!(json, json!("2014-03-05T12:30:00.500"));

        let raw = Value::from_json(json).unwrap().unwrap();
        let result = coerce("at", raw, &Value::DateTime(dt)).unwrap();
        assert_eq!(result, Value::DateTime(dt));

        let whole = NaiveDate::from_ymd_opt(2014, 3, 5).unwrap().and_hms_opt(12, 30, 0).unwrap();
        assert_eq!(Value::DateTime(whole).to_string(), "2014-03-05T12:30:00");
    }

    #[test]
    fn test_float_out_of_integer_range_is_rejected() {
        let err = coerce("n", Value::Float(1e300), &Value::Integer(0)).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::Coerce);

        let result = coerce("n", Value::Float(-42.0), &Value::Integer(0)).unwrap();
        assert_eq!(result, Value::Integer(-42));
    }

    #[test]
    fn test_coerce_list_elements_follow_template() {
        let template = Value::from(vec![1, 2]);
        let result = coerce("ports", Value::from("80, 443"), &template).unwrap();
        assert_eq!(result, Value::from(vec![80, 443]));
    }

    #[test]
    fn test_coerce_to_string_uses_display() {
        let result = coerce("name", Value::Integer(42), &Value::from("x")).unwrap();
        assert_eq!(result, Value::from("42"));
    }

    #[test]
    fn test_json_null_is_unspecified() {
        assert_eq!(Value::from_json(JsonValue::Null).unwrap(), None);
    }

    #[test]
    fn test_json_object_is_rejected() {
        assert!(Value::from_json(json!({"a": 1})).is_err());
    }

    #[test]
    fn test_json_bridge() {
        let value = Value::from_json(json!([1, "two", true, 1.5])).unwrap().unwrap();
        assert_eq!(
            value,
            Value::List(vec![
                Value::Integer(1),
                Value::from("two"),
                Value::Bool(true),
                Value::Float(1.5)
            ])
        );
        assert_eq!(value.to_json(), json!([1, "two", true, 1.5]));
    }

    #[test]
    fn test_display_list() {
        assert_eq!(Value::from(vec!["a", "b"]).to_string(), "a, b");
    }
}
