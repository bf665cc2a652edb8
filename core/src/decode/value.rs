//! Raw JSON to declared-shape coercion.
//!
//! # Design
//! Scalar coercion is lenient: numeric strings become numbers, numbers become
//! strings, and `null` or an unparseable scalar yields `Ok(None)` so the field
//! keeps its default. Only a structural mismatch (an array or object where a
//! scalar is declared, a scalar where an object or list is declared) is an
//! error. Nested objects and lists delegate back to the object decoder with
//! the same `DecodeContext`.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::decode::context::{DecodeContext, Segment};
use crate::decode::decoder::decode_object;
use crate::decode::Decodable;
use crate::error::DecodeError;

/// The JSON kind of a raw value, as reported in `DecodeError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonKind {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl JsonKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => JsonKind::Null,
            Value::Bool(_) => JsonKind::Bool,
            Value::Number(_) => JsonKind::Number,
            Value::String(_) => JsonKind::String,
            Value::Array(_) => JsonKind::Array,
            Value::Object(_) => JsonKind::Object,
        }
    }
}

impl fmt::Display for JsonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JsonKind::Null => "null",
            JsonKind::Bool => "boolean",
            JsonKind::Number => "number",
            JsonKind::String => "string",
            JsonKind::Array => "array",
            JsonKind::Object => "object",
        };
        f.write_str(name)
    }
}

/// The shape a descriptor field declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedKind {
    Int,
    Float,
    Bool,
    String,
    Object,
    List,
}

impl fmt::Display for ExpectedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExpectedKind::Int => "int",
            ExpectedKind::Float => "float",
            ExpectedKind::Bool => "bool",
            ExpectedKind::String => "string",
            ExpectedKind::Object => "object",
            ExpectedKind::List => "list",
        };
        f.write_str(name)
    }
}

/// A coerced scalar field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

impl Scalar {
    /// Registry key form. Integral values render without a fraction so that
    /// `5`, `5.0` and `"5"` all address the same object.
    pub fn key(&self) -> String {
        match self {
            Scalar::Int(v) => v.to_string(),
            Scalar::Float(v) if v.fract() == 0.0 && v.abs() < i64::MAX as f64 => {
                (*v as i64).to_string()
            }
            Scalar::Float(v) => v.to_string(),
            Scalar::Bool(v) => v.to_string(),
            Scalar::Str(v) => v.clone(),
        }
    }
}

/// Scalar values assigned to the object currently being decoded, keyed by
/// field name. Identifier and index-lookup fields are read from here.
#[derive(Debug, Default)]
pub struct FieldValues {
    values: HashMap<&'static str, Scalar>,
}

impl FieldValues {
    pub(crate) fn insert(&mut self, field: &'static str, value: Scalar) {
        self.values.insert(field, value);
    }

    pub fn get(&self, field: &str) -> Option<&Scalar> {
        self.values.get(field)
    }
}

pub(crate) fn int(raw: &Value) -> Result<Option<i64>, JsonKind> {
    match raw {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(i64::from(*b))),
        Value::Number(n) => Ok(n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))),
        Value::String(s) => Ok(parse_int(s.trim())),
        other => Err(JsonKind::of(other)),
    }
}

pub(crate) fn float(raw: &Value) -> Result<Option<f64>, JsonKind> {
    match raw {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(if *b { 1.0 } else { 0.0 })),
        Value::Number(n) => Ok(n.as_f64()),
        Value::String(s) => Ok(s.trim().parse::<f64>().ok().filter(|f| f.is_finite())),
        other => Err(JsonKind::of(other)),
    }
}

pub(crate) fn boolean(raw: &Value) -> Result<Option<bool>, JsonKind> {
    match raw {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(*b)),
        Value::Number(n) => Ok(n.as_f64().map(|f| f != 0.0)),
        Value::String(s) => Ok(match s.trim() {
            "true" | "1" => Some(true),
            "false" | "0" | "" => Some(false),
            _ => None,
        }),
        other => Err(JsonKind::of(other)),
    }
}

pub(crate) fn string(raw: &Value) -> Result<Option<String>, JsonKind> {
    match raw {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        other => Err(JsonKind::of(other)),
    }
}

fn parse_int(s: &str) -> Option<i64> {
    s.parse::<i64>().ok().or_else(|| {
        s.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(|f| f as i64)
    })
}

/// Decode a nested object field. `null`, or a repeat of an enclosing object
/// still under construction, leaves the field unset.
pub(crate) fn object<U: Decodable>(
    raw: &Value,
    ctx: &mut DecodeContext<'_>,
) -> Result<Option<Arc<U>>, DecodeError> {
    match raw {
        Value::Null => Ok(None),
        Value::Object(_) => decode_object::<U>(raw, ctx),
        other => Err(ctx.mismatch(ExpectedKind::Object, JsonKind::of(other))),
    }
}

/// Decode a list-of-object field in source order. `null` decodes to an empty
/// list; `null` elements and repeats of an enclosing object are skipped.
pub(crate) fn list<U: Decodable>(
    raw: &Value,
    ctx: &mut DecodeContext<'_>,
) -> Result<Vec<Arc<U>>, DecodeError> {
    let elements = match raw {
        Value::Null => return Ok(Vec::new()),
        Value::Array(elements) => elements,
        other => return Err(ctx.mismatch(ExpectedKind::List, JsonKind::of(other))),
    };

    let mut decoded = Vec::with_capacity(elements.len());
    for (index, element) in elements.iter().enumerate() {
        if element.is_null() {
            debug!(tag = U::TAG, index, "skipping null list element");
            continue;
        }
        ctx.enter(Segment::Index(index));
        let result = decode_object::<U>(element, ctx);
        ctx.leave();
        decoded.extend(result?);
    }
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_strings_coerce_to_numbers() {
        assert_eq!(int(&json!("42")), Ok(Some(42)));
        assert_eq!(int(&json!(" 7 ")), Ok(Some(7)));
        assert_eq!(int(&json!("3.9")), Ok(Some(3)));
        assert_eq!(float(&json!("1.5")), Ok(Some(1.5)));
    }

    #[test]
    fn numbers_and_booleans_coerce_to_strings() {
        assert_eq!(string(&json!(12)), Ok(Some("12".to_string())));
        assert_eq!(string(&json!(true)), Ok(Some("true".to_string())));
    }

    #[test]
    fn boolean_accepts_flags_in_several_encodings() {
        assert_eq!(boolean(&json!(1)), Ok(Some(true)));
        assert_eq!(boolean(&json!(0)), Ok(Some(false)));
        assert_eq!(boolean(&json!("true")), Ok(Some(true)));
        assert_eq!(boolean(&json!("no")), Ok(None));
    }

    #[test]
    fn null_is_absent_for_every_scalar() {
        assert_eq!(int(&Value::Null), Ok(None));
        assert_eq!(float(&Value::Null), Ok(None));
        assert_eq!(boolean(&Value::Null), Ok(None));
        assert_eq!(string(&Value::Null), Ok(None));
    }

    #[test]
    fn non_numeric_string_is_absent_not_an_error() {
        assert_eq!(int(&json!("abc")), Ok(None));
        assert_eq!(float(&json!("NaN")), Ok(None));
    }

    #[test]
    fn containers_are_structural_mismatches_for_scalars() {
        assert_eq!(int(&json!([1])), Err(JsonKind::Array));
        assert_eq!(string(&json!({"a": 1})), Err(JsonKind::Object));
    }

    #[test]
    fn scalar_keys_unify_numeric_forms() {
        assert_eq!(Scalar::Int(5).key(), "5");
        assert_eq!(Scalar::Float(5.0).key(), "5");
        assert_eq!(Scalar::Str("5".into()).key(), "5");
        assert_eq!(Scalar::Float(2.5).key(), "2.5");
    }
}
