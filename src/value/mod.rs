use ahash::AHashMap;
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;
use std::rc::Rc;

mod repeated;

pub use repeated::RepeatedView;

/// Runtime value types used during evaluation.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    DateTime(DateTime<Utc>),
    Array(Vec<Value>),
    /// Repeated-element array facade produced by the mock synthesizer.
    Repeated(Rc<RepeatedView>),
    Object(AHashMap<String, Value>),
    Function(FunctionValue),
}

/// A callable value: a builtin namespace function, a method bound to its
/// receiver, or one of the special scope callables.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionValue {
    /// Display name, e.g. `Math.abs` or `toUpperCase`.
    pub name: String,
    pub target: FunctionTarget,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FunctionTarget {
    /// Static namespace function, e.g. `Math.abs`.
    Namespace {
        namespace: &'static str,
        method: &'static str,
    },
    /// Builtin method bound to a receiver value, e.g. `'a'.toUpperCase`.
    Method { receiver: Box<Value>, method: String },
    /// The node-reference callable `$`.
    NodeRef,
    /// The rule-scope `fail` callable.
    Fail,
}

// Manual implementation: cross-variant comparisons are always unequal, and a
// repeated view never equals a plain array even when their contents match.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Repeated(a), Value::Repeated(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a == b,
            _ => false,
        }
    }
}

impl Value {
    /// The runtime type name used in error messages and completion dispatch.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::DateTime(_) => "date",
            Value::Array(_) | Value::Repeated(_) => "array",
            Value::Object(_) => "object",
            Value::Function(_) => "function",
        }
    }

    /// Host-style truthiness: null, false, zero, NaN and the empty string are
    /// falsy, everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            _ => true,
        }
    }

    /// String coercion used when a template folds down to a single scalar.
    /// Scalars use their natural form; structured values serialize as JSON.
    pub fn coerce_string(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::String(s) => s.clone(),
            Value::DateTime(dt) => dt.to_rfc3339_opts(SecondsFormat::Millis, true),
            Value::Function(f) => format!("[Function: {}]", f.name),
            other => other.to_json().to_string(),
        }
    }

    /// Converts to a `serde_json::Value` for serialization contexts.
    /// Dates become RFC 3339 strings; callables have no data representation
    /// and collapse to null; a repeated view materializes its single element.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null | Value::Function(_) => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            // Integral numbers serialize without a fractional part.
            Value::Number(n) if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 => {
                serde_json::Value::Number(serde_json::Number::from(*n as i64))
            }
            Value::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::DateTime(dt) => {
                serde_json::Value::String(dt.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Repeated(view) => {
                serde_json::Value::Array(view.iter().map(Value::to_json).collect())
            }
            Value::Object(entries) => serde_json::Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }

    /// Converts from a `serde_json::Value`, e.g. a node's captured sample data
    /// or the workflow variable bag.
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => {
                Value::Array(items.iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::from_json(v)))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.coerce_string())
    }
}

/// Formats a number the natural way: integral values print without a
/// fractional part.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}
