use std::collections::BTreeMap;
use std::fmt;

use indexmap::IndexMap;

/// Canonical name types used throughout the engine.
pub type TargetName = String;
pub type EventName = String;
pub type SignalName = String;

/// Key/value map handed to `signal()`; consulted by `dynamic` arguments and
/// by binding conditions.
pub type Payload = BTreeMap<String, Value>;

/// Build a payload from `(key, value)` pairs.
pub fn payload<I, K, V>(pairs: I) -> Payload
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// How unresolved references (unknown targets/events) are treated at load.
///
/// - `Lenient`: drop them, log a warning, keep going (default).
/// - `Strict`: refuse to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadMode {
    #[default]
    Lenient,
    Strict,
}

/// A store or payload value.
///
/// Every variant has exactly one string form (see [`Value::render`]), which
/// is what ends up on a target's command line.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Datetime(toml::value::Datetime),
    List(Vec<Value>),
    /// Keys keep the order they were declared or inserted in.
    Map(IndexMap<String, Value>),
}

impl Value {
    /// Render the value as a single command-line argument.
    ///
    /// Strings are emitted verbatim; structured values use inline TOML.
    pub fn render(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => format!("{f:?}"),
            Value::Boolean(b) => b.to_string(),
            Value::Datetime(dt) => dt.to_string(),
            Value::List(_) | Value::Map(_) => toml::Value::from(self.clone()).to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<toml::Value> for Value {
    fn from(value: toml::Value) -> Self {
        match value {
            toml::Value::String(s) => Value::String(s),
            toml::Value::Integer(i) => Value::Integer(i),
            toml::Value::Float(f) => Value::Float(f),
            toml::Value::Boolean(b) => Value::Boolean(b),
            toml::Value::Datetime(dt) => Value::Datetime(dt),
            toml::Value::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            toml::Value::Table(table) => Value::Map(
                table
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for toml::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => toml::Value::String(s),
            Value::Integer(i) => toml::Value::Integer(i),
            Value::Float(f) => toml::Value::Float(f),
            Value::Boolean(b) => toml::Value::Boolean(b),
            Value::Datetime(dt) => toml::Value::Datetime(dt),
            Value::List(items) => {
                toml::Value::Array(items.into_iter().map(toml::Value::from).collect())
            }
            Value::Map(map) => toml::Value::Table(
                map.into_iter()
                    .map(|(k, v)| (k, toml::Value::from(v)))
                    .collect(),
            ),
        }
    }
}

/// Fresh (undecorated) document value, used when writing the store back.
impl From<&Value> for toml_edit::Value {
    fn from(value: &Value) -> Self {
        match value {
            Value::String(s) => s.as_str().into(),
            Value::Integer(i) => (*i).into(),
            Value::Float(f) => (*f).into(),
            Value::Boolean(b) => (*b).into(),
            Value::Datetime(dt) => (*dt).into(),
            Value::List(items) => toml_edit::Value::Array(
                items.iter().map(toml_edit::Value::from).collect(),
            ),
            Value::Map(map) => toml_edit::Value::InlineTable(
                map.iter()
                    .map(|(k, v)| (k.as_str(), toml_edit::Value::from(v)))
                    .collect(),
            ),
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

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}
