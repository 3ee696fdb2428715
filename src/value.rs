//! Input values and the one-step classification the escaper dispatches on.

use crate::trust::{Trust, TrustKind, TrustedSql};
use chrono::{DateTime, TimeZone, Utc};

/// A value to be escaped into SQL text.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// `None` is not-a-date and escapes to `NULL`.
    Date(Option<DateTime<Utc>>),
    Blob(Vec<u8>),
    Sequence(Vec<Value>),
    Mapping(Vec<(String, Value)>),
    Object(Object),
    /// A function-valued member. Mappings skip these.
    Callable(String),
    Trusted(TrustedSql),
}

impl Value {
    /// Parses an RFC 3339 timestamp. Anything unparseable is not-a-date.
    pub fn date_from_str(s: &str) -> Value {
        match DateTime::parse_from_rfc3339(s) {
            Ok(dt) => Value::Date(Some(dt.with_timezone(&Utc))),
            Err(_) => Value::Date(None),
        }
    }

    pub fn seq<I, T>(items: I) -> Value
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Value::Sequence(items.into_iter().map(Into::into).collect())
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Callable(_))
    }
}

/// A plain object: a textual representation plus keyed fields.
///
/// `sql_string` models an object's own "convert me to SQL" hook. It is kept
/// so callers can attach one, and is never read when escaping.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Object {
    text: String,
    fields: Vec<(String, Value)>,
    sql_string: Option<String>,
}

impl Object {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    pub fn method(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.fields.push((name.clone(), Value::Callable(name)));
        self
    }

    pub fn with_sql_string(mut self, sql: impl Into<String>) -> Self {
        self.sql_string = Some(sql.into());
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }

    pub fn sql_string(&self) -> Option<&str> {
        self.sql_string.as_deref()
    }
}

/// Closed classification of a [`Value`], matched exhaustively by the escaper.
#[derive(Debug)]
pub enum Shape<'a> {
    Null,
    Bool(bool),
    /// Numeric literal text, already rendered.
    Number(String),
    Text(&'a str),
    DateTime(Option<&'a DateTime<Utc>>),
    Blob(&'a [u8]),
    Sequence(&'a [Value]),
    Mapping(&'a [(String, Value)]),
    TrustedFragment(&'a str),
    TrustedIdentifier(&'a str),
    /// Anything else. `fields` is `Some` when the value can be exploded
    /// into `key = value` pairs; otherwise only `text` is usable.
    Other {
        text: &'a str,
        fields: Option<&'a [(String, Value)]>,
    },
}

/// Classify `value`. Trusted values are only honored if `trust` recognizes them.
pub fn classify<'a>(value: &'a Value, trust: &dyn Trust) -> Shape<'a> {
    match value {
        Value::Null => Shape::Null,
        Value::Bool(b) => Shape::Bool(*b),
        Value::Int(n) => Shape::Number(n.to_string()),
        Value::Float(f) => Shape::Number(float_text(*f)),
        Value::Text(s) => Shape::Text(s),
        Value::Date(d) => Shape::DateTime(d.as_ref()),
        Value::Blob(b) => Shape::Blob(b),
        Value::Sequence(items) => Shape::Sequence(items),
        Value::Mapping(pairs) => Shape::Mapping(pairs),
        Value::Object(obj) => Shape::Other {
            text: obj.text(),
            fields: Some(obj.fields()),
        },
        Value::Callable(name) => Shape::Other {
            text: name,
            fields: None,
        },
        Value::Trusted(t) if trust.is_trusted(t) => match t.kind() {
            TrustKind::Fragment => Shape::TrustedFragment(t.as_str()),
            TrustKind::Identifier => Shape::TrustedIdentifier(t.as_str()),
        },
        Value::Trusted(t) => {
            tracing::debug!(text = t.as_str(), "ignoring trusted value with a foreign seal");
            Shape::Other {
                text: t.as_str(),
                fields: None,
            }
        }
    }
}

fn float_text(f: f64) -> String {
    if f.is_nan() {
        "NaN".into()
    } else if f.is_infinite() {
        if f > 0.0 { "Infinity".into() } else { "-Infinity".into() }
    } else {
        f.to_string()
    }
}

macro_rules! from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(n: $t) -> Self {
                Value::Int(n.into())
            }
        })*
    };
}

from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        match i64::try_from(n) {
            Ok(i) => Value::Int(i),
            Err(_) => Value::Float(n as f64),
        }
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(f.into())
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Blob(b)
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::Blob(b.to_vec())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Sequence(items)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Value {
    fn from(dt: DateTime<Tz>) -> Self {
        Value::Date(Some(dt.with_timezone(&Utc)))
    }
}

impl From<TrustedSql> for Value {
    fn from(t: TrustedSql) -> Self {
        Value::Trusted(t)
    }
}

impl From<Object> for Value {
    fn from(o: Object) -> Self {
        Value::Object(o)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        use serde_json::Value as J;
        match v {
            J::Null => Value::Null,
            J::Bool(b) => Value::Bool(b),
            J::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            J::String(s) => Value::Text(s),
            J::Array(items) => Value::Sequence(items.into_iter().map(Value::from).collect()),
            J::Object(map) => Value::Mapping(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect()),
        }
    }
}
