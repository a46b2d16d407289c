use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use indexmap::IndexMap;
use std::io::Read;

/// Declared SQL type, used for typed NULLs, OUT parameters and date/time markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlType {
    Integer,
    Text,
    Boolean,
    Float,
    Double,
    Binary,
    Date,
    Time,
    Timestamp,
}

/// A value that can be bound to a named placeholder.
///
/// The set of kinds is closed: anything the binder cannot encode is rejected
/// with [`Error::UnsupportedParameterType`](crate::Error::UnsupportedParameterType)
/// instead of being skipped.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Text(String),
    Bool(bool),
    Float(f32),
    Double(f64),
    Blob(Vec<u8>),
    Date(NaiveDate),
    Time(NaiveTime),
    /// Wall-clock date and time with no zone, read in the configured offset.
    DateTime(NaiveDateTime),
    /// Absolute point in time. Bound as a timestamp unless marked as
    /// [`SqlType::Date`] or [`SqlType::Time`].
    Instant(DateTime<Utc>, Option<SqlType>),
    /// SQL NULL. Only binds when the target type is declared.
    Null(Option<SqlType>),
    /// Values for an IN-list placeholder.
    List(Vec<Value>),
}

impl Value {
    /// An untyped NULL. Binding it fails with
    /// [`Error::NullParameter`](crate::Error::NullParameter).
    pub fn null() -> Self {
        Value::Null(None)
    }

    /// A NULL that binds as `sql_type`.
    pub fn typed_null(sql_type: SqlType) -> Self {
        Value::Null(Some(sql_type))
    }

    /// An instant that should be stored as only its date or only its time.
    pub fn instant_as(instant: DateTime<Utc>, marker: SqlType) -> Self {
        Value::Instant(instant, Some(marker))
    }

    /// Drains a reader into a blob value.
    pub fn from_reader<R: Read>(mut reader: R) -> crate::Result<Self> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        Ok(Value::Blob(buf))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null(_))
    }

    /// Short name of the value kind, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Int(_) => "integer",
            Value::Text(_) => "text",
            Value::Bool(_) => "boolean",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::Blob(_) => "blob",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::DateTime(_) => "datetime",
            Value::Instant(..) => "instant",
            Value::Null(_) => "null",
            Value::List(_) => "list",
        }
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::Int(i64::from(v))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Blob(v.to_vec())
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<NaiveTime> for Value {
    fn from(v: NaiveTime) -> Self {
        Value::Time(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Instant(v, None)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null(None), Into::into)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Blob(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl<'a> From<Vec<&'a str>> for Value {
    fn from(v: Vec<&'a str>) -> Self {
        Value::List(v.into_iter().map(Value::from).collect())
    }
}

// `Vec<u8>` is a blob, so lists are only provided for the other element types.
macro_rules! impl_from_vec {
    ($($ty:ty),*) => {
        $(
            impl From<Vec<$ty>> for Value {
                fn from(v: Vec<$ty>) -> Self {
                    Value::List(v.into_iter().map(Value::from).collect())
                }
            }

            impl From<Vec<Option<$ty>>> for Value {
                fn from(v: Vec<Option<$ty>>) -> Self {
                    Value::List(v.into_iter().map(Value::from).collect())
                }
            }
        )*
    };
}

impl_from_vec!(
    i8,
    i16,
    i32,
    i64,
    u16,
    u32,
    bool,
    f32,
    f64,
    String,
    NaiveDate,
    NaiveTime,
    NaiveDateTime
);

/// Insertion-ordered mapping from placeholder name to value.
///
/// Positional statements are built by walking this map, so iteration order is
/// the order in which entries were first inserted.
///
/// ```
/// use sqlx_named_params::{Params, Value};
///
/// let params = Params::new()
///     .with("id", 42)
///     .with("name", "Jane")
///     .with("ids", vec![1, 2, 3]);
///
/// assert_eq!(params.get("id"), Some(&Value::Int(42)));
/// assert_eq!(params.names().collect::<Vec<_>>(), ["id", "name", "ids"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(IndexMap<String, Value>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value and returns the map, for one-expression construction.
    pub fn with<K, V>(mut self, name: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.insert(name, value);
        self
    }

    /// Adds or replaces a value. A replaced entry keeps its original position.
    pub fn insert<K, V>(&mut self, name: K, value: V) -> Option<Value>
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.0.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Insertion-ordered OUT parameter declarations of a stored procedure.
pub type OutParams = IndexMap<String, SqlType>;
