use crate::backend::Backend;
use crate::template::Prepared;
use crate::value::{SqlType, Value};
use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, Utc};

/// Settings applied while converting values to driver types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindOptions {
    /// Offset in which timezone-naive date-times are read, and in which
    /// instants are split into a date or a time. Defaults to UTC.
    pub offset: FixedOffset,
}

impl Default for BindOptions {
    fn default() -> Self {
        Self { offset: Utc.fix() }
    }
}

impl BindOptions {
    pub fn with_offset(offset: FixedOffset) -> Self {
        Self { offset }
    }
}

/// A value resolved to exactly one driver encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum Bound {
    Int(i64),
    Text(String),
    Bool(bool),
    Float(f32),
    Double(f64),
    Blob(Vec<u8>),
    Date(NaiveDate),
    Time(NaiveTime),
    /// UTC wall clock.
    Timestamp(NaiveDateTime),
    Null(SqlType),
}

impl Bound {
    /// SQL type the value is sent as.
    pub fn sql_type(&self) -> SqlType {
        match self {
            Bound::Int(_) => SqlType::Integer,
            Bound::Text(_) => SqlType::Text,
            Bound::Bool(_) => SqlType::Boolean,
            Bound::Float(_) => SqlType::Float,
            Bound::Double(_) => SqlType::Double,
            Bound::Blob(_) => SqlType::Binary,
            Bound::Date(_) => SqlType::Date,
            Bound::Time(_) => SqlType::Time,
            Bound::Timestamp(_) => SqlType::Timestamp,
            Bound::Null(t) => *t,
        }
    }
}

/// Picks the driver encoding for `value`.
///
/// # Errors
///
/// [`Error::NullParameter`](crate::Error::NullParameter) for an untyped NULL and
/// [`Error::UnsupportedParameterType`](crate::Error::UnsupportedParameterType)
/// for a kind with no encoding (a list outside of IN-list expansion).
pub fn resolve(name: &str, value: &Value, options: &BindOptions) -> crate::Result<Bound> {
    let bound = match value {
        Value::Int(v) => Bound::Int(*v),
        Value::Text(v) => Bound::Text(v.clone()),
        Value::Bool(v) => Bound::Bool(*v),
        Value::Float(v) => Bound::Float(*v),
        Value::Double(v) => Bound::Double(*v),
        Value::Blob(v) => Bound::Blob(v.clone()),
        Value::Date(v) => Bound::Date(*v),
        Value::Time(v) => Bound::Time(*v),
        Value::DateTime(v) => {
            let local = v.and_local_timezone(options.offset).single().ok_or_else(|| {
                crate::Error::UnsupportedParameterType {
                    name: name.to_owned(),
                    kind: "datetime out of range",
                }
            })?;
            Bound::Timestamp(local.naive_utc())
        }
        Value::Instant(v, Some(SqlType::Date)) => {
            Bound::Date(v.with_timezone(&options.offset).date_naive())
        }
        Value::Instant(v, Some(SqlType::Time)) => {
            Bound::Time(v.with_timezone(&options.offset).time())
        }
        Value::Instant(v, _) => Bound::Timestamp(v.naive_utc()),
        Value::Null(Some(t)) => Bound::Null(*t),
        Value::Null(None) => return Err(crate::Error::NullParameter(name.to_owned())),
        Value::List(_) => {
            return Err(crate::Error::UnsupportedParameterType {
                name: name.to_owned(),
                kind: value.kind(),
            })
        }
    };
    Ok(bound)
}

/// Builds the positional argument buffer for `prepared`.
pub(crate) fn arguments<'q, DB: Backend>(
    prepared: &Prepared,
    options: &BindOptions,
) -> crate::Result<DB::Args<'q>> {
    let mut args: DB::Args<'q> = Default::default();
    for (index, (name, value)) in prepared.bindings().enumerate() {
        let position = index + 1;
        let bound = resolve(name, value, options)?;
        log::trace!(
            "Binding '{}' at position {} as {:?}",
            name,
            position,
            bound.sql_type()
        );
        DB::push(&mut args, bound).map_err(|source| crate::Error::Bind {
            position,
            name: name.to_owned(),
            sql: prepared.sql().to_owned(),
            source,
        })?;
    }
    Ok(args)
}
