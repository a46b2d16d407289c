use crate::bind::Bound;
use crate::config::ConnectionConfig;
use crate::value::SqlType;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::error::BoxDynError;
use sqlx::mysql::{MySqlArguments, MySqlConnectOptions, MySqlQueryResult};
use sqlx::sqlite::{SqliteArguments, SqliteConnectOptions, SqliteQueryResult};
use sqlx::{Arguments, Connection, Database, IntoArguments, MySql, Sqlite};
use std::str::FromStr;

/// The per-database half of binding and execution.
///
/// Implemented for [`MySql`] and [`Sqlite`]. Everything database-agnostic
/// (placeholder parsing, type dispatch, error wrapping) lives outside this
/// trait; implementations only encode already-resolved values and read the
/// driver's result metadata.
pub trait Backend: Database {
    /// Positional argument buffer of this database.
    type Args<'q>: IntoArguments<'q, Self> + Default + Send;

    /// Appends one value to the argument buffer.
    fn push<'q>(args: &mut Self::Args<'q>, value: Bound) -> Result<(), BoxDynError>;

    fn rows_affected(result: &Self::QueryResult) -> u64;

    /// Key generated by the last INSERT, if the driver reported one.
    fn generated_key(result: &Self::QueryResult) -> Option<u64>;

    /// Connect options for `config`. The URL has already been validated.
    fn connect_options(
        config: &ConnectionConfig,
    ) -> crate::Result<<Self::Connection as Connection>::Options>;
}

macro_rules! push_bound {
    ($args:ident, $value:ident) => {
        match $value {
            Bound::Int(v) => $args.add(v),
            Bound::Text(v) => $args.add(v),
            Bound::Bool(v) => $args.add(v),
            Bound::Float(v) => $args.add(v),
            Bound::Double(v) => $args.add(v),
            Bound::Blob(v) => $args.add(v),
            Bound::Date(v) => $args.add(v),
            Bound::Time(v) => $args.add(v),
            Bound::Timestamp(v) => $args.add(v),
            Bound::Null(SqlType::Integer) => $args.add(None::<i64>),
            Bound::Null(SqlType::Text) => $args.add(None::<String>),
            Bound::Null(SqlType::Boolean) => $args.add(None::<bool>),
            Bound::Null(SqlType::Float) => $args.add(None::<f32>),
            Bound::Null(SqlType::Double) => $args.add(None::<f64>),
            Bound::Null(SqlType::Binary) => $args.add(None::<Vec<u8>>),
            Bound::Null(SqlType::Date) => $args.add(None::<NaiveDate>),
            Bound::Null(SqlType::Time) => $args.add(None::<NaiveTime>),
            Bound::Null(SqlType::Timestamp) => $args.add(None::<NaiveDateTime>),
        }
    };
}

fn invalid_url(config: &ConnectionConfig, err: sqlx::Error) -> crate::Error {
    crate::Error::Configuration(format!("invalid url '{}': {}", config.url(), err))
}

impl Backend for MySql {
    type Args<'q> = MySqlArguments;

    fn push<'q>(args: &mut MySqlArguments, value: Bound) -> Result<(), BoxDynError> {
        push_bound!(args, value)
    }

    fn rows_affected(result: &MySqlQueryResult) -> u64 {
        result.rows_affected()
    }

    fn generated_key(result: &MySqlQueryResult) -> Option<u64> {
        Some(result.last_insert_id()).filter(|id| *id > 0)
    }

    fn connect_options(config: &ConnectionConfig) -> crate::Result<MySqlConnectOptions> {
        let mut options =
            MySqlConnectOptions::from_str(config.url()).map_err(|e| invalid_url(config, e))?;
        if let Some(user) = config.user() {
            options = options.username(user);
        }
        if let Some(password) = config.password() {
            options = options.password(password);
        }
        Ok(options)
    }
}

impl Backend for Sqlite {
    type Args<'q> = SqliteArguments<'q>;

    fn push<'q>(args: &mut SqliteArguments<'q>, value: Bound) -> Result<(), BoxDynError> {
        push_bound!(args, value)
    }

    fn rows_affected(result: &SqliteQueryResult) -> u64 {
        result.rows_affected()
    }

    fn generated_key(result: &SqliteQueryResult) -> Option<u64> {
        u64::try_from(result.last_insert_rowid())
            .ok()
            .filter(|id| *id > 0)
    }

    fn connect_options(config: &ConnectionConfig) -> crate::Result<SqliteConnectOptions> {
        SqliteConnectOptions::from_str(config.url()).map_err(|e| invalid_url(config, e))
    }
}
