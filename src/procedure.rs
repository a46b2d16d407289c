use crate::bind::{arguments, BindOptions};
use crate::template::Prepared;
use crate::value::{OutParams, Params, SqlType, Value};
use sqlx::mysql::{MySqlConnection, MySqlRow};

/// Rejects routine names that are empty or contain whitespace.
pub(crate) fn validate_routine_name(name: &str) -> crate::Result<()> {
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        return Err(crate::Error::InvalidProcedureName(name.to_owned()));
    }
    Ok(())
}

/// Rejects IN values that can't be bound positionally.
fn validate_in_params(params: &Params) -> crate::Result<()> {
    for (name, value) in params.iter() {
        match value {
            Value::Null(None) => return Err(crate::Error::NullParameter(name.to_owned())),
            Value::List(_) => {
                return Err(crate::Error::UnsupportedParameterType {
                    name: name.to_owned(),
                    kind: value.kind(),
                })
            }
            _ => {}
        }
    }
    Ok(())
}

fn validate_out_params(outs: &OutParams) -> crate::Result<()> {
    match outs
        .keys()
        .find(|name| name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'))
    {
        Some(name) => Err(crate::Error::InvalidIdentifier(name.clone())),
        None => Ok(()),
    }
}

/// Call text with its IN values and OUT declarations, IN first.
#[derive(Debug, Clone, PartialEq)]
pub struct CallTemplate {
    sql: String,
    ins: Params,
    outs: OutParams,
}

impl CallTemplate {
    /// Escape-syntax call text, `{CALL name(?,?)}`.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn in_params(&self) -> &Params {
        &self.ins
    }

    pub fn out_params(&self) -> &OutParams {
        &self.outs
    }

    /// Number of `?` markers: IN parameters followed by OUT parameters.
    pub fn arity(&self) -> usize {
        self.ins.len() + self.outs.len()
    }
}

/// Builds `{CALL name(?,...)}` with one marker per IN parameter, then one per
/// OUT parameter, each group in insertion order.
///
/// ```
/// use sqlx_named_params::{build_call, OutParams, Params, SqlType};
///
/// let mut outs = OutParams::new();
/// outs.insert("b".to_owned(), SqlType::Text);
/// let call = build_call("sp_get", &Params::new().with("a", 1), &outs)?;
/// assert_eq!(call.sql(), "{CALL sp_get(?,?)}");
/// # Ok::<(), sqlx_named_params::Error>(())
/// ```
///
/// # Errors
///
/// - [`Error::InvalidProcedureName`](crate::Error::InvalidProcedureName) for
///   an empty name or one containing whitespace
/// - [`Error::NullParameter`](crate::Error::NullParameter) for an untyped NULL
///   IN value
/// - [`Error::InvalidIdentifier`](crate::Error::InvalidIdentifier) for an OUT
///   name that is not a plain word
pub fn build_call(name: &str, ins: &Params, outs: &OutParams) -> crate::Result<CallTemplate> {
    validate_routine_name(name)?;
    validate_in_params(ins)?;
    validate_out_params(outs)?;

    let markers = vec!["?"; ins.len() + outs.len()].join(",");
    Ok(CallTemplate {
        sql: format!("{{CALL {name}({markers})}}"),
        ins: ins.clone(),
        outs: outs.clone(),
    })
}

fn cast_target(sql_type: SqlType) -> &'static str {
    match sql_type {
        SqlType::Integer | SqlType::Boolean => "SIGNED",
        SqlType::Text => "CHAR",
        SqlType::Float => "FLOAT",
        SqlType::Double => "DOUBLE",
        SqlType::Binary => "BINARY",
        SqlType::Date => "DATE",
        SqlType::Time => "TIME",
        SqlType::Timestamp => "DATETIME",
    }
}

/// A stored-procedure invocation on MySQL.
///
/// IN values are bound positionally. OUT parameters are passed as session
/// variables (`@out_<name>`) and read back with a single `SELECT` on the same
/// connection, so the connection handed to [`call`](Self::call) must not be
/// shared with other statements in between. OUT values declared as
/// [`SqlType::Boolean`] come back as integers.
///
/// ```rust,no_run
/// use sqlx::{MySqlPool, Row};
/// use sqlx_named_params::{OutParams, Params, Procedure, SqlType};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// # let pool = MySqlPool::connect("mysql://localhost/test").await?;
/// let mut outs = OutParams::new();
/// outs.insert("total".to_owned(), SqlType::Integer);
///
/// let mut conn = pool.acquire().await?;
/// let row = Procedure::new("count_orders", Params::new().with("user_id", 42), outs)?
///     .call(&mut conn)
///     .await?;
/// if let Some(row) = row {
///     let total: i64 = row.try_get("total")?;
///     println!("{total} orders");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Procedure {
    name: String,
    call: CallTemplate,
    options: BindOptions,
}

impl Procedure {
    pub fn new<N: Into<String>>(name: N, ins: Params, outs: OutParams) -> crate::Result<Self> {
        let name = name.into();
        let call = build_call(&name, &ins, &outs)?;
        Ok(Self {
            name,
            call,
            options: BindOptions::default(),
        })
    }

    pub fn bind_options(mut self, options: BindOptions) -> Self {
        self.options = options;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn template(&self) -> &CallTemplate {
        &self.call
    }

    /// `CALL name(?, ..., @out_b, ...)` as sent to MySQL.
    pub fn call_sql(&self) -> String {
        let slots: Vec<String> = self
            .call
            .ins
            .names()
            .map(|_| "?".to_owned())
            .chain(self.call.outs.keys().map(|name| format!("@out_{name}")))
            .collect();
        format!("CALL {}({})", self.name, slots.join(", "))
    }

    /// The `SELECT` reading OUT values back, `None` without OUT parameters.
    pub fn out_sql(&self) -> Option<String> {
        if self.call.outs.is_empty() {
            return None;
        }
        let columns: Vec<String> = self
            .call
            .outs
            .iter()
            .map(|(name, sql_type)| {
                format!("CAST(@out_{name} AS {}) AS {name}", cast_target(*sql_type))
            })
            .collect();
        Some(format!("SELECT {}", columns.join(", ")))
    }

    fn prepared(&self) -> Prepared {
        let (order, values) = self
            .call
            .ins
            .iter()
            .map(|(name, value)| (name.to_owned(), value.clone()))
            .unzip();
        Prepared::from_parts(self.call_sql(), order, values)
    }

    /// Runs the procedure and returns the row of OUT values, or `None` when the
    /// procedure declares no OUT parameters.
    ///
    /// # Errors
    ///
    /// [`Error::Bind`](crate::Error::Bind) or
    /// [`Error::Execution`](crate::Error::Execution), the latter carrying the
    /// failing statement.
    pub async fn call(self, conn: &mut MySqlConnection) -> crate::Result<Option<MySqlRow>> {
        let prepared = self.prepared();
        let args = arguments::<sqlx::MySql>(&prepared, &self.options)?;
        log::debug!("Calling `{}`", prepared.sql());
        sqlx::query_with(prepared.sql(), args)
            .execute(&mut *conn)
            .await
            .map_err(|e| crate::Error::execution(prepared.sql(), e))?;

        match self.out_sql() {
            Some(select) => {
                log::debug!("Reading OUT parameters with `{}`", select);
                sqlx::query(&select)
                    .fetch_optional(&mut *conn)
                    .await
                    .map_err(|e| crate::Error::execution(select.as_str(), e))
            }
            None => Ok(None),
        }
    }

    /// Runs the procedure and returns the rows of its result set.
    ///
    /// OUT values stay in their session variables and can be read afterwards
    /// with [`out_sql`](Self::out_sql) on the same connection.
    pub async fn fetch_all(self, conn: &mut MySqlConnection) -> crate::Result<Vec<MySqlRow>> {
        let prepared = self.prepared();
        let args = arguments::<sqlx::MySql>(&prepared, &self.options)?;
        log::debug!("Calling `{}`", prepared.sql());
        sqlx::query_with(prepared.sql(), args)
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| crate::Error::execution(prepared.sql(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn outs(pairs: &[(&str, SqlType)]) -> OutParams {
        pairs.iter().map(|(n, t)| (n.to_string(), *t)).collect()
    }

    #[test]
    fn test_build_call_in_before_out() {
        let call = build_call(
            "sp_get",
            &Params::new().with("a", 1),
            &outs(&[("b", SqlType::Text)]),
        )
        .unwrap();
        assert_eq!(call.sql(), "{CALL sp_get(?,?)}");
        assert_eq!(call.arity(), 2);
        assert_eq!(call.in_params().names().collect::<Vec<_>>(), ["a"]);
        assert_eq!(call.out_params().keys().collect::<Vec<_>>(), ["b"]);
    }

    #[test]
    fn test_build_call_without_params() {
        let call = build_call("cleanup", &Params::new(), &OutParams::new()).unwrap();
        assert_eq!(call.sql(), "{CALL cleanup()}");
    }

    #[test]
    fn test_build_call_keeps_insertion_order() {
        let ins = Params::new().with("z", 1).with("a", 2).with("m", 3);
        let call = build_call("p", &ins, &outs(&[("y", SqlType::Integer), ("b", SqlType::Date)]))
            .unwrap();
        assert_eq!(call.in_params().names().collect::<Vec<_>>(), ["z", "a", "m"]);
        assert_eq!(call.out_params().keys().collect::<Vec<_>>(), ["y", "b"]);
        assert_eq!(call.sql(), "{CALL p(?,?,?,?,?)}");
    }

    #[test]
    fn test_invalid_procedure_names() {
        for name in ["", "  ", "sp get", "sp\tget"] {
            let err = build_call(name, &Params::new(), &OutParams::new()).unwrap_err();
            assert!(matches!(err, Error::InvalidProcedureName(_)), "{name:?}");
        }
    }

    #[test]
    fn test_untyped_null_in_param() {
        let err = build_call("p", &Params::new().with("a", Value::null()), &OutParams::new())
            .unwrap_err();
        assert!(matches!(err, Error::NullParameter(name) if name == "a"));
    }

    #[test]
    fn test_typed_null_in_param() {
        let ins = Params::new().with("a", Value::typed_null(SqlType::Integer));
        assert!(build_call("p", &ins, &OutParams::new()).is_ok());
    }

    #[test]
    fn test_invalid_out_name() {
        let err = build_call("p", &Params::new(), &outs(&[("b c", SqlType::Text)])).unwrap_err();
        assert!(matches!(err, Error::InvalidIdentifier(_)));
    }

    #[test]
    fn test_mysql_statements() {
        let procedure = Procedure::new(
            "sp_get",
            Params::new().with("a", 1).with("c", "x"),
            outs(&[("b", SqlType::Text), ("n", SqlType::Integer)]),
        )
        .unwrap();
        assert_eq!(procedure.call_sql(), "CALL sp_get(?, ?, @out_b, @out_n)");
        assert_eq!(
            procedure.out_sql().unwrap(),
            "SELECT CAST(@out_b AS CHAR) AS b, CAST(@out_n AS SIGNED) AS n"
        );
        assert_eq!(procedure.prepared().order(), ["a", "c"]);
    }

    #[test]
    fn test_no_out_select_without_outs() {
        let procedure = Procedure::new("p", Params::new().with("a", 1), OutParams::new()).unwrap();
        assert_eq!(procedure.call_sql(), "CALL p(?)");
        assert_eq!(procedure.out_sql(), None);
    }
}
