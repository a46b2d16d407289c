use crate::backend::Backend;
use crate::bind::{arguments, BindOptions};
use crate::procedure::validate_routine_name;
use crate::template::Prepared;
use crate::value::Value;
use sqlx::{Executor, FromRow};

/// A scalar SQL function evaluated with `SELECT name(?, ...) AS value`.
///
/// Arguments are positional.
///
/// ```rust,no_run
/// use sqlx::SqlitePool;
/// use sqlx_named_params::Function;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// # let pool = SqlitePool::connect("sqlite::memory:").await?;
/// let upper: Option<String> = Function::new("upper", ["hello"])?.fetch(&pool).await?;
/// assert_eq!(upper.as_deref(), Some("HELLO"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Function {
    prepared: Prepared,
    options: BindOptions,
}

impl Function {
    /// # Errors
    ///
    /// [`Error::InvalidProcedureName`](crate::Error::InvalidProcedureName) for
    /// an empty name or one containing whitespace, and
    /// [`Error::NullParameter`](crate::Error::NullParameter) for an untyped
    /// NULL argument (named `arg1`, `arg2`, ... by position).
    pub fn new<N, I, V>(name: N, args: I) -> crate::Result<Self>
    where
        N: AsRef<str>,
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let name = name.as_ref();
        validate_routine_name(name)?;

        let values: Vec<Value> = args.into_iter().map(Into::into).collect();
        let order: Vec<String> = (1..=values.len()).map(|i| format!("arg{i}")).collect();
        if let Some((arg, _)) = order
            .iter()
            .zip(values.iter())
            .find(|(_, v)| matches!(v, Value::Null(None)))
        {
            return Err(crate::Error::NullParameter(arg.clone()));
        }

        let markers = vec!["?"; values.len()].join(", ");
        let sql = format!("SELECT {name}({markers}) AS value");
        Ok(Self {
            prepared: Prepared::from_parts(sql, order, values),
            options: BindOptions::default(),
        })
    }

    pub fn bind_options(mut self, options: BindOptions) -> Self {
        self.options = options;
        self
    }

    pub fn sql(&self) -> &str {
        self.prepared.sql()
    }

    /// Evaluates the function.
    ///
    /// Returns `None` when the query yields no row or the function returns
    /// NULL.
    pub async fn fetch<'e, T, DB, E>(self, executor: E) -> crate::Result<Option<T>>
    where
        DB: Backend,
        E: Executor<'e, Database = DB>,
        T: Send + Unpin,
        (Option<T>,): for<'r> FromRow<'r, DB::Row>,
    {
        let args = arguments::<DB>(&self.prepared, &self.options)?;
        log::debug!("Evaluating `{}`", self.prepared.sql());
        let value = sqlx::query_scalar_with::<DB, Option<T>, _>(self.prepared.sql(), args)
            .fetch_optional(executor)
            .await
            .map_err(|e| crate::Error::execution(self.prepared.sql(), e))?;
        Ok(value.flatten())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::SqlType;
    use crate::Error;

    #[test]
    fn test_function_sql() {
        let function = Function::new("add_tax", [Value::from(100), Value::from(0.2)]).unwrap();
        assert_eq!(function.sql(), "SELECT add_tax(?, ?) AS value");
    }

    #[test]
    fn test_function_without_args() {
        let function = Function::new("now", Vec::<Value>::new()).unwrap();
        assert_eq!(function.sql(), "SELECT now() AS value");
    }

    #[test]
    fn test_function_name_validated() {
        let err = Function::new("bad name", [1]).unwrap_err();
        assert!(matches!(err, Error::InvalidProcedureName(_)));
    }

    #[test]
    fn test_function_untyped_null_arg() {
        let err = Function::new("coalesce", [Value::from(1), Value::null()]).unwrap_err();
        assert!(matches!(err, Error::NullParameter(name) if name == "arg2"));
    }

    #[test]
    fn test_function_typed_null_arg() {
        let function = Function::new("coalesce", [Value::typed_null(SqlType::Integer), Value::from(3)]);
        assert!(function.is_ok());
    }
}
