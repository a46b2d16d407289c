use crate::backend::Backend;
use crate::bind::{arguments, BindOptions};
use crate::template::{prepare, Prepared};
use crate::value::Params;
use sqlx::Executor;

/// Whether executing an INSERT reports the generated key instead of the
/// affected-row count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GeneratedKeys {
    Return,
    #[default]
    NoReturn,
}

/// A statement built from a template with named placeholders.
///
/// `PreparedQuery` resolves the template once, at construction, into
/// positional SQL and an ordered list of bindings, so missing or untyped NULL
/// parameters are reported before any connection is touched. Executing
/// consumes it.
///
/// # Examples
///
/// ```rust,no_run
/// use sqlx::MySqlPool;
/// use sqlx_named_params::{Params, PreparedQuery};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// # let pool = MySqlPool::connect("mysql://localhost/test").await?;
/// let query = PreparedQuery::new(
///     "INSERT INTO users (user_id, name) VALUES (:user_id, :name)",
///     Params::new().with("user_id", 42).with("name", "John Doe"),
/// )?;
///
/// let inserted = query.execute(&pool).await?;
/// println!("Inserted {} rows", inserted);
/// # Ok(())
/// # }
/// ```
///
/// # Using with Transactions
///
/// ```rust,no_run
/// use sqlx::{MySqlPool, Transaction, MySql};
/// use sqlx_named_params::{Params, PreparedQuery};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// # let pool = MySqlPool::connect("mysql://localhost/test").await?;
/// let mut tx: Transaction<MySql> = pool.begin().await?;
///
/// PreparedQuery::new(
///     "UPDATE users SET name = :name WHERE user_id IN :user_ids",
///     Params::new().with("user_ids", vec![1, 2, 3]).with("name", "Jane Doe"),
/// )?
/// .execute(&mut *tx)
/// .await?;
///
/// tx.commit().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PreparedQuery {
    prepared: Prepared,
    keys: GeneratedKeys,
    options: BindOptions,
}

impl PreparedQuery {
    /// Creates a new `PreparedQuery` from an SQL template and its parameters.
    ///
    /// # Errors
    ///
    /// Any error of [`prepare`]: missing parameters, untyped NULLs, empty
    /// IN-lists.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sqlx_named_params::{Params, PreparedQuery};
    ///
    /// let query = PreparedQuery::new(
    ///     "SELECT * FROM users WHERE id = :id",
    ///     Params::new().with("id", 42),
    /// )?;
    /// assert_eq!(query.sql(), "SELECT * FROM users WHERE id = ?");
    /// # Ok::<(), sqlx_named_params::Error>(())
    /// ```
    pub fn new<T>(template: T, params: Params) -> crate::Result<Self>
    where
        T: AsRef<str>,
    {
        Self::with_generated_keys(template, params, GeneratedKeys::NoReturn)
    }

    /// Like [`new`](Self::new), choosing whether [`execute`](Self::execute)
    /// reports the generated key.
    pub fn with_generated_keys<T>(
        template: T,
        params: Params,
        keys: GeneratedKeys,
    ) -> crate::Result<Self>
    where
        T: AsRef<str>,
    {
        let prepared = prepare(template.as_ref(), &params)?;
        Ok(Self {
            prepared,
            keys,
            options: BindOptions::default(),
        })
    }

    /// Replaces the bind options (timezone offset for date/time values).
    pub fn bind_options(mut self, options: BindOptions) -> Self {
        self.options = options;
        self
    }

    /// Positional SQL sent to the driver.
    pub fn sql(&self) -> &str {
        self.prepared.sql()
    }

    /// Placeholder names in binding order.
    pub fn order(&self) -> &[String] {
        self.prepared.order()
    }

    pub fn generated_keys(&self) -> GeneratedKeys {
        self.keys
    }

    /// Executes the statement.
    ///
    /// Returns the affected-row count, or the generated key when the query
    /// was built with [`GeneratedKeys::Return`].
    ///
    /// # Errors
    ///
    /// - [`Error::Bind`](crate::Error::Bind) if the driver rejects a value
    /// - [`Error::Execution`](crate::Error::Execution) if the statement fails
    /// - [`Error::KeyRetrieval`](crate::Error::KeyRetrieval) if a generated key
    ///   was requested and the statement affected no row or reported no key
    pub async fn execute<'e, DB, E>(self, executor: E) -> crate::Result<u64>
    where
        DB: Backend,
        E: Executor<'e, Database = DB>,
    {
        let PreparedQuery {
            prepared,
            keys,
            options,
        } = self;

        let args = arguments::<DB>(&prepared, &options)?;
        log::debug!("Executing `{}`", prepared.sql());
        let result = sqlx::query_with::<DB, _>(prepared.sql(), args)
            .execute(executor)
            .await
            .map_err(|e| crate::Error::execution(prepared.sql(), e))?;

        match keys {
            GeneratedKeys::NoReturn => Ok(DB::rows_affected(&result)),
            GeneratedKeys::Return => {
                // The driver's last key is per connection; without an inserted
                // row it belongs to an earlier statement.
                let key = match DB::rows_affected(&result) {
                    0 => None,
                    _ => DB::generated_key(&result),
                };
                key.ok_or_else(|| {
                    log::warn!("No generated key reported for `{}`", prepared.sql());
                    crate::Error::KeyRetrieval {
                        sql: prepared.sql().to_owned(),
                    }
                })
            }
        }
    }

    /// Executes the statement and returns the raw rows.
    pub async fn fetch_rows<'e, DB, E>(self, executor: E) -> crate::Result<Vec<DB::Row>>
    where
        DB: Backend,
        E: Executor<'e, Database = DB>,
    {
        let args = arguments::<DB>(&self.prepared, &self.options)?;
        log::debug!("Fetching `{}`", self.prepared.sql());
        sqlx::query_with::<DB, _>(self.prepared.sql(), args)
            .fetch_all(executor)
            .await
            .map_err(|e| crate::Error::execution(self.prepared.sql(), e))
    }

    /// Executes the statement and maps every row with `mapper`.
    ///
    /// ```rust,no_run
    /// use sqlx::{MySqlPool, Row};
    /// use sqlx_named_params::{Params, PreparedQuery};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// # let pool = MySqlPool::connect("mysql://localhost/test").await?;
    /// let names: Vec<String> = PreparedQuery::new(
    ///     "SELECT name FROM users WHERE age >= :age",
    ///     Params::new().with("age", 18),
    /// )?
    /// .fetch_map(&pool, |row| row.try_get("name"))
    /// .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn fetch_map<'e, DB, E, T, F>(self, executor: E, mut mapper: F) -> crate::Result<Vec<T>>
    where
        DB: Backend,
        E: Executor<'e, Database = DB>,
        F: FnMut(&DB::Row) -> Result<T, sqlx::Error>,
    {
        let sql = self.prepared.sql().to_owned();
        let rows = self.fetch_rows(executor).await?;
        rows.iter()
            .map(|row| mapper(row).map_err(|e| crate::Error::execution(sql.as_str(), e)))
            .collect()
    }
}
