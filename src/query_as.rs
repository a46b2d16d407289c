use crate::backend::Backend;
use crate::bind::{arguments, BindOptions};
use crate::template::{prepare, Prepared};
use crate::value::Params;
use sqlx::{Executor, FromRow};
use std::marker::PhantomData;

/// A prepared query that returns typed results from named placeholders.
///
/// `PreparedQueryAs` is similar to [`PreparedQuery`](crate::PreparedQuery) but
/// maps rows through SQLx's `FromRow` trait. It supports `fetch_all`,
/// `fetch_one`, and `fetch_optional`.
///
/// # Type Parameters
///
/// * `R` - The result type that implements `FromRow`
///
/// # Examples
///
/// ```rust,no_run
/// use sqlx::{MySqlPool, FromRow};
/// use sqlx_named_params::{Params, PreparedQueryAs};
///
/// #[derive(FromRow)]
/// struct User {
///     id: i32,
///     name: String,
/// }
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// # let pool = MySqlPool::connect("mysql://localhost/test").await?;
/// let query = PreparedQueryAs::<User>::new(
///     "SELECT id, name FROM users WHERE id = :id",
///     Params::new().with("id", 42),
/// )?;
///
/// let user: User = query.fetch_one(&pool).await?;
/// println!("User: {} ({})", user.name, user.id);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PreparedQueryAs<R> {
    prepared: Prepared,
    options: BindOptions,
    _pd: PhantomData<fn() -> R>,
}

impl<R> PreparedQueryAs<R> {
    /// Creates a new `PreparedQueryAs` from an SQL template and its parameters.
    ///
    /// # Errors
    ///
    /// Any error of [`prepare`](crate::prepare).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sqlx::FromRow;
    /// use sqlx_named_params::{Params, PreparedQueryAs};
    ///
    /// #[derive(FromRow)]
    /// struct User {
    ///     id: i32,
    ///     name: String,
    /// }
    ///
    /// let query = PreparedQueryAs::<User>::new(
    ///     "SELECT id, name FROM users WHERE id = :id",
    ///     Params::new().with("id", 42),
    /// )?;
    /// assert_eq!(query.sql(), "SELECT id, name FROM users WHERE id = ?");
    /// # Ok::<(), sqlx_named_params::Error>(())
    /// ```
    pub fn new<T>(template: T, params: Params) -> crate::Result<Self>
    where
        T: AsRef<str>,
    {
        Ok(Self {
            prepared: prepare(template.as_ref(), &params)?,
            options: BindOptions::default(),
            _pd: PhantomData,
        })
    }

    pub fn bind_options(mut self, options: BindOptions) -> Self {
        self.options = options;
        self
    }

    pub fn sql(&self) -> &str {
        self.prepared.sql()
    }

    pub fn order(&self) -> &[String] {
        self.prepared.order()
    }

    /// Executes the query and returns all matching rows.
    ///
    /// # Arguments
    ///
    /// * `executor` - Any SQLx executor (pool, connection, transaction)
    ///
    /// # Errors
    ///
    /// Returns an error if a value can't be bound, the query fails, or any row
    /// cannot be converted to type `R`.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use sqlx::{MySqlPool, FromRow};
    /// use sqlx_named_params::{Params, PreparedQueryAs};
    ///
    /// #[derive(FromRow)]
    /// struct User {
    ///     id: i32,
    ///     name: String,
    /// }
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// # let pool = MySqlPool::connect("mysql://localhost/test").await?;
    /// let users: Vec<User> = PreparedQueryAs::new(
    ///     "SELECT id, name FROM users WHERE age > :min_age",
    ///     Params::new().with("min_age", 18),
    /// )?
    /// .fetch_all(&pool)
    /// .await?;
    /// println!("Found {} users", users.len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn fetch_all<'e, DB, E>(self, executor: E) -> crate::Result<Vec<R>>
    where
        DB: Backend,
        E: Executor<'e, Database = DB>,
        R: for<'r> FromRow<'r, DB::Row> + Send + Unpin,
    {
        let args = arguments::<DB>(&self.prepared, &self.options)?;
        sqlx::query_as_with::<DB, R, _>(self.prepared.sql(), args)
            .fetch_all(executor)
            .await
            .map_err(|e| crate::Error::execution(self.prepared.sql(), e))
    }

    /// Executes the query and returns exactly one row.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No rows are found
    /// - The query fails
    /// - The row cannot be converted to type `R`
    pub async fn fetch_one<'e, DB, E>(self, executor: E) -> crate::Result<R>
    where
        DB: Backend,
        E: Executor<'e, Database = DB>,
        R: for<'r> FromRow<'r, DB::Row> + Send + Unpin,
    {
        let args = arguments::<DB>(&self.prepared, &self.options)?;
        sqlx::query_as_with::<DB, R, _>(self.prepared.sql(), args)
            .fetch_one(executor)
            .await
            .map_err(|e| crate::Error::execution(self.prepared.sql(), e))
    }

    /// Executes the query and returns at most one row.
    ///
    /// Returns `Some(row)` for the first matching row, `None` if no rows match.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use sqlx::{MySqlPool, FromRow};
    /// use sqlx_named_params::{Params, PreparedQueryAs};
    ///
    /// #[derive(FromRow)]
    /// struct User {
    ///     id: i32,
    ///     name: String,
    /// }
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// # let pool = MySqlPool::connect("mysql://localhost/test").await?;
    /// let query = PreparedQueryAs::<User>::new(
    ///     "SELECT id, name FROM users WHERE email = :email",
    ///     Params::new().with("email", "user@example.com"),
    /// )?;
    ///
    /// match query.fetch_optional(&pool).await? {
    ///     Some(user) => println!("Found user: {}", user.name),
    ///     None => println!("User not found"),
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn fetch_optional<'e, DB, E>(self, executor: E) -> crate::Result<Option<R>>
    where
        DB: Backend,
        E: Executor<'e, Database = DB>,
        R: for<'r> FromRow<'r, DB::Row> + Send + Unpin,
    {
        let args = arguments::<DB>(&self.prepared, &self.options)?;
        sqlx::query_as_with::<DB, R, _>(self.prepared.sql(), args)
            .fetch_optional(executor)
            .await
            .map_err(|e| crate::Error::execution(self.prepared.sql(), e))
    }
}
