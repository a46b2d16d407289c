//! # sqlx-named-params
//!
//! Named parameters for SQLx: `:name` templates bound from an ordered value map,
//! IN-list expansion, stored-procedure calls with OUT parameters, and small
//! INSERT/UPDATE builders with generated-key retrieval.
//!
//! ## Features
//!
//! - **Named Placeholders**: Use `:param_name` instead of `?` in your SQL queries
//! - **Ordered Parameters**: [`Params`] keeps insertion order, so positional
//!   binding is deterministic
//! - **Closed Value Set**: every [`Value`] kind has exactly one driver encoding;
//!   anything else is an [`Error::UnsupportedParameterType`]
//! - **IN-lists**: a list value expands `IN :ids` into `IN (?,?,?)`
//! - **Generic Executor Support**: Works with pools, connections, transactions
//!   and any SQLx `Executor`, on MySQL and SQLite
//! - **Type-Safe Results**: [`PreparedQueryAs`] maps rows via `FromRow`,
//!   [`PreparedQuery::fetch_map`] via a closure
//!
//! ## Quick Start
//!
//! Add to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! sqlx = { version = "0.8", features = ["mysql", "runtime-tokio"] }
//! sqlx-named-params = "0.1"
//! ```
//!
//! ## Examples
//!
//! ### Basic Query Execution
//!
//! ```rust,no_run
//! use sqlx::MySqlPool;
//! use sqlx_named_params::{Params, PreparedQuery};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = MySqlPool::connect("mysql://localhost/test").await?;
//!
//! let inserted = PreparedQuery::new(
//!     "INSERT INTO users (id, name) VALUES (:id, :name)",
//!     Params::new().with("id", 42).with("name", "John Doe"),
//! )?
//! .execute(&pool)
//! .await?;
//! println!("Inserted {} rows", inserted);
//! # Ok(())
//! # }
//! ```
//!
//! ### Typed Query Results with an IN-list
//!
//! ```rust,no_run
//! use sqlx::{MySqlPool, FromRow};
//! use sqlx_named_params::{Params, PreparedQueryAs};
//!
//! #[derive(FromRow)]
//! struct User {
//!     id: i32,
//!     name: String,
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! # let pool = MySqlPool::connect("mysql://localhost/test").await?;
//! let users: Vec<User> = PreparedQueryAs::new(
//!     "SELECT id, name FROM users WHERE age >= :min_age AND id IN :ids",
//!     Params::new().with("min_age", 18).with("ids", vec![1, 2, 3]),
//! )?
//! .fetch_all(&pool)
//! .await?;
//! for user in users {
//!     println!("{}: {}", user.id, user.name);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Generated Keys
//!
//! ```rust,no_run
//! use sqlx::MySqlPool;
//! use sqlx_named_params::{GeneratedKeys, Insert, Params, Update};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! # let pool = MySqlPool::connect("mysql://localhost/test").await?;
//! let id = Insert::new("users", Params::new().with("name", "Jane"))?
//!     .generated_keys(GeneratedKeys::Return)
//!     .execute(&pool)
//!     .await?;
//!
//! Update::new(
//!     "users",
//!     Params::new().with("name", "Jane Doe"),
//!     Params::new().with("id", i64::try_from(id)?),
//! )?
//! .execute(&pool)
//! .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## How It Works
//!
//! 1. **Expand**: list values are turned into numbered placeholders (`:ids0,:ids1`)
//! 2. **Parse**: named placeholders are collected in occurrence order and replaced by `?`
//! 3. **Bind**: each value is resolved to one driver encoding and pushed onto the
//!    backend's argument buffer, in the collected order
//! 4. **Execute**: SQLx runs the statement on the executor you pass; a pool
//!    connection is returned to the pool when the statement finishes
//!
//! Steps 1 and 2 run when the statement is constructed, so missing or untyped
//! NULL parameters are reported before any database round trip.
//!
//! ## Limitations
//!
//! - Stored procedures are supported on MySQL only
//! - Placeholder names must match `[a-zA-Z0-9_]+`
//! - A `:name` inside a string literal is still treated as a placeholder
//!
//! ## License
//!
//! Licensed under either of Apache License, Version 2.0 or MIT license at your option.

pub mod backend;
pub mod bind;
pub mod config;
pub mod connector;
pub mod error;
pub mod function;
pub mod in_list;
pub mod insert;
pub mod procedure;
pub mod query;
pub mod query_as;
pub mod template;
pub mod update;
pub mod value;

pub use backend::Backend;
pub use bind::{resolve, BindOptions, Bound};
pub use config::ConnectionConfig;
pub use connector::Connector;
pub use error::{Error, Result};
pub use function::Function;
pub use in_list::InList;
pub use insert::Insert;
pub use procedure::{build_call, CallTemplate, Procedure};
pub use query::{GeneratedKeys, PreparedQuery};
pub use query_as::PreparedQueryAs;
pub use template::{prepare, Prepared};
pub use update::Update;
pub use value::{OutParams, Params, SqlType, Value};

/// Convenience re-exports for common use cases
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::{GeneratedKeys, Insert, Params, PreparedQuery, PreparedQueryAs, Update, Value};
}
