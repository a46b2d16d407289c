use crate::backend::Backend;
use crate::bind::BindOptions;
use crate::query::{GeneratedKeys, PreparedQuery};
use crate::value::{Params, Value};
use sqlx::Executor;

/// Table names may be qualified (`schema.table`) but not blank or spaced.
pub(crate) fn validate_table(table: &str) -> crate::Result<()> {
    if table.is_empty() || table.chars().any(char::is_whitespace) {
        return Err(crate::Error::InvalidIdentifier(table.to_owned()));
    }
    Ok(())
}

/// Column names double as placeholder names and must be plain words.
pub(crate) fn validate_column(column: &str) -> crate::Result<()> {
    if column.is_empty() || !column.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(crate::Error::InvalidIdentifier(column.to_owned()));
    }
    Ok(())
}

/// Drops NULL entries and rejects list values.
pub(crate) fn non_null_fields(fields: Params) -> crate::Result<Params> {
    let mut kept = Params::new();
    for (name, value) in fields.iter() {
        validate_column(name)?;
        match value {
            Value::Null(_) => {}
            Value::List(_) => {
                return Err(crate::Error::UnsupportedParameterType {
                    name: name.to_owned(),
                    kind: value.kind(),
                })
            }
            other => {
                kept.insert(name, other.clone());
            }
        }
    }
    Ok(kept)
}

/// `INSERT INTO t(f1,f2) VALUES(:f1,:f2)` built from a field map.
///
/// NULL fields are left out of the statement, so the column default applies.
///
/// ```rust,no_run
/// use sqlx::MySqlPool;
/// use sqlx_named_params::{GeneratedKeys, Insert, Params};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// # let pool = MySqlPool::connect("mysql://localhost/test").await?;
/// let id = Insert::new("users", Params::new().with("name", "Jane").with("age", 31))?
///     .generated_keys(GeneratedKeys::Return)
///     .execute(&pool)
///     .await?;
/// println!("New user {id}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Insert {
    table: String,
    fields: Params,
    keys: GeneratedKeys,
    options: BindOptions,
}

impl Insert {
    /// # Errors
    ///
    /// - [`Error::InvalidIdentifier`](crate::Error::InvalidIdentifier) for a
    ///   blank table or a field name that is not a plain word
    /// - [`Error::UnsupportedParameterType`](crate::Error::UnsupportedParameterType)
    ///   for a list value
    /// - [`Error::EmptyClause`](crate::Error::EmptyClause) when every field is NULL
    pub fn new<T: Into<String>>(table: T, fields: Params) -> crate::Result<Self> {
        let table = table.into();
        validate_table(&table)?;
        let fields = non_null_fields(fields)?;
        if fields.is_empty() {
            return Err(crate::Error::EmptyClause {
                table,
                clause: "VALUES",
            });
        }
        Ok(Self {
            table,
            fields,
            keys: GeneratedKeys::NoReturn,
            options: BindOptions::default(),
        })
    }

    /// With [`GeneratedKeys::Return`], [`execute`](Self::execute) returns the
    /// generated key instead of the affected-row count.
    pub fn generated_keys(mut self, keys: GeneratedKeys) -> Self {
        self.keys = keys;
        self
    }

    pub fn bind_options(mut self, options: BindOptions) -> Self {
        self.options = options;
        self
    }

    /// The named-placeholder statement.
    pub fn template(&self) -> String {
        let columns: Vec<&str> = self.fields.names().collect();
        let placeholders: Vec<String> = columns.iter().map(|c| format!(":{c}")).collect();
        format!(
            "INSERT INTO {}({}) VALUES({})",
            self.table,
            columns.join(","),
            placeholders.join(",")
        )
    }

    pub fn into_query(self) -> crate::Result<PreparedQuery> {
        let template = self.template();
        Ok(PreparedQuery::with_generated_keys(template, self.fields, self.keys)?
            .bind_options(self.options))
    }

    /// Executes the INSERT.
    ///
    /// # Errors
    ///
    /// [`Error::KeyRetrieval`](crate::Error::KeyRetrieval) when a generated key
    /// was requested and the driver reported none.
    pub async fn execute<'e, DB, E>(self, executor: E) -> crate::Result<u64>
    where
        DB: Backend,
        E: Executor<'e, Database = DB>,
    {
        self.into_query()?.execute(executor).await
    }
}
