use crate::backend::Backend;
use crate::bind::BindOptions;
use crate::insert::{non_null_fields, validate_column, validate_table};
use crate::query::PreparedQuery;
use crate::value::{Params, Value};
use sqlx::Executor;

/// `UPDATE t SET f1=:f1, f2=:f2 WHERE k=:k AND j=:j` built from a field map
/// and a filter map.
///
/// NULL fields and NULL filters are left out. A list-valued filter becomes
/// `k IN (...)`. A filter on a column that is also being set binds through a
/// `<column>_where` placeholder, so both values survive.
///
/// ```
/// use sqlx_named_params::{Params, Update};
///
/// let update = Update::new(
///     "users",
///     Params::new().with("status", "archived"),
///     Params::new().with("status", "inactive").with("id", vec![1, 2]),
/// )?;
/// assert_eq!(
///     update.template(),
///     "UPDATE users SET status=:status WHERE status=:status_where AND id IN :id"
/// );
/// # Ok::<(), sqlx_named_params::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Update {
    table: String,
    fields: Params,
    filters: Params,
    options: BindOptions,
}

impl Update {
    /// # Errors
    ///
    /// - [`Error::InvalidIdentifier`](crate::Error::InvalidIdentifier) for a
    ///   blank table or a column name that is not a plain word
    /// - [`Error::EmptyClause`](crate::Error::EmptyClause) when no field or no
    ///   filter remains after dropping NULLs
    /// - [`Error::InvalidInList`](crate::Error::InvalidInList) for a list
    ///   filter with no non-null values
    /// - [`Error::DuplicateParameter`](crate::Error::DuplicateParameter) when a
    ///   filter on a set column would bind through `<column>_where` and a field
    ///   already has that name
    pub fn new<T: Into<String>>(table: T, fields: Params, filters: Params) -> crate::Result<Self> {
        let table = table.into();
        validate_table(&table)?;

        let fields = non_null_fields(fields)?;
        if fields.is_empty() {
            return Err(crate::Error::EmptyClause { table, clause: "SET" });
        }

        let mut kept = Params::new();
        for (name, value) in filters.iter() {
            validate_column(name)?;
            if !value.is_null() {
                kept.insert(name, value.clone());
            }
        }
        if kept.is_empty() {
            return Err(crate::Error::EmptyClause {
                table,
                clause: "WHERE",
            });
        }
        if let Some(column) = kept.names().find(|column| {
            fields.contains(column) && fields.contains(&format!("{column}_where"))
        }) {
            return Err(crate::Error::DuplicateParameter(format!("{column}_where")));
        }

        Ok(Self {
            table,
            fields,
            filters: kept,
            options: BindOptions::default(),
        })
    }

    pub fn bind_options(mut self, options: BindOptions) -> Self {
        self.options = options;
        self
    }

    fn filter_placeholder(&self, column: &str) -> String {
        if self.fields.contains(column) {
            format!("{column}_where")
        } else {
            column.to_owned()
        }
    }

    /// The named-placeholder statement.
    pub fn template(&self) -> String {
        let set: Vec<String> = self.fields.names().map(|f| format!("{f}=:{f}")).collect();
        let conditions: Vec<String> = self
            .filters
            .iter()
            .map(|(column, value)| {
                let placeholder = self.filter_placeholder(column);
                match value {
                    Value::List(_) => format!("{column} IN :{placeholder}"),
                    _ => format!("{column}=:{placeholder}"),
                }
            })
            .collect();
        format!(
            "UPDATE {} SET {} WHERE {}",
            self.table,
            set.join(", "),
            conditions.join(" AND ")
        )
    }

    /// Field values followed by filter values under their placeholder names.
    pub fn params(&self) -> Params {
        let mut params = self.fields.clone();
        for (column, value) in self.filters.iter() {
            params.insert(self.filter_placeholder(column), value.clone());
        }
        params
    }

    pub fn into_query(self) -> crate::Result<PreparedQuery> {
        Ok(PreparedQuery::new(self.template(), self.params())?.bind_options(self.options))
    }

    /// Executes the UPDATE and returns the affected-row count.
    pub async fn execute<'e, DB, E>(self, executor: E) -> crate::Result<u64>
    where
        DB: Backend,
        E: Executor<'e, Database = DB>,
    {
        self.into_query()?.execute(executor).await
    }
}
