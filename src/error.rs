/// Error types for sqlx-named-params
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Connection settings are missing or invalid
    #[error("Invalid connection configuration: {0}")]
    Configuration(String),

    /// Error during SQL template parsing
    #[error("Failed to parse SQL template: {0}")]
    Parse(#[from] regex::Error),

    /// The template is empty or only whitespace
    #[error("SQL template can't be empty")]
    EmptyTemplate,

    /// Placeholder was referenced in the template but no value was supplied
    #[error("Parameter '{0}' is undefined")]
    MissingParameter(String),

    /// A value is NULL and carries no declared SQL type
    #[error("Parameter '{0}' can't be null without a declared SQL type")]
    NullParameter(String),

    /// IN-list with no (non-null) values
    #[error("IN-list parameter '{0}' can't be empty or contain only nulls")]
    InvalidInList(String),

    /// An IN-list expansion would generate a name that is already bound
    #[error("Parameter '{0}' is bound twice: it clashes with a generated IN-list name")]
    DuplicateParameter(String),

    /// The value kind has no driver encoding
    #[error("Parameter '{name}' has an unsupported type: {kind}")]
    UnsupportedParameterType { name: String, kind: &'static str },

    /// Procedure or function name is empty or contains whitespace
    #[error("Invalid routine name '{0}': it can't be empty or contain whitespace")]
    InvalidProcedureName(String),

    /// Table or column name is empty or contains whitespace
    #[error("Invalid identifier '{0}'")]
    InvalidIdentifier(String),

    /// A generated statement would have an empty SET/VALUES/WHERE clause
    #[error("Statement on '{table}' has no {clause}")]
    EmptyClause { table: String, clause: &'static str },

    /// The driver rejected a typed bind
    #[error("Error setting parameter '{name}' at position {position} in statement ({sql}): {source}")]
    Bind {
        position: usize,
        name: String,
        sql: String,
        #[source]
        source: sqlx::error::BoxDynError,
    },

    /// The driver rejected the statement while executing it
    #[error("{source} Query:({sql})")]
    Execution {
        sql: String,
        #[source]
        source: sqlx::Error,
    },

    /// Generated-key mode was requested but the driver reported no key
    #[error("No generated key was reported for ({sql})")]
    KeyRetrieval { sql: String },

    /// Error from SQLx outside of statement execution (connecting, pooling)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Reading a property file or a blob stream failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn execution(sql: impl Into<String>, source: sqlx::Error) -> Self {
        Error::Execution {
            sql: sql.into(),
            source,
        }
    }
}

/// Result type alias for sqlx-named-params operations
pub type Result<T> = std::result::Result<T, Error>;
