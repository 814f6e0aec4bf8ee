use thiserror::Error;

/// Boxed driver error, kept unmodified as the source of a [`DbAccessError`].
pub type BoxDynError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error type for dbaccess operations
#[derive(Debug, Error)]
pub enum DbAccessError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(#[source] BoxDynError),

    #[error("Query failed: {0}")]
    QueryFailed(#[source] BoxDynError),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Row mapping failed: {0}")]
    Mapping(#[from] serde_json::Error),

    #[error("Column `{column}` has unsupported type {type_name}")]
    UnsupportedColumnType { column: String, type_name: String },

    #[error("Parameter ${position} has unsupported type {type_name}")]
    UnsupportedParameterType { position: usize, type_name: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to start blocking runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

impl DbAccessError {
    pub(crate) fn connection(err: impl Into<BoxDynError>) -> Self {
        DbAccessError::ConnectionFailed(err.into())
    }

    pub(crate) fn query(err: impl Into<BoxDynError>) -> Self {
        DbAccessError::QueryFailed(err.into())
    }

    /// Returns true if the call failed before a statement reached the server.
    pub fn is_connection_failure(&self) -> bool {
        matches!(self, DbAccessError::ConnectionFailed(_))
    }
}

/// Result type alias for dbaccess operations
pub type Result<T> = std::result::Result<T, DbAccessError>;
