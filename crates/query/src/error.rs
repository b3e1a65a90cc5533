//! Query error types

/// Errors that can occur during query execution
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// Store unreachable (connect failure, timeout, broken transfer)
    #[error("connection failed: {0}")]
    Connection(String),

    /// Store answered with an error
    #[error("query execution failed: {0}")]
    Execution(String),

    /// Rendered SQL failed the read-only guardrail
    #[error("invalid SQL: {0}")]
    InvalidSql(String),

    /// A predicate names a parameter that was never bound
    #[error("unbound query parameter: {0}")]
    UnboundParameter(String),

    /// Response body could not be decoded
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl QueryError {
    /// True when the store could not be reached at all
    pub fn is_unavailable(&self) -> bool {
        matches!(self, QueryError::Connection(_))
    }
}

impl From<serde_json::Error> for QueryError {
    fn from(err: serde_json::Error) -> Self {
        QueryError::Serialization(err.to_string())
    }
}
