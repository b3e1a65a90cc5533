//! Router error types

use strata_query::QueryError;
use thiserror::Error;

/// Router errors
#[derive(Debug, Error)]
pub enum RouterError {
    /// Malformed request: bad identifier, inverted range, unknown metric
    #[error("invalid query parameter: {0}")]
    QueryParam(String),

    /// Tier store could not be reached
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Tier store failed the query
    #[error("backend error: {0}")]
    Backend(String),
}

impl RouterError {
    /// Shorthand for a parameter error
    pub fn param(message: impl Into<String>) -> Self {
        RouterError::QueryParam(message.into())
    }

    /// True when the caller sent a bad request (4xx), false for store faults
    pub fn is_client_error(&self) -> bool {
        matches!(self, RouterError::QueryParam(_))
    }
}

impl From<QueryError> for RouterError {
    fn from(err: QueryError) -> Self {
        if err.is_unavailable() {
            RouterError::BackendUnavailable(err.to_string())
        } else {
            RouterError::Backend(err.to_string())
        }
    }
}

/// Result type for router operations
pub type Result<T> = std::result::Result<T, RouterError>;
