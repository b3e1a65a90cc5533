//! Query backend trait and implementations

pub mod clickhouse;

use async_trait::async_trait;

use crate::descriptor::QueryDescriptor;
use crate::error::QueryError;
use crate::result::QueryResult;

/// Query backend trait
///
/// One instance per storage tier. Implementations must be safe for
/// unbounded concurrent use.
#[async_trait]
pub trait QueryBackend: Send + Sync {
    /// Execute a parameterized query
    async fn execute(&self, query: &QueryDescriptor) -> Result<QueryResult, QueryError>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

/// Validate rendered SQL - only a single SELECT statement is sent
///
/// Descriptors are built by code, not users, so this catches builder bugs
/// rather than hostile input.
pub fn validate_sql(sql: &str) -> Result<(), QueryError> {
    let trimmed = sql.trim();
    let upper = trimmed.to_uppercase();

    if !upper.starts_with("SELECT") {
        return Err(QueryError::InvalidSql(
            "only SELECT queries are allowed".to_string(),
        ));
    }

    if trimmed.contains(';') {
        return Err(QueryError::InvalidSql(
            "multiple statements not allowed".to_string(),
        ));
    }

    Ok(())
}
