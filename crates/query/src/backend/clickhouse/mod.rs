//! ClickHouse backend for the storage tiers
//!
//! Executes query descriptors over the HTTP interface. Bind parameters are
//! sent as `param_<name>` URL parameters, never spliced into the SQL text.

use std::collections::HashMap;
use std::time::Instant;

use async_trait::async_trait;

use crate::backend::{QueryBackend, validate_sql};
use crate::descriptor::QueryDescriptor;
use crate::error::QueryError;
use crate::result::{Column, DataType, QueryResult};

// =============================================================================
// Configuration
// =============================================================================

/// ClickHouse backend configuration
#[derive(Debug, Clone)]
pub struct ClickHouseBackendConfig {
    /// ClickHouse HTTP URL (e.g., "http://localhost:8123")
    pub url: String,

    /// Database name
    pub database: String,

    /// Username for authentication (optional)
    pub username: Option<String>,

    /// Password for authentication (optional)
    pub password: Option<String>,

    /// Max execution time in seconds
    pub max_execution_time: u64,
}

impl Default for ClickHouseBackendConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8123".into(),
            database: "default".into(),
            username: None,
            password: None,
            max_execution_time: 60,
        }
    }
}

impl ClickHouseBackendConfig {
    /// Create a new config with URL and database
    pub fn new(url: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            database: database.into(),
            ..Default::default()
        }
    }

    /// Set authentication credentials
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Set the server-side execution limit
    pub fn with_max_execution_time(mut self, seconds: u64) -> Self {
        self.max_execution_time = seconds;
        self
    }
}

// =============================================================================
// Backend Implementation
// =============================================================================

/// ClickHouse backend using the HTTP interface
#[derive(Clone)]
pub struct ClickHouseBackend {
    client: reqwest::Client,
    config: ClickHouseBackendConfig,
    name: &'static str,
}

impl std::fmt::Debug for ClickHouseBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClickHouseBackend")
            .field("name", &self.name)
            .field("url", &self.config.url)
            .field("database", &self.config.database)
            .finish()
    }
}

impl ClickHouseBackend {
    /// Create a new ClickHouse backend from config
    pub fn new(config: &ClickHouseBackendConfig) -> Self {
        Self::with_name(config, "clickhouse")
    }

    /// Create a backend labelled for logs (e.g. "warm")
    pub fn with_name(config: &ClickHouseBackendConfig, name: &'static str) -> Self {
        Self {
            client: reqwest::Client::new(),
            config: config.clone(),
            name,
        }
    }

    /// Build the request URL with settings, bind parameters and the query
    fn build_url(&self, sql: &str, query: Option<&QueryDescriptor>) -> String {
        let mut url = format!(
            "{}/?database={}&max_execution_time={}",
            self.config.url.trim_end_matches('/'),
            urlencoding::encode(&self.config.database),
            self.config.max_execution_time
        );

        if let Some(query) = query {
            for (name, value) in &query.params {
                url.push_str("&param_");
                url.push_str(&urlencoding::encode(name));
                url.push('=');
                url.push_str(&urlencoding::encode(&value.to_param_string()));
            }
        }

        url.push_str("&query=");
        url.push_str(&urlencoding::encode(sql));

        url
    }

    /// Send a query and get the raw response body
    async fn execute_raw(
        &self,
        sql: &str,
        query: Option<&QueryDescriptor>,
    ) -> Result<String, QueryError> {
        let url = self.build_url(sql, query);

        let mut request = self.client.get(&url);

        if let (Some(user), Some(pass)) = (&self.config.username, &self.config.password) {
            request = request.basic_auth(user, Some(pass));
        }

        let response = request.send().await.map_err(|e| {
            QueryError::Connection(format!("ClickHouse connection failed: {}", e))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(QueryError::Execution(format!(
                "ClickHouse error ({}): {}",
                status,
                body.trim()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| QueryError::Connection(format!("failed to read response: {}", e)))
    }
}

#[async_trait]
impl QueryBackend for ClickHouseBackend {
    async fn execute(&self, query: &QueryDescriptor) -> Result<QueryResult, QueryError> {
        let sql = query.to_sql()?;
        validate_sql(&sql)?;

        let start = Instant::now();

        let query_with_format = format!("{} FORMAT JSONEachRow", sql);
        let response_text = self.execute_raw(&query_with_format, Some(query)).await?;

        let execution_time_ms = start.elapsed().as_millis() as u64;

        let result = parse_json_each_row(&response_text, execution_time_ms)?;

        tracing::debug!(
            backend = self.name,
            rows = result.row_count,
            cols = result.columns.len(),
            time_ms = execution_time_ms,
            "ClickHouse query executed"
        );

        Ok(result)
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

// =============================================================================
// Response Parsing
// =============================================================================

/// Parse a `FORMAT JSONEachRow` body into a QueryResult
fn parse_json_each_row(body: &str, execution_time_ms: u64) -> Result<QueryResult, QueryError> {
    let json_rows: Vec<HashMap<String, serde_json::Value>> = body
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            serde_json::from_str(line).map_err(|e| {
                QueryError::Serialization(format!("failed to parse JSON row: {}", e))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let Some(first_row) = json_rows.first() else {
        return Ok(QueryResult::new(Vec::new(), Vec::new(), execution_time_ms));
    };

    let mut column_names: Vec<String> = first_row.keys().cloned().collect();
    column_names.sort();

    let columns: Vec<Column> = column_names
        .iter()
        .map(|name| {
            let value = first_row.get(name).unwrap_or(&serde_json::Value::Null);
            Column::new(name.clone(), DataType::infer(value))
        })
        .collect();

    let rows: Vec<Vec<serde_json::Value>> = json_rows
        .iter()
        .map(|row| {
            column_names
                .iter()
                .map(|name| row.get(name).cloned().unwrap_or(serde_json::Value::Null))
                .collect()
        })
        .collect();

    Ok(QueryResult::new(columns, rows, execution_time_ms))
}

/// URL encoding helper
mod urlencoding {
    pub fn encode(s: &str) -> String {
        let mut result = String::with_capacity(s.len() * 3);
        for byte in s.bytes() {
            match byte {
                b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                    result.push(byte as char);
                }
                _ => result.push_str(&format!("%{:02X}", byte)),
            }
        }
        result
    }
}

#[cfg(test)]
#[path = "clickhouse_test.rs"]
mod clickhouse_test;
