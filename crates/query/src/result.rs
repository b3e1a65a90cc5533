//! Query result types
//!
//! Backend-agnostic row set returned by every tier.

use serde::{Deserialize, Serialize};

/// Result of executing a query descriptor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    /// Column definitions
    pub columns: Vec<Column>,

    /// Row data as JSON values, in column order
    pub rows: Vec<Vec<serde_json::Value>>,

    /// Total row count
    pub row_count: usize,

    /// Query execution time in milliseconds
    pub execution_time_ms: u64,
}

impl QueryResult {
    /// Create a new query result
    pub fn new(
        columns: Vec<Column>,
        rows: Vec<Vec<serde_json::Value>>,
        execution_time_ms: u64,
    ) -> Self {
        let row_count = rows.len();
        Self {
            columns,
            rows,
            row_count,
            execution_time_ms,
        }
    }

    /// Create an empty result
    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new(), 0)
    }

    /// Check if result is empty
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get column names
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Position of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }
}

/// Column definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    /// Column name
    pub name: String,

    /// Data type
    pub data_type: DataType,
}

impl Column {
    /// Create a new column definition
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// Data types inferred from result values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// Signed 64-bit integer
    Int64,
    /// Unsigned 64-bit integer
    UInt64,
    /// 64-bit floating point
    Float64,
    /// UTF-8 string
    String,
    /// Boolean
    Boolean,
    /// Array or object
    Json,
    /// Null or unrecognized
    Unknown,
}

impl DataType {
    /// Infer a DataType from a JSON value
    pub fn infer(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => DataType::Unknown,
            serde_json::Value::Bool(_) => DataType::Boolean,
            serde_json::Value::Number(n) => {
                if n.is_f64() {
                    DataType::Float64
                } else if n.is_u64() {
                    DataType::UInt64
                } else {
                    DataType::Int64
                }
            }
            serde_json::Value::String(_) => DataType::String,
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => DataType::Json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_infer() {
        assert_eq!(DataType::infer(&json!(null)), DataType::Unknown);
        assert_eq!(DataType::infer(&json!(true)), DataType::Boolean);
        assert_eq!(DataType::infer(&json!(42)), DataType::UInt64);
        assert_eq!(DataType::infer(&json!(-42)), DataType::Int64);
        assert_eq!(DataType::infer(&json!(21.5)), DataType::Float64);
        assert_eq!(DataType::infer(&json!("R001")), DataType::String);
        assert_eq!(DataType::infer(&json!([1, 2])), DataType::Json);
    }

    #[test]
    fn test_column_index() {
        let result = QueryResult::new(
            vec![
                Column::new("device_id", DataType::String),
                Column::new("data_count", DataType::UInt64),
            ],
            vec![vec![json!("R001"), json!(3)]],
            7,
        );
        assert_eq!(result.row_count, 1);
        assert_eq!(result.column_index("data_count"), Some(1));
        assert_eq!(result.column_index("avg_pressure"), None);
        assert_eq!(result.column_names(), vec!["device_id", "data_count"]);
    }

    #[test]
    fn test_empty() {
        let result = QueryResult::empty();
        assert!(result.is_empty());
        assert_eq!(result.row_count, 0);
    }
}
