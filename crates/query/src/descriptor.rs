//! Parameterized query descriptors
//!
//! A descriptor is a structured SELECT: table, projections, a predicate list
//! and a separate set of typed bind parameters. Caller-supplied values only
//! ever travel as parameters; rendering emits ClickHouse `{name:Type}`
//! placeholders and the backend sends the values out of band.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::error::QueryError;

/// Format used for DateTime parameter values
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Typed bind parameter value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Second-precision timestamp
    DateTime(NaiveDateTime),
    /// Calendar date (partition keys)
    Date(NaiveDate),
    /// List of strings (IN predicates)
    StringList(Vec<String>),
}

impl ParamValue {
    /// ClickHouse type named in the placeholder
    pub fn clickhouse_type(&self) -> &'static str {
        match self {
            ParamValue::DateTime(_) => "DateTime",
            ParamValue::Date(_) => "Date",
            ParamValue::StringList(_) => "Array(String)",
        }
    }

    /// Value as sent in the `param_<name>` HTTP parameter
    pub fn to_param_string(&self) -> String {
        match self {
            ParamValue::DateTime(dt) => dt.format(DATETIME_FORMAT).to_string(),
            ParamValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            ParamValue::StringList(values) => {
                let quoted: Vec<String> = values
                    .iter()
                    .map(|v| format!("'{}'", escape_quoted(v)))
                    .collect();
                format!("[{}]", quoted.join(","))
            }
        }
    }
}

/// Predicate comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Gte,
    Lte,
    In,
}

impl Comparison {
    fn as_sql(&self) -> &'static str {
        match self {
            Comparison::Gte => ">=",
            Comparison::Lte => "<=",
            Comparison::In => "IN",
        }
    }
}

/// `column <op> {param:Type}`, optionally with the placeholder wrapped in a
/// server-side function
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Predicate {
    /// Column expression (builder-controlled, never caller input)
    pub column: String,
    /// Operator
    pub op: Comparison,
    /// Name of the bound parameter
    pub param: String,
    /// Function applied to the placeholder, e.g. `toStartOfHour`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
}

impl Predicate {
    /// Create a predicate
    pub fn new(column: impl Into<String>, op: Comparison, param: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            op,
            param: param.into(),
            function: None,
        }
    }

    /// Wrap the placeholder in a function call
    pub fn with_function(mut self, function: impl Into<String>) -> Self {
        self.function = Some(function.into());
        self
    }
}

/// `<kind> JOIN table ON condition`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Join {
    /// `INNER`, `LEFT`
    pub kind: &'static str,
    /// Joined table with alias
    pub table: String,
    /// Join condition
    pub on: String,
}

/// A complete parameterized SELECT
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryDescriptor {
    /// Source table, optionally aliased
    pub table: String,
    /// Projection expressions
    pub select: Vec<String>,
    /// Optional single join
    #[serde(skip_serializing_if = "Option::is_none")]
    pub join: Option<Join>,
    /// Conjunctive predicates
    pub predicates: Vec<Predicate>,
    /// GROUP BY expressions
    pub group_by: Vec<String>,
    /// ORDER BY expressions
    pub order_by: Vec<String>,
    /// Bind parameters keyed by name
    pub params: BTreeMap<String, ParamValue>,
}

impl QueryDescriptor {
    /// Look up a bound parameter
    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }

    /// Render to ClickHouse SQL with `{name:Type}` placeholders
    ///
    /// # Errors
    ///
    /// Returns `UnboundParameter` if a predicate names a parameter that has
    /// no value.
    pub fn to_sql(&self) -> Result<String, QueryError> {
        let mut sql = String::from("SELECT ");
        if self.select.is_empty() {
            sql.push('*');
        } else {
            sql.push_str(&self.select.join(", "));
        }

        sql.push_str(" FROM ");
        sql.push_str(&self.table);

        if let Some(join) = &self.join {
            let _ = write!(sql, " {} JOIN {} ON {}", join.kind, join.table, join.on);
        }

        if !self.predicates.is_empty() {
            let clauses = self
                .predicates
                .iter()
                .map(|p| self.render_predicate(p))
                .collect::<Result<Vec<_>, _>>()?;
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        if !self.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&self.group_by.join(", "));
        }

        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order_by.join(", "));
        }

        Ok(sql)
    }

    fn render_predicate(&self, predicate: &Predicate) -> Result<String, QueryError> {
        let value = self
            .params
            .get(&predicate.param)
            .ok_or_else(|| QueryError::UnboundParameter(predicate.param.clone()))?;

        let placeholder = format!("{{{}:{}}}", predicate.param, value.clickhouse_type());
        let operand = match &predicate.function {
            Some(f) => format!("{}({})", f, placeholder),
            None => placeholder,
        };

        Ok(format!(
            "{} {} {}",
            predicate.column,
            predicate.op.as_sql(),
            operand
        ))
    }
}

/// Escape a string literal inside an Array parameter
fn escape_quoted(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, DATETIME_FORMAT).unwrap()
    }

    fn sample() -> QueryDescriptor {
        let mut params = BTreeMap::new();
        params.insert(
            "start".to_string(),
            ParamValue::DateTime(at("2024-03-01 00:00:00")),
        );
        params.insert(
            "devices".to_string(),
            ParamValue::StringList(vec!["R001".into(), "R002".into()]),
        );

        QueryDescriptor {
            table: "sensor_fact_orc".into(),
            select: vec!["robot_id AS device_id".into(), "COUNT(*) AS data_count".into()],
            join: None,
            predicates: vec![
                Predicate::new("event_time", Comparison::Gte, "start"),
                Predicate::new("robot_id", Comparison::In, "devices"),
            ],
            group_by: vec!["robot_id".into()],
            order_by: vec!["device_id".into()],
            params,
        }
    }

    #[test]
    fn test_render_placeholders() {
        let sql = sample().to_sql().unwrap();
        assert_eq!(
            sql,
            "SELECT robot_id AS device_id, COUNT(*) AS data_count FROM sensor_fact_orc \
             WHERE event_time >= {start:DateTime} AND robot_id IN {devices:Array(String)} \
             GROUP BY robot_id ORDER BY device_id"
        );
    }

    #[test]
    fn test_values_stay_out_of_sql() {
        let sql = sample().to_sql().unwrap();
        assert!(!sql.contains("R001"));
        assert!(!sql.contains("2024-03-01"));
    }

    #[test]
    fn test_unbound_parameter() {
        let mut descriptor = sample();
        descriptor
            .predicates
            .push(Predicate::new("sensor_type", Comparison::In, "categories"));
        let err = descriptor.to_sql().unwrap_err();
        assert!(matches!(err, QueryError::UnboundParameter(ref p) if p == "categories"));
    }

    #[test]
    fn test_function_wrapped_placeholder() {
        let mut descriptor = sample();
        descriptor.predicates = vec![
            Predicate::new("stat_hour", Comparison::Gte, "start").with_function("toStartOfHour"),
        ];
        let sql = descriptor.to_sql().unwrap();
        assert!(sql.contains("stat_hour >= toStartOfHour({start:DateTime})"));
    }

    #[test]
    fn test_join_rendering() {
        let mut descriptor = sample();
        descriptor.table = "realtime_sensor_data AS s".into();
        descriptor.join = Some(Join {
            kind: "LEFT",
            table: "dim_robot AS r".into(),
            on: "s.robot_id = r.robot_id".into(),
        });
        let sql = descriptor.to_sql().unwrap();
        assert!(sql.contains(
            "FROM realtime_sensor_data AS s LEFT JOIN dim_robot AS r ON s.robot_id = r.robot_id WHERE"
        ));
    }

    #[test]
    fn test_param_strings() {
        assert_eq!(
            ParamValue::DateTime(at("2024-03-01 12:30:05")).to_param_string(),
            "2024-03-01 12:30:05"
        );
        assert_eq!(
            ParamValue::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()).to_param_string(),
            "2024-03-01"
        );
        assert_eq!(
            ParamValue::StringList(vec!["a".into(), "it's".into()]).to_param_string(),
            r"['a','it\'s']"
        );
    }

    #[test]
    fn test_clickhouse_types() {
        assert_eq!(
            ParamValue::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()).clickhouse_type(),
            "Date"
        );
        assert_eq!(
            ParamValue::StringList(vec![]).clickhouse_type(),
            "Array(String)"
        );
    }
}
