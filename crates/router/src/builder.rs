//! Query builder for parameterized tier queries
//!
//! Builds [`QueryDescriptor`]s with support for:
//! - Time range predicates bound as `DateTime` parameters
//! - Date partition predicates for pruning
//! - Device and category `IN` lists bound as arrays
//! - Per-device grouping

use strata_query::{Comparison, Join, ParamValue, Predicate, QueryDescriptor};

use crate::filter::QueryFilter;
use crate::timerange::TimeRange;

/// Bind parameter names shared by every tier
pub mod params {
    pub const START: &str = "start";
    pub const END: &str = "end";
    pub const START_DATE: &str = "start_date";
    pub const END_DATE: &str = "end_date";
    pub const DEVICES: &str = "devices";
    pub const CATEGORIES: &str = "categories";
}

/// Query builder producing parameterized descriptors
#[derive(Debug, Default)]
pub struct QueryBuilder {
    query: QueryDescriptor,
}

impl QueryBuilder {
    /// Create a new query builder for a table (may carry an alias)
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            query: QueryDescriptor {
                table: table.into(),
                ..Default::default()
            },
        }
    }

    /// Add a SELECT column
    pub fn select(mut self, column: impl Into<String>) -> Self {
        self.query.select.push(column.into());
        self
    }

    /// Add a SELECT column with alias
    pub fn select_as(mut self, expr: impl Into<String>, alias: impl Into<String>) -> Self {
        self.query
            .select
            .push(format!("{} AS {}", expr.into(), alias.into()));
        self
    }

    /// LEFT JOIN another table
    pub fn left_join(mut self, table: impl Into<String>, on: impl Into<String>) -> Self {
        self.query.join = Some(Join {
            kind: "LEFT",
            table: table.into(),
            on: on.into(),
        });
        self
    }

    /// Add a predicate and bind its value
    pub fn where_param(
        mut self,
        column: impl Into<String>,
        op: Comparison,
        name: &str,
        value: ParamValue,
    ) -> Self {
        self.query.predicates.push(Predicate::new(column, op, name));
        self.query.params.insert(name.to_string(), value);
        self
    }

    /// Add a predicate whose placeholder is wrapped in a server function
    pub fn where_param_fn(
        mut self,
        column: impl Into<String>,
        op: Comparison,
        function: &str,
        name: &str,
        value: ParamValue,
    ) -> Self {
        self.query
            .predicates
            .push(Predicate::new(column, op, name).with_function(function));
        self.query.params.insert(name.to_string(), value);
        self
    }

    /// Add `column IN {name:Array(String)}`, skipped when `values` is empty
    pub fn where_in(self, column: impl Into<String>, name: &str, values: &[String]) -> Self {
        if values.is_empty() {
            return self;
        }
        self.where_param(column, Comparison::In, name, ParamValue::StringList(values.to_vec()))
    }

    /// Bound the time column by the range (inclusive)
    pub fn with_time_range(self, range: &TimeRange, column: &str) -> Self {
        self.where_param(
            column,
            Comparison::Gte,
            params::START,
            ParamValue::DateTime(range.start),
        )
        .where_param(
            column,
            Comparison::Lte,
            params::END,
            ParamValue::DateTime(range.end),
        )
    }

    /// Bound the date partition column by the range's calendar dates
    pub fn with_partition(self, range: &TimeRange, column: &str) -> Self {
        self.where_param(
            column,
            Comparison::Gte,
            params::START_DATE,
            ParamValue::Date(range.start_date()),
        )
        .where_param(
            column,
            Comparison::Lte,
            params::END_DATE,
            ParamValue::Date(range.end_date()),
        )
    }

    /// Apply the filter's device and category restrictions
    pub fn with_selection(self, filter: &QueryFilter, device_col: &str, category_col: &str) -> Self {
        self.where_in(device_col, params::DEVICES, &filter.devices)
            .where_in(category_col, params::CATEGORIES, &filter.categories)
    }

    /// Add a GROUP BY column
    pub fn group_by(mut self, column: impl Into<String>) -> Self {
        self.query.group_by.push(column.into());
        self
    }

    /// Add an ORDER BY column
    pub fn order_by(mut self, column: impl Into<String>) -> Self {
        self.query.order_by.push(column.into());
        self
    }

    /// Finish the descriptor
    pub fn build(self) -> QueryDescriptor {
        self.query
    }
}
