//! Filtered document queries

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde_json::Value;

/// Value side of a filter condition
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Integer(i64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for FilterValue {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<DateTime<Utc>> for FilterValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

/// Comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    Eq,
    Gte,
    Lt,
}

impl FilterOperator {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Gte => ">=",
            Self::Lt => "<",
        }
    }
}

/// A single `field <op> value` condition over a top-level document field
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub operator: FilterOperator,
    pub value: FilterValue,
}

impl Filter {
    /// Evaluates the condition against a serialized document
    pub fn matches(&self, document: &Value) -> bool {
        let Some(field) = document.get(&self.field) else {
            return false;
        };

        let ordering = match &self.value {
            FilterValue::Text(expected) => field.as_str().map(|s| s.cmp(expected.as_str())),
            FilterValue::Integer(expected) => field.as_i64().map(|n| n.cmp(expected)),
            FilterValue::Bool(expected) => field.as_bool().map(|b| b.cmp(expected)),
            FilterValue::Timestamp(expected) => field
                .as_str()
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|ts| ts.with_timezone(&Utc).cmp(expected)),
        };

        match (ordering, self.operator) {
            (Some(o), FilterOperator::Eq) => o.is_eq(),
            (Some(o), FilterOperator::Gte) => o.is_ge(),
            (Some(o), FilterOperator::Lt) => o.is_lt(),
            (None, _) => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// Ordering on a top-level RFC 3339 timestamp field
///
/// Documents without a readable timestamp sort after every other match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeOrder {
    pub field: String,
    pub direction: SortDirection,
}

impl TimeOrder {
    fn timestamp(&self, document: &Value) -> Option<DateTime<Utc>> {
        document
            .get(&self.field)
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|ts| ts.with_timezone(&Utc))
    }

    /// Compares two serialized documents
    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        match (self.timestamp(a), self.timestamp(b)) {
            (Some(a), Some(b)) => match self.direction {
                SortDirection::Ascending => a.cmp(&b),
                SortDirection::Descending => b.cmp(&a),
            },
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

/// Query over one collection: conjunction of filters, an optional order and
/// a result cap. The cap applies after ordering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentQuery {
    pub filters: Vec<Filter>,
    pub order: Option<TimeOrder>,
    pub limit: Option<usize>,
}

impl DocumentQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(self, field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.filter(field, FilterOperator::Eq, value)
    }

    pub fn gte(self, field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.filter(field, FilterOperator::Gte, value)
    }

    pub fn lt(self, field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.filter(field, FilterOperator::Lt, value)
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn order_by_time(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.order = Some(TimeOrder {
            field: field.into(),
            direction,
        });
        self
    }

    /// Orders and caps already-matched documents the way a backend would
    pub fn arrange<E>(&self, mut matches: Vec<(Value, E)>) -> Vec<E> {
        if let Some(ref order) = self.order {
            matches.sort_by(|(a, _), (b, _)| order.compare(a, b));
        }

        matches
            .into_iter()
            .take(self.limit.unwrap_or(usize::MAX))
            .map(|(_, entity)| entity)
            .collect()
    }

    fn filter(
        mut self,
        field: impl Into<String>,
        operator: FilterOperator,
        value: impl Into<FilterValue>,
    ) -> Self {
        self.filters.push(Filter {
            field: field.into(),
            operator,
            value: value.into(),
        });
        self
    }

    /// True when every filter matches the serialized document
    pub fn matches(&self, document: &Value) -> bool {
        self.filters.iter().all(|f| f.matches(document))
    }
}

/// Result of a find: the capped page plus the total number of matches
#[derive(Debug, Clone)]
pub struct FindResult<E> {
    pub items: Vec<E>,
    pub total: usize,
}

impl<E> FindResult<E> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }

    pub fn first(self) -> Option<E> {
        self.items.into_iter().next()
    }
}
