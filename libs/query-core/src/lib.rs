pub mod ast {
    use std::fmt;
    use std::str::FromStr;

    use bigdecimal::BigDecimal;
    use chrono::{DateTime, Utc};

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub enum CompareOperator {
        Eq,
        Ne,
        Lt,
        Le,
        Gt,
        Ge,
    }

    impl CompareOperator {
        pub fn as_str(&self) -> &'static str {
            match self {
                CompareOperator::Eq => "==",
                CompareOperator::Ne => "!=",
                CompareOperator::Lt => "<",
                CompareOperator::Le => "<=",
                CompareOperator::Gt => ">",
                CompareOperator::Ge => ">=",
            }
        }

        /// Everything except `==` restricts the store to range scans on one field.
        pub fn is_inequality(&self) -> bool {
            !matches!(self, CompareOperator::Eq)
        }
    }

    impl fmt::Display for CompareOperator {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.as_str())
        }
    }

    impl FromStr for CompareOperator {
        type Err = crate::QueryError;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s.trim() {
                "==" => Ok(CompareOperator::Eq),
                "!=" => Ok(CompareOperator::Ne),
                "<" => Ok(CompareOperator::Lt),
                "<=" => Ok(CompareOperator::Le),
                ">" => Ok(CompareOperator::Gt),
                ">=" => Ok(CompareOperator::Ge),
                other => Err(crate::QueryError::UnknownOperator(other.to_string())),
            }
        }
    }

    #[derive(Clone, Debug, PartialEq)]
    pub enum Value {
        Null,
        Bool(bool),
        Number(BigDecimal),
        String(String),
        DateTime(DateTime<Utc>),
    }

    impl fmt::Display for Value {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Value::Null => f.write_str("null"),
                Value::Bool(b) => write!(f, "{}", b),
                Value::Number(n) => write!(f, "{}", n.normalized()),
                Value::String(s) => write!(f, "{:?}", s),
                Value::DateTime(dt) => f.write_str(&dt.to_rfc3339()),
            }
        }
    }

    impl From<bool> for Value {
        fn from(b: bool) -> Self {
            Value::Bool(b)
        }
    }

    impl From<i64> for Value {
        fn from(n: i64) -> Self {
            Value::Number(BigDecimal::from(n))
        }
    }

    impl From<&str> for Value {
        fn from(s: &str) -> Self {
            Value::String(s.to_string())
        }
    }

    impl From<String> for Value {
        fn from(s: String) -> Self {
            Value::String(s)
        }
    }

    impl From<DateTime<Utc>> for Value {
        fn from(dt: DateTime<Utc>) -> Self {
            Value::DateTime(dt)
        }
    }
}

pub mod page;
pub use page::{PageInfo, ResultPage};

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("collection name must not be empty")]
    EmptyCollection,

    #[error("field name must not be empty")]
    EmptyField,

    #[error("page size must be positive")]
    ZeroPageSize,

    #[error("unknown comparison operator: {0}")]
    UnknownOperator(String),

    #[error("unknown sort direction: {0}")]
    UnknownDirection(String),
}

/// One `field <op> value` condition. Multiple clauses are ANDed.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterClause {
    pub field: String,
    pub op: ast::CompareOperator,
    pub value: ast::Value,
}

impl FilterClause {
    pub fn new(
        field: impl Into<String>,
        op: ast::CompareOperator,
        value: impl Into<ast::Value>,
    ) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<ast::Value>) -> Self {
        Self::new(field, ast::CompareOperator::Eq, value)
    }
}

impl fmt::Display for FilterClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.op, self.value)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SortDir {
    Asc,
    #[default]
    Desc,
}

impl SortDir {
    pub fn reverse(self) -> Self {
        match self {
            SortDir::Asc => SortDir::Desc,
            SortDir::Desc => SortDir::Asc,
        }
    }
}

impl fmt::Display for SortDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDir::Asc => f.write_str("asc"),
            SortDir::Desc => f.write_str("desc"),
        }
    }
}

impl FromStr for SortDir {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDir::Asc),
            "desc" => Ok(SortDir::Desc),
            _ => Err(QueryError::UnknownDirection(s.to_string())),
        }
    }
}

impl serde::Serialize for SortDir {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for SortDir {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderSpec {
    pub field: String,
    pub dir: SortDir,
}

impl OrderSpec {
    pub fn new(field: impl Into<String>, dir: SortDir) -> Self {
        Self {
            field: field.into(),
            dir,
        }
    }
}

/// Everything a store needs to produce one page.
///
/// Filters are applied in sequence order, then the order; `cursor_id` names the
/// last document of the previous page and is `None` for the first page.
#[derive(Clone, Debug, PartialEq)]
pub struct QuerySpec {
    pub collection: String,
    pub filters: Vec<FilterClause>,
    pub order: Option<OrderSpec>,
    pub page_size: u32,
    pub cursor_id: Option<String>,
}

impl QuerySpec {
    pub fn new(collection: impl Into<String>, page_size: u32) -> Self {
        Self {
            collection: collection.into(),
            filters: Vec::new(),
            order: None,
            page_size,
            cursor_id: None,
        }
    }

    pub fn with_filters(mut self, filters: Vec<FilterClause>) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_order(mut self, order: Option<OrderSpec>) -> Self {
        self.order = order;
        self
    }

    pub fn after(mut self, cursor_id: Option<String>) -> Self {
        self.cursor_id = cursor_id;
        self
    }

    pub fn is_first_page(&self) -> bool {
        self.cursor_id.is_none()
    }

    pub fn validate(&self) -> Result<(), QueryError> {
        if self.collection.trim().is_empty() {
            return Err(QueryError::EmptyCollection);
        }
        if self.page_size == 0 {
            return Err(QueryError::ZeroPageSize);
        }
        let order_field = self.order.as_ref().map(|o| o.field.as_str());
        if self
            .filters
            .iter()
            .map(|f| f.field.as_str())
            .chain(order_field)
            .any(|name| name.trim().is_empty())
        {
            return Err(QueryError::EmptyField);
        }
        Ok(())
    }
}
