use std::cmp::Ordering;
use std::collections::BTreeMap;

use async_trait::async_trait;
use query_core::ast::CompareOperator;
use query_core::OrderSpec;
use serde::{Deserialize, Serialize};

use crate::contract::error::StoreError;

/// A field value as the store puts it on the wire.
///
/// Timestamps arrive as seconds plus nanoseconds and are converted to
/// points in time by the mapper before leaving the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Null,
    Bool(bool),
    Integer(i64),
    Double(f64),
    String(String),
    Timestamp {
        seconds: i64,
        #[serde(default)]
        nanos: u32,
    },
}

impl RawValue {
    /// Cross-kind sort rank, matching the store's mixed-type ordering.
    fn kind_rank(&self) -> u8 {
        match self {
            RawValue::Null => 0,
            RawValue::Bool(_) => 1,
            RawValue::Integer(_) | RawValue::Double(_) => 2,
            RawValue::Timestamp { .. } => 3,
            RawValue::String(_) => 4,
        }
    }

    /// Compare two values of the same kind; `None` across kinds.
    /// Integers and doubles compare numerically.
    pub fn compare(&self, other: &RawValue) -> Option<Ordering> {
        use RawValue as V;
        match (self, other) {
            (V::Null, V::Null) => Some(Ordering::Equal),
            (V::Bool(a), V::Bool(b)) => Some(a.cmp(b)),
            (V::Integer(a), V::Integer(b)) => Some(a.cmp(b)),
            (V::Integer(a), V::Double(b)) => (*a as f64).partial_cmp(b),
            (V::Double(a), V::Integer(b)) => a.partial_cmp(&(*b as f64)),
            (V::Double(a), V::Double(b)) => a.partial_cmp(b),
            (V::String(a), V::String(b)) => Some(a.cmp(b)),
            (
                V::Timestamp {
                    seconds: sa,
                    nanos: na,
                },
                V::Timestamp {
                    seconds: sb,
                    nanos: nb,
                },
            ) => Some((sa, na).cmp(&(sb, nb))),
            _ => None,
        }
    }

    /// Numbers sort by their `f64` value, then doubles before integers,
    /// then exact integer value, so mixed kinds and NaN stay totally ordered.
    fn numeric_sort_key(&self) -> Option<(f64, u8, i64)> {
        match self {
            RawValue::Double(d) => Some((*d, 0, 0)),
            RawValue::Integer(i) => Some((*i as f64, 1, *i)),
            _ => None,
        }
    }

    /// Total order used for sorting: kind rank first, then value.
    pub fn total_cmp(&self, other: &RawValue) -> Ordering {
        self.kind_rank().cmp(&other.kind_rank()).then_with(|| {
            match (self.numeric_sort_key(), other.numeric_sort_key()) {
                (Some(a), Some(b)) => a
                    .0
                    .total_cmp(&b.0)
                    .then(a.1.cmp(&b.1))
                    .then(a.2.cmp(&b.2)),
                _ => self.compare(other).unwrap_or(Ordering::Equal),
            }
        })
    }
}

pub type RawFields = BTreeMap<String, RawValue>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDocument {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub fields: RawFields,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawFilter {
    pub field: String,
    pub op: CompareOperator,
    pub value: RawValue,
}

/// A query in the store's own terms. Built like the store's fluent API:
/// every `filter` first, then `order_by`, then the page window.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreQuery {
    pub collection: String,
    pub filters: Vec<RawFilter>,
    pub order: Option<OrderSpec>,
    pub limit: u32,
    /// Resolved cursor document; results start strictly after it.
    pub start_after: Option<RawDocument>,
}

impl StoreQuery {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            filters: Vec::new(),
            order: None,
            limit: 0,
            start_after: None,
        }
    }

    pub fn filter(mut self, filter: RawFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order_by(mut self, order: Option<OrderSpec>) -> Self {
        self.order = order;
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn start_after(mut self, anchor: Option<RawDocument>) -> Self {
        self.start_after = anchor;
        self
    }
}

/// Port for the remote document store. Object-safe and async-friendly via `async_trait`.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Run a query and return at most `query.limit` documents in order.
    async fn query_page(&self, query: StoreQuery) -> Result<Vec<RawDocument>, StoreError>;
    /// Load one document by id; `None` if it does not exist.
    async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<RawDocument>, StoreError>;
    /// Insert a document; the store assigns and returns the id.
    async fn create_document(&self, collection: &str, fields: RawFields)
        -> Result<String, StoreError>;
    /// Merge `fields` into an existing document.
    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        fields: RawFields,
    ) -> Result<(), StoreError>;
    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_value_deserializes_untagged() {
        let fields: RawFields = serde_json::from_str(
            r#"{"a": null, "b": true, "c": 3, "d": 2.5, "e": "x", "f": {"seconds": 10}}"#,
        )
        .unwrap();
        assert_eq!(fields["a"], RawValue::Null);
        assert_eq!(fields["b"], RawValue::Bool(true));
        assert_eq!(fields["c"], RawValue::Integer(3));
        assert_eq!(fields["d"], RawValue::Double(2.5));
        assert_eq!(fields["e"], RawValue::String("x".into()));
        assert_eq!(
            fields["f"],
            RawValue::Timestamp {
                seconds: 10,
                nanos: 0
            }
        );
    }

    #[test]
    fn test_numbers_compare_across_integer_and_double() {
        assert_eq!(
            RawValue::Integer(2).compare(&RawValue::Double(2.5)),
            Some(Ordering::Less)
        );
        assert_eq!(
            RawValue::Double(3.0).compare(&RawValue::Integer(3)),
            Some(Ordering::Equal)
        );
    }

    #[test]
    fn test_kinds_do_not_compare_but_sort_by_rank() {
        let s = RawValue::String("1".into());
        let n = RawValue::Integer(1);
        assert_eq!(s.compare(&n), None);
        assert_eq!(n.total_cmp(&s), Ordering::Less);
        assert_eq!(RawValue::Null.total_cmp(&RawValue::Bool(false)), Ordering::Less);
    }

    #[test]
    fn test_numeric_sort_is_total_with_nan_and_large_integers() {
        let big = 1i64 << 53;
        let mut values = vec![
            RawValue::Integer(big + 1),
            RawValue::Double(f64::NAN),
            RawValue::Double(big as f64),
            RawValue::Integer(big),
            RawValue::Double(-1.5),
            RawValue::Integer(2),
        ];
        values.sort_by(RawValue::total_cmp);
        assert_eq!(
            values[..3],
            [
                RawValue::Double(-1.5),
                RawValue::Integer(2),
                RawValue::Double(big as f64),
            ]
        );
        assert_eq!(values[3], RawValue::Integer(big));
        assert_eq!(values[4], RawValue::Integer(big + 1));
        assert!(matches!(values[5], RawValue::Double(d) if d.is_nan()));
        for a in &values {
            assert_eq!(a.total_cmp(a), Ordering::Equal);
            for b in &values {
                assert_eq!(a.total_cmp(b), b.total_cmp(a).reverse());
            }
        }
    }

    #[test]
    fn test_timestamps_compare_seconds_then_nanos() {
        let a = RawValue::Timestamp {
            seconds: 5,
            nanos: 10,
        };
        let b = RawValue::Timestamp {
            seconds: 5,
            nanos: 20,
        };
        assert_eq!(a.compare(&b), Some(Ordering::Less));
    }
}
