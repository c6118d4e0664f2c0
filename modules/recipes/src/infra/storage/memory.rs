//! In-process implementation of the [`RemoteStore`] port.
//!
//! Follows the query rules of the hosted document store closely enough to
//! run the engine offline: kind-strict comparisons, a single inequality
//! field that must also be the order field, documents lacking the order
//! field dropped from ordered results, and id as the tie-breaker.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use parking_lot::RwLock;
use query_core::ast::CompareOperator;
use query_core::{OrderSpec, SortDir};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::contract::error::StoreError;
use crate::domain::store::{RawDocument, RawFields, RawFilter, RawValue, RemoteStore, StoreQuery};

type Collection = BTreeMap<String, RawFields>;

#[derive(Default)]
pub struct InMemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a document under a caller-chosen id, replacing any previous one.
    pub fn insert(&self, collection: &str, id: impl Into<String>, fields: RawFields) {
        self.collections
            .write()
            .entry(collection.to_string())
            .or_default()
            .insert(id.into(), fields);
    }

    /// Seed `collection` from a JSON array of `{ "id": ..., "fields": {...} }`.
    /// Entries without an id get a generated one. Returns how many were loaded.
    pub fn load_fixtures(&self, collection: &str, json: &str) -> Result<usize, StoreError> {
        let docs: Vec<RawDocument> = serde_json::from_str(json)
            .map_err(|e| StoreError::malformed(format!("invalid fixture file: {}", e)))?;
        let count = docs.len();
        let mut collections = self.collections.write();
        let target = collections.entry(collection.to_string()).or_default();
        for doc in docs {
            let id = if doc.id.trim().is_empty() {
                new_document_id()
            } else {
                doc.id
            };
            target.insert(id, doc.fields);
        }
        debug!(collection, count, "Loaded fixtures");
        Ok(count)
    }

    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .get(collection)
            .map_or(0, |c| c.len())
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }
}

fn new_document_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Reject filter/order combinations the hosted store refuses to plan.
fn check_query_shape(query: &StoreQuery) -> Result<(), StoreError> {
    let mut inequality_fields = query
        .filters
        .iter()
        .filter(|f| f.op.is_inequality())
        .map(|f| f.field.as_str());

    let Some(range_field) = inequality_fields.next() else {
        return Ok(());
    };
    if let Some(other) = inequality_fields.find(|f| *f != range_field) {
        return Err(StoreError::malformed(format!(
            "inequality filters on multiple fields: '{}' and '{}'",
            range_field, other
        )));
    }
    match &query.order {
        Some(order) if order.field != range_field => Err(StoreError::malformed(format!(
            "order field '{}' must match inequality field '{}'",
            order.field, range_field
        ))),
        _ => Ok(()),
    }
}

fn matches(fields: &RawFields, filter: &RawFilter) -> bool {
    let Some(actual) = fields.get(&filter.field) else {
        return false;
    };
    let ord = actual.compare(&filter.value);
    match filter.op {
        CompareOperator::Eq => ord == Some(Ordering::Equal),
        CompareOperator::Ne => ord != Some(Ordering::Equal),
        CompareOperator::Lt => ord == Some(Ordering::Less),
        CompareOperator::Le => matches!(ord, Some(Ordering::Less | Ordering::Equal)),
        CompareOperator::Gt => ord == Some(Ordering::Greater),
        CompareOperator::Ge => matches!(ord, Some(Ordering::Greater | Ordering::Equal)),
    }
}

/// Position of `(value, id)` relative to another key under `order`.
fn key_cmp(a: (Option<&RawValue>, &str), b: (Option<&RawValue>, &str), dir: SortDir) -> Ordering {
    let by_value = match (a.0, b.0) {
        (Some(x), Some(y)) => x.total_cmp(y),
        _ => Ordering::Equal,
    };
    let ord = by_value.then_with(|| a.1.cmp(b.1));
    match dir {
        SortDir::Asc => ord,
        SortDir::Desc => ord.reverse(),
    }
}

fn sort_key<'a>(order: Option<&OrderSpec>, id: &'a str, fields: &'a RawFields) -> (Option<&'a RawValue>, &'a str) {
    (order.and_then(|o| fields.get(&o.field)), id)
}

#[async_trait]
impl RemoteStore for InMemoryStore {
    #[instrument(
        name = "recipes.memory_store.query_page",
        skip(self, query),
        fields(collection = %query.collection, filters = query.filters.len(), limit = query.limit)
    )]
    async fn query_page(&self, query: StoreQuery) -> Result<Vec<RawDocument>, StoreError> {
        check_query_shape(&query)?;

        let order = query.order.as_ref();
        let dir = order.map_or(SortDir::Asc, |o| o.dir);

        let anchor = match &query.start_after {
            Some(doc) => {
                let value = match order {
                    Some(o) => Some(doc.fields.get(&o.field).ok_or_else(|| {
                        StoreError::malformed(format!(
                            "cursor document '{}' has no value for order field '{}'",
                            doc.id, o.field
                        ))
                    })?),
                    None => None,
                };
                Some((value, doc.id.as_str()))
            }
            None => None,
        };

        let collections = self.collections.read();
        let Some(collection) = collections.get(&query.collection) else {
            return Ok(Vec::new());
        };

        let mut rows: Vec<(&String, &RawFields)> = collection
            .iter()
            .filter(|(_, fields)| order.map_or(true, |o| fields.contains_key(&o.field)))
            .filter(|(_, fields)| query.filters.iter().all(|f| matches(fields, f)))
            .filter(|(id, fields)| {
                anchor.map_or(true, |a| {
                    key_cmp(sort_key(order, id, fields), a, dir) == Ordering::Greater
                })
            })
            .collect();

        rows.sort_by(|(ia, fa), (ib, fb)| key_cmp(sort_key(order, ia, fa), sort_key(order, ib, fb), dir));
        if query.limit > 0 {
            rows.truncate(query.limit as usize);
        }

        debug!(returned = rows.len(), "Query evaluated");
        Ok(rows
            .into_iter()
            .map(|(id, fields)| RawDocument {
                id: id.clone(),
                fields: fields.clone(),
            })
            .collect())
    }

    async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<RawDocument>, StoreError> {
        Ok(self
            .collections
            .read()
            .get(collection)
            .and_then(|c| c.get(id))
            .map(|fields| RawDocument {
                id: id.to_string(),
                fields: fields.clone(),
            }))
    }

    #[instrument(name = "recipes.memory_store.create_document", skip(self, fields))]
    async fn create_document(
        &self,
        collection: &str,
        fields: RawFields,
    ) -> Result<String, StoreError> {
        let id = new_document_id();
        self.insert(collection, id.clone(), fields);
        Ok(id)
    }

    #[instrument(name = "recipes.memory_store.update_document", skip(self, fields))]
    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        fields: RawFields,
    ) -> Result<(), StoreError> {
        let mut collections = self.collections.write();
        let existing = collections
            .get_mut(collection)
            .and_then(|c| c.get_mut(id))
            .ok_or_else(|| StoreError::not_found(id))?;
        existing.extend(fields);
        Ok(())
    }

    #[instrument(name = "recipes.memory_store.delete_document", skip(self))]
    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.collections
            .write()
            .get_mut(collection)
            .and_then(|c| c.remove(id))
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(id))
    }
}
