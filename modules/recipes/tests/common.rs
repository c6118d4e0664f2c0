#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use query_core::ast::CompareOperator;
use recipes::contract::error::StoreError;
use recipes::contract::model::{CATEGORY_FIELD, PUBLISHED_FIELD, PUBLISH_DATE_FIELD};
use recipes::domain::store::{RawDocument, RawFields, RawValue, RemoteStore, StoreQuery};
use recipes::infra::storage::InMemoryStore;
use tokio::sync::oneshot;

pub const COLLECTION: &str = "recipes";
pub const BREAKFAST: &str = "eggsAndBreakfast";
pub const DESSERTS: &str = "desserts";

pub fn recipe(name: &str, category: &str, published: bool, publish_seconds: i64) -> RawFields {
    let mut fields = RawFields::new();
    fields.insert("name".into(), RawValue::String(name.into()));
    fields.insert(CATEGORY_FIELD.into(), RawValue::String(category.into()));
    fields.insert(PUBLISHED_FIELD.into(), RawValue::Bool(published));
    fields.insert(
        PUBLISH_DATE_FIELD.into(),
        RawValue::Timestamp {
            seconds: publish_seconds,
            nanos: 0,
        },
    );
    fields
}

/// Six published recipes A..F, newest first, plus an unpublished draft G
/// that is newer than all of them.
pub fn seeded_store() -> InMemoryStore {
    let store = InMemoryStore::new();
    let rows = [
        ("A", "Shakshuka", BREAKFAST, 600),
        ("B", "Tiramisu", DESSERTS, 500),
        ("C", "Eggs Benedict", BREAKFAST, 400),
        ("D", "Pavlova", DESSERTS, 300),
        ("E", "Frittata", BREAKFAST, 200),
        ("F", "Panna Cotta", DESSERTS, 100),
    ];
    for (id, name, category, seconds) in rows {
        store.insert(COLLECTION, id, recipe(name, category, true, seconds));
    }
    store.insert(COLLECTION, "G", recipe("Draft Waffles", BREAKFAST, false, 700));
    store
}

type Matcher = Box<dyn Fn(&StoreQuery) -> bool + Send + Sync>;

struct Gate {
    matcher: Matcher,
    release: oneshot::Receiver<Option<StoreError>>,
}

/// Wraps [`InMemoryStore`], records every page query and holds back the
/// ones matched by a gate until the test releases them.
pub struct GatedStore {
    inner: InMemoryStore,
    gates: Mutex<Vec<Gate>>,
    queries: Mutex<Vec<StoreQuery>>,
}

impl GatedStore {
    pub fn new(inner: InMemoryStore) -> Arc<Self> {
        Arc::new(Self {
            inner,
            gates: Mutex::new(Vec::new()),
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn inner(&self) -> &InMemoryStore {
        &self.inner
    }

    /// The next query matching `matcher` waits for the returned sender.
    /// Sending `Some(err)` fails that query; `None` or dropping lets it run.
    pub fn gate(
        &self,
        matcher: impl Fn(&StoreQuery) -> bool + Send + Sync + 'static,
    ) -> oneshot::Sender<Option<StoreError>> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().push(Gate {
            matcher: Box::new(matcher),
            release: rx,
        });
        tx
    }

    pub fn queries(&self) -> Vec<StoreQuery> {
        self.queries.lock().clone()
    }
}

#[async_trait]
impl RemoteStore for GatedStore {
    async fn query_page(&self, query: StoreQuery) -> Result<Vec<RawDocument>, StoreError> {
        self.queries.lock().push(query.clone());
        let gate = {
            let mut gates = self.gates.lock();
            gates
                .iter()
                .position(|g| (g.matcher)(&query))
                .map(|i| gates.remove(i))
        };
        if let Some(gate) = gate {
            if let Ok(Some(err)) = gate.release.await {
                return Err(err);
            }
        }
        self.inner.query_page(query).await
    }

    async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<RawDocument>, StoreError> {
        self.inner.get_document(collection, id).await
    }

    async fn create_document(
        &self,
        collection: &str,
        fields: RawFields,
    ) -> Result<String, StoreError> {
        self.inner.create_document(collection, fields).await
    }

    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        fields: RawFields,
    ) -> Result<(), StoreError> {
        self.inner.update_document(collection, id, fields).await
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.inner.delete_document(collection, id).await
    }
}

/// Matches queries carrying `field == value` for a string value.
pub fn has_eq_filter(field: &'static str, value: &'static str) -> impl Fn(&StoreQuery) -> bool {
    move |q| {
        q.filters.iter().any(|f| {
            f.field == field && f.op == CompareOperator::Eq && f.value == RawValue::String(value.into())
        })
    }
}

pub fn is_append(q: &StoreQuery) -> bool {
    q.start_after.is_some()
}

/// Give spawned fetch tasks a chance to run to completion.
pub async fn let_tasks_run() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}
