use std::sync::Arc;

use query_core::{PageInfo, QuerySpec, ResultPage};
use tracing::{debug, instrument};

use crate::contract::error::StoreError;
use crate::contract::model::{Document, Fields};
use crate::domain::mapper;
use crate::domain::store::{RawDocument, RemoteStore, StoreQuery};

/// Stateless adapter that runs a [`QuerySpec`] against the remote store.
/// Cheap to clone and safe to share between concurrent fetches.
#[derive(Clone)]
pub struct DocumentStoreClient {
    store: Arc<dyn RemoteStore>,
}

impl DocumentStoreClient {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self { store }
    }

    /// Fetch one page.
    ///
    /// Asks the store for `page_size + 1` documents and trims the extra one,
    /// so `has_more` is exact even when the remaining count is a multiple of
    /// the page size.
    #[instrument(
        name = "recipes.store_client.execute",
        skip(self, spec),
        fields(collection = %spec.collection, page_size = spec.page_size, cursor = ?spec.cursor_id)
    )]
    pub async fn execute(&self, spec: &QuerySpec) -> Result<ResultPage<Document>, StoreError> {
        spec.validate()?;

        let start_after = match spec.cursor_id.as_deref() {
            Some(id) => Some(self.resolve_cursor(&spec.collection, id).await?),
            None => None,
        };

        // filters in sequence order, then ordering
        let query = spec
            .filters
            .iter()
            .map(mapper::filter_to_raw)
            .try_fold(StoreQuery::new(spec.collection.clone()), |q, f| {
                f.map(|f| q.filter(f))
            })?
            .order_by(spec.order.clone())
            .limit(spec.page_size.saturating_add(1))
            .start_after(start_after);

        let mut rows = self.store.query_page(query).await?;

        let limit = spec.page_size as usize;
        let has_more = rows.len() > limit;
        if has_more {
            rows.truncate(limit);
        }
        let next_cursor = rows.last().map(|d| d.id.clone());

        let page = ResultPage::new(
            rows,
            PageInfo {
                next_cursor,
                limit: spec.page_size,
                has_more,
            },
        )
        .try_map_items(mapper::document_from_raw)?;

        debug!(count = page.len(), has_more, "Fetched page");
        Ok(page)
    }

    async fn resolve_cursor(&self, collection: &str, id: &str) -> Result<RawDocument, StoreError> {
        self.store
            .get_document(collection, id)
            .await?
            .ok_or_else(|| StoreError::cursor_not_found(id))
    }

    #[instrument(name = "recipes.store_client.create_document", skip(self, fields))]
    pub async fn create_document(
        &self,
        collection: &str,
        fields: &Fields,
    ) -> Result<String, StoreError> {
        let raw = mapper::fields_to_raw(fields)?;
        let id = self.store.create_document(collection, raw).await?;
        debug!(%id, "Created document");
        Ok(id)
    }

    #[instrument(name = "recipes.store_client.update_document", skip(self, fields))]
    pub async fn update_document(
        &self,
        collection: &str,
        id: &str,
        fields: &Fields,
    ) -> Result<(), StoreError> {
        let raw = mapper::fields_to_raw(fields)?;
        self.store.update_document(collection, id, raw).await
    }

    #[instrument(name = "recipes.store_client.delete_document", skip(self))]
    pub async fn delete_document(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.store.delete_document(collection, id).await
    }
}
