//! Drives the pagination reducer: commits snapshots, broadcasts them and
//! runs fetches in the background.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use query_core::{FilterClause, OrderSpec, QuerySpec, SortDir};
use tokio::sync::watch;
use tracing::{debug, debug_span, instrument, warn, Instrument};

use crate::contract::error::ControllerError;
use crate::contract::model::{
    AccessLevel, PaginationState, QueryParams, CATEGORY_FIELD, PUBLISH_DATE_FIELD,
};
use crate::domain::query::build_query_spec;
use crate::domain::state::{reduce, Event, FetchRequest, Transition};
use crate::domain::store_client::DocumentStoreClient;

#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub collection: String,
    pub default_page_size: u32,
    pub max_page_size: u32,
    /// Field every query is ordered by.
    pub order_field: String,
    pub default_order: SortDir,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            collection: "recipes".to_string(),
            default_page_size: 3,
            max_page_size: 100,
            order_field: PUBLISH_DATE_FIELD.to_string(),
            default_order: SortDir::Desc,
        }
    }
}

impl ControllerConfig {
    pub fn initial_params(&self) -> QueryParams {
        QueryParams {
            filters: Vec::new(),
            order: Some(OrderSpec::new(self.order_field.clone(), self.default_order)),
            page_size: self.clamp_page_size(self.default_page_size).max(1),
        }
    }

    /// Cap at `max_page_size`; zero passes through so the reducer can reject it.
    fn clamp_page_size(&self, page_size: u32) -> u32 {
        page_size.min(self.max_page_size.max(1))
    }
}

struct Committed {
    revision: u64,
    state: PaginationState,
}

struct Inner {
    client: DocumentStoreClient,
    config: ControllerConfig,
    /// Held only while reducing; never while touching the watch channel.
    committed: Mutex<Committed>,
    /// Revision currently in the watch channel. Only read or written under
    /// the channel's write lock.
    published: AtomicU64,
    tx: watch::Sender<PaginationState>,
}

/// Owns the current [`PaginationState`] and is the only writer of it.
///
/// Operations return immediately; page fetches run on the Tokio runtime the
/// operation was called from, so every method must be called inside one.
#[derive(Clone)]
pub struct PaginationController {
    inner: Arc<Inner>,
}

impl PaginationController {
    pub fn new(client: DocumentStoreClient, config: ControllerConfig, access: AccessLevel) -> Self {
        let initial = PaginationState::new(config.initial_params(), access);
        let (tx, _rx) = watch::channel(initial.clone());
        Self {
            inner: Arc::new(Inner {
                client,
                config,
                committed: Mutex::new(Committed {
                    revision: 0,
                    state: initial,
                }),
                published: AtomicU64::new(0),
                tx,
            }),
        }
    }

    pub fn state(&self) -> PaginationState {
        self.inner.committed.lock().state.clone()
    }

    /// Committed snapshots as they are published. Revisions only move
    /// forward; late subscribers see the latest one first.
    pub fn subscribe(&self) -> watch::Receiver<PaginationState> {
        self.inner.tx.subscribe()
    }

    /// Wait until no fetch is in flight and return that snapshot.
    pub async fn settled(&self) -> PaginationState {
        let mut rx = self.subscribe();
        let settled = rx.wait_for(|s| !s.is_loading()).await.map(|s| (*s).clone());
        settled.unwrap_or_else(|_| self.state())
    }

    #[instrument(name = "recipes.controller.set_filters", skip(self, filters), fields(count = filters.len()))]
    pub fn set_filters(&self, filters: Vec<FilterClause>) -> Result<(), ControllerError> {
        self.change_params(|params| params.filters = filters)
    }

    /// Replace any category equality clause with `category`, or drop it on `None`.
    #[instrument(name = "recipes.controller.set_category_filter", skip(self))]
    pub fn set_category_filter(&self, category: Option<&str>) -> Result<(), ControllerError> {
        self.change_params(|params| {
            params.filters.retain(|f| f.field != CATEGORY_FIELD);
            if let Some(category) = category {
                params.filters.push(FilterClause::eq(CATEGORY_FIELD, category));
            }
        })
    }

    #[instrument(name = "recipes.controller.set_order", skip(self), fields(dir = %dir))]
    pub fn set_order(&self, dir: SortDir) -> Result<(), ControllerError> {
        let field = self.inner.config.order_field.clone();
        self.change_params(|params| params.order = Some(OrderSpec::new(field, dir)))
    }

    #[instrument(name = "recipes.controller.set_page_size", skip(self))]
    pub fn set_page_size(&self, page_size: u32) -> Result<(), ControllerError> {
        let page_size = self.inner.config.clamp_page_size(page_size);
        self.change_params(|params| params.page_size = page_size)
    }

    #[instrument(name = "recipes.controller.set_access_level", skip(self))]
    pub fn set_access_level(&self, access: AccessLevel) -> Result<(), ControllerError> {
        self.dispatch_command(|state| Event::ParamsChanged {
            params: state.params.clone(),
            access,
        })
    }

    #[instrument(name = "recipes.controller.refresh", skip(self))]
    pub fn refresh(&self) -> Result<(), ControllerError> {
        self.change_params(|_| {})
    }

    #[instrument(name = "recipes.controller.load_more", skip(self))]
    pub fn load_more(&self) -> Result<(), ControllerError> {
        self.dispatch_command(|_| Event::LoadMoreRequested)
    }

    fn change_params(&self, edit: impl FnOnce(&mut QueryParams)) -> Result<(), ControllerError> {
        self.dispatch_command(|state| {
            let mut params = state.params.clone();
            edit(&mut params);
            Event::ParamsChanged {
                params,
                access: state.access,
            }
        })
    }

    /// Reduce a caller-issued event and start the fetch it asks for.
    fn dispatch_command(
        &self,
        make_event: impl FnOnce(&PaginationState) -> Event,
    ) -> Result<(), ControllerError> {
        let pending = self.apply(make_event).inspect_err(|e| {
            debug!(error = %e, "Command rejected");
        })?;
        if let Some((request, spec)) = pending {
            self.spawn_fetch(request, spec);
        }
        Ok(())
    }

    /// Reduce under the state lock, then publish the snapshot after
    /// releasing it. Subscribers never see a revision older than one they
    /// already saw.
    fn apply(
        &self,
        make_event: impl FnOnce(&PaginationState) -> Event,
    ) -> Result<Option<(FetchRequest, QuerySpec)>, ControllerError> {
        let (revision, snapshot, pending) = {
            let mut committed = self.inner.committed.lock();
            let event = make_event(&committed.state);
            match reduce(&committed.state, event)? {
                Transition::Discarded => {
                    debug!(
                        generation = committed.state.generation,
                        "Discarded stale fetch result"
                    );
                    return Ok(None);
                }
                Transition::Next { state, fetch } => {
                    let pending = fetch.map(|request| {
                        let spec = build_query_spec(
                            &self.inner.config.collection,
                            &state.params,
                            state.access,
                            request.cursor_id.clone(),
                        );
                        (request, spec)
                    });
                    committed.revision += 1;
                    committed.state = state;
                    (committed.revision, committed.state.clone(), pending)
                }
            }
        };
        self.publish(revision, snapshot);
        Ok(pending)
    }

    fn publish(&self, revision: u64, snapshot: PaginationState) {
        let published = &self.inner.published;
        self.inner.tx.send_if_modified(|current| {
            if revision <= published.load(Ordering::Relaxed) {
                return false;
            }
            published.store(revision, Ordering::Relaxed);
            *current = snapshot;
            true
        });
    }

    fn spawn_fetch(&self, request: FetchRequest, spec: QuerySpec) {
        let this = self.clone();
        let span = debug_span!(
            "recipes.controller.fetch",
            generation = request.generation,
            mode = ?request.mode,
        );
        tokio::spawn(
            async move {
                let event = match this.inner.client.execute(&spec).await {
                    Ok(page) => {
                        debug!(count = page.len(), has_more = page.page_info.has_more, "Page received");
                        Event::FetchSucceeded {
                            generation: request.generation,
                            mode: request.mode,
                            page,
                        }
                    }
                    Err(error) => {
                        warn!(error = %error, "Page fetch failed");
                        Event::FetchFailed {
                            generation: request.generation,
                            mode: request.mode,
                            error,
                        }
                    }
                };
                if let Err(e) = this.apply(|_| event) {
                    warn!(error = %e, "Fetch completion rejected");
                }
            }
            .instrument(span),
        );
    }
}
