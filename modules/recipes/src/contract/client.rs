use query_core::{FilterClause, SortDir};
use tokio::sync::watch;

use crate::contract::{
    error::ControllerError,
    model::{AccessLevel, PaginationState},
};

/// Public API of the pagination engine consumed by rendering glue.
///
/// Every `set_*` call starts a fresh generation and fetches page one in the
/// background; observe progress through [`PaginationApi::subscribe`].
pub trait PaginationApi: Send + Sync {
    /// Replace the user filters (ANDed).
    fn set_filters(&self, filters: Vec<FilterClause>) -> Result<(), ControllerError>;

    /// Filter by category, or drop the filter with `None`.
    fn set_category_filter(&self, category: Option<&str>) -> Result<(), ControllerError>;

    /// Order by the configured field in the given direction.
    fn set_order(&self, dir: SortDir) -> Result<(), ControllerError>;

    fn set_page_size(&self, page_size: u32) -> Result<(), ControllerError>;

    fn set_access_level(&self, access: AccessLevel) -> Result<(), ControllerError>;

    /// Re-run the current parameters from page one.
    fn refresh(&self) -> Result<(), ControllerError>;

    /// Fetch the page after the last accumulated document.
    fn load_more(&self) -> Result<(), ControllerError>;

    fn state(&self) -> PaginationState;

    fn subscribe(&self) -> watch::Receiver<PaginationState>;
}
