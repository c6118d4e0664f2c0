use query_core::{FilterClause, SortDir};
use tokio::sync::watch;

use crate::contract::{
    client::PaginationApi,
    error::ControllerError,
    model::{AccessLevel, PaginationState},
};
use crate::domain::controller::PaginationController;

/// Local implementation of the PaginationApi trait that delegates to the domain controller
pub struct RecipesLocalClient {
    controller: PaginationController,
}

impl RecipesLocalClient {
    pub fn new(controller: PaginationController) -> Self {
        Self { controller }
    }
}

impl PaginationApi for RecipesLocalClient {
    fn set_filters(&self, filters: Vec<FilterClause>) -> Result<(), ControllerError> {
        self.controller.set_filters(filters)
    }

    fn set_category_filter(&self, category: Option<&str>) -> Result<(), ControllerError> {
        self.controller.set_category_filter(category)
    }

    fn set_order(&self, dir: SortDir) -> Result<(), ControllerError> {
        self.controller.set_order(dir)
    }

    fn set_page_size(&self, page_size: u32) -> Result<(), ControllerError> {
        self.controller.set_page_size(page_size)
    }

    fn set_access_level(&self, access: AccessLevel) -> Result<(), ControllerError> {
        self.controller.set_access_level(access)
    }

    fn refresh(&self) -> Result<(), ControllerError> {
        self.controller.refresh()
    }

    fn load_more(&self) -> Result<(), ControllerError> {
        self.controller.load_more()
    }

    fn state(&self) -> PaginationState {
        self.controller.state()
    }

    fn subscribe(&self) -> watch::Receiver<PaginationState> {
        self.controller.subscribe()
    }
}
