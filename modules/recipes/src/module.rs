use std::sync::Arc;

use tracing::{debug, info};

use crate::config::RecipesConfig;
use crate::contract::client::PaginationApi;
use crate::contract::error::ControllerError;
use crate::contract::model::AccessLevel;
use crate::domain::controller::PaginationController;
use crate::domain::store::RemoteStore;
use crate::domain::store_client::DocumentStoreClient;
use crate::gateways::local::RecipesLocalClient;

/// Wires a store into the client and controller.
#[derive(Clone)]
pub struct Recipes {
    controller: PaginationController,
}

impl Recipes {
    pub fn init(cfg: &RecipesConfig, store: Arc<dyn RemoteStore>, access: AccessLevel) -> Self {
        info!("Initializing recipes module");
        debug!(
            "Loaded recipes config: collection={}, default_page_size={}, max_page_size={}",
            cfg.collection, cfg.default_page_size, cfg.max_page_size
        );

        let client = DocumentStoreClient::new(store);
        let controller = PaginationController::new(client, cfg.controller_config(), access);
        Self { controller }
    }

    pub fn controller(&self) -> &PaginationController {
        &self.controller
    }

    /// Contract view for rendering glue.
    pub fn api(&self) -> Arc<dyn PaginationApi> {
        Arc::new(RecipesLocalClient::new(self.controller.clone()))
    }

    /// Kick off the first page, as a list view does on mount.
    pub fn start(&self) -> Result<(), ControllerError> {
        self.controller.refresh()
    }
}
