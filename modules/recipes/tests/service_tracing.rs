//! Tests to verify that the client and controller emit expected tracing spans

mod common;

use std::sync::Arc;

use common::*;
use query_core::{OrderSpec, QuerySpec, SortDir};
use recipes::contract::error::ControllerError;
use recipes::contract::model::AccessLevel;
use recipes::domain::controller::{ControllerConfig, PaginationController};
use recipes::domain::store_client::DocumentStoreClient;
use tracing_test::traced_test;

fn client() -> DocumentStoreClient {
    DocumentStoreClient::new(Arc::new(seeded_store()))
}

#[traced_test]
#[tokio::test]
async fn execute_emits_spans() {
    let spec = QuerySpec::new(COLLECTION, 2)
        .with_order(Some(OrderSpec::new("publishDate", SortDir::Desc)));

    let result = client().execute(&spec).await;

    assert!(result.is_ok());
    assert!(logs_contain("recipes.store_client.execute"));
    assert!(logs_contain("Fetched page"));
}

#[traced_test]
#[tokio::test]
async fn rejected_command_is_logged() {
    let controller =
        PaginationController::new(client(), ControllerConfig::default(), AccessLevel::Public);

    let result = controller.load_more();

    assert_eq!(result, Err(ControllerError::NoCursorAvailable));
    assert!(logs_contain("recipes.controller.load_more"));
    assert!(logs_contain("Command rejected"));
}

#[traced_test]
#[tokio::test]
async fn background_fetch_runs_inside_fetch_span() {
    let controller =
        PaginationController::new(client(), ControllerConfig::default(), AccessLevel::Public);

    controller.refresh().unwrap();
    let state = controller.settled().await;

    assert_eq!(state.accumulated.len(), 3);
    assert!(logs_contain("recipes.controller.fetch"));
    assert!(logs_contain("Page received"));
}
