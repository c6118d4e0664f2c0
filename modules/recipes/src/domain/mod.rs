pub mod controller;
pub mod mapper;
pub mod query;
pub mod state;
pub mod store;
pub mod store_client;
