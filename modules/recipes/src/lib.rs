// === PUBLIC CONTRACT ===
pub mod contract;

// Re-export the public contract components
pub use contract::{client, error, model};

// === MODULE DEFINITION ===
pub mod module;
pub use module::Recipes;

// === INTERNAL MODULES ===
// Exposed for wiring the binary and for tests; prefer `contract` for stable APIs.
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod gateways;
pub mod infra;
