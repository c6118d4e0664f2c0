use query_core::SortDir;
use serde::{Deserialize, Serialize};

use crate::contract::model::PUBLISH_DATE_FIELD;
use crate::domain::controller::ControllerConfig;

/// Configuration for the recipes module
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecipesConfig {
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
    #[serde(default = "default_order_field")]
    pub order_field: String,
    #[serde(default)]
    pub default_order: SortDir,
}

impl Default for RecipesConfig {
    fn default() -> Self {
        Self {
            collection: default_collection(),
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            order_field: default_order_field(),
            default_order: SortDir::default(),
        }
    }
}

impl RecipesConfig {
    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            collection: self.collection.clone(),
            default_page_size: self.default_page_size,
            max_page_size: self.max_page_size,
            order_field: self.order_field.clone(),
            default_order: self.default_order,
        }
    }
}

fn default_collection() -> String {
    "recipes".to_string()
}

fn default_page_size() -> u32 {
    3
}

fn default_max_page_size() -> u32 {
    100
}

fn default_order_field() -> String {
    PUBLISH_DATE_FIELD.to_string()
}
