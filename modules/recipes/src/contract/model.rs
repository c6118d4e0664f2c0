use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use query_core::ast::Value;
use query_core::{FilterClause, OrderSpec};

use crate::contract::error::StoreError;

/// Flag that hides a document from the public view.
pub const PUBLISHED_FIELD: &str = "isPublished";
/// Publication timestamp, delivered by the store as seconds.
pub const PUBLISH_DATE_FIELD: &str = "publishDate";
pub const CATEGORY_FIELD: &str = "category";

pub type Fields = BTreeMap<String, Value>;

/// A record as seen by the UI: store-assigned id plus named fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        match self.get(field) {
            Some(Value::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn is_published(&self) -> bool {
        matches!(self.get(PUBLISHED_FIELD), Some(Value::Bool(true)))
    }

    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        match self.get(PUBLISH_DATE_FIELD) {
            Some(Value::DateTime(dt)) => Some(*dt),
            _ => None,
        }
    }
}

/// What the caller is allowed to see. Anything short of `Elevated` only
/// ever receives published documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AccessLevel {
    #[default]
    Public,
    Elevated,
}

/// User-settable query parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParams {
    pub filters: Vec<FilterClause>,
    pub order: Option<OrderSpec>,
    pub page_size: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// First page of a generation; replaces `accumulated`.
    Replace,
    /// Next page after the last accumulated document.
    Append,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Idle,
    Loading(FetchMode),
    Loaded,
    Failed(StoreError),
}

/// Immutable snapshot of what the user currently sees.
#[derive(Debug, Clone, PartialEq)]
pub struct PaginationState {
    pub params: QueryParams,
    pub access: AccessLevel,
    /// Id-unique, in store order.
    pub accumulated: Vec<Document>,
    pub status: Status,
    /// Bumped on every parameter change; fetches from older generations are inert.
    pub generation: u64,
    pub has_more: bool,
}

impl PaginationState {
    pub fn new(params: QueryParams, access: AccessLevel) -> Self {
        Self {
            params,
            access,
            accumulated: Vec::new(),
            status: Status::Idle,
            generation: 0,
            has_more: false,
        }
    }

    pub fn filters(&self) -> &[FilterClause] {
        &self.params.filters
    }

    pub fn order(&self) -> Option<&OrderSpec> {
        self.params.order.as_ref()
    }

    pub fn page_size(&self) -> u32 {
        self.params.page_size
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.status, Status::Loading(_))
    }

    pub fn error(&self) -> Option<&StoreError> {
        match &self.status {
            Status::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Id of the last accumulated document, the cursor for the next page.
    pub fn last_cursor(&self) -> Option<&str> {
        self.accumulated.last().map(|d| d.id.as_str())
    }

    pub fn ids(&self) -> Vec<&str> {
        self.accumulated.iter().map(|d| d.id.as_str()).collect()
    }
}
