use query_core::{FilterClause, QuerySpec};

use crate::contract::model::{AccessLevel, QueryParams, PUBLISHED_FIELD};

/// The filter every non-elevated query carries.
pub fn published_only() -> FilterClause {
    FilterClause::eq(PUBLISHED_FIELD, true)
}

/// Filters actually sent to the store for `access`.
///
/// Public callers get `isPublished == true` ahead of their own filters; an
/// identical user clause is dropped so the union holds it once.
pub fn effective_filters(access: AccessLevel, filters: &[FilterClause]) -> Vec<FilterClause> {
    match access {
        AccessLevel::Elevated => filters.to_vec(),
        AccessLevel::Public => {
            let implicit = published_only();
            std::iter::once(implicit.clone())
                .chain(filters.iter().filter(|f| **f != implicit).cloned())
                .collect()
        }
    }
}

pub fn build_query_spec(
    collection: &str,
    params: &QueryParams,
    access: AccessLevel,
    cursor_id: Option<String>,
) -> QuerySpec {
    QuerySpec::new(collection, params.page_size)
        .with_filters(effective_filters(access, &params.filters))
        .with_order(params.order.clone())
        .after(cursor_id)
}
