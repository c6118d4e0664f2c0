use query_core::{FilterClause, OrderSpec, PageInfo, QuerySpec, ResultPage, SortDir};

#[test]
fn builder_keeps_filter_sequence() {
    let spec = QuerySpec::new("recipes", 3)
        .with_filters(vec![
            FilterClause::eq("isPublished", true),
            FilterClause::eq("category", "eggsAndBreakfast"),
        ])
        .with_order(Some(OrderSpec::new("publishDate", SortDir::Desc)));

    let fields: Vec<_> = spec.filters.iter().map(|f| f.field.as_str()).collect();
    assert_eq!(fields, vec!["isPublished", "category"]);
    assert!(spec.is_first_page());
    assert!(spec.validate().is_ok());
}

#[test]
fn after_sets_cursor() {
    let spec = QuerySpec::new("recipes", 3).after(Some("doc-3".into()));
    assert!(!spec.is_first_page());
    assert_eq!(spec.cursor_id.as_deref(), Some("doc-3"));
}

#[test]
fn sort_dir_serde_uses_lowercase() {
    let json = serde_json::to_string(&SortDir::Asc).expect("serialize");
    assert_eq!(json, "\"asc\"");
    let dir: SortDir = serde_json::from_str("\"DESC\"").expect("deserialize");
    assert_eq!(dir, SortDir::Desc);
}

#[test]
fn page_map_items_preserves_page_info() {
    let page = ResultPage::new(
        vec![1u32, 2, 3],
        PageInfo {
            next_cursor: Some("c".into()),
            limit: 3,
            has_more: true,
        },
    );
    let mapped = page.map_items(|n| n.to_string());
    assert_eq!(mapped.items, vec!["1", "2", "3"]);
    assert_eq!(mapped.page_info.next_cursor.as_deref(), Some("c"));
    assert!(mapped.page_info.has_more);
}
