use nusim_engine::{header_names, ApiError, FilterExpr, ListQuery, OrderBy, RequestHeaders, SortDirection};
use pretty_assertions::assert_eq;

fn parse(headers: &[(&str, &str)]) -> RequestHeaders {
    RequestHeaders::parse(headers.iter().copied(), "csp")
}

// ── Request headers ──────────────────────────────────────────────

#[test]
fn missing_organization_defaults() {
    let headers = parse(&[]);
    assert_eq!(headers.organization, "csp");
    assert_eq!(headers, RequestHeaders { organization: "csp".into(), ..RequestHeaders::default() });
}

#[test]
fn names_match_case_insensitively() {
    let headers = parse(&[
        ("x-nuage-organization", "acme"),
        ("X-NUAGE-PAGE", "2"),
        ("x-nuage-pagesize", "10"),
        ("X-Nuage-Filter", "name == \"d1\""),
        ("Content-Type", "application/json"),
    ]);
    assert_eq!(headers.organization, "acme");
    assert_eq!(headers.page.as_deref(), Some("2"));
    assert_eq!(headers.page_size.as_deref(), Some("10"));
    assert_eq!(headers.filter.as_deref(), Some("name == \"d1\""));
}

#[test]
fn non_numeric_paging_is_ignored() {
    let headers = parse(&[(header_names::PAGE, "first"), (header_names::PAGE_SIZE, "ten")]);
    assert_eq!(headers.page_number(), None);
    assert_eq!(headers.page_size_number(), None);
    assert!(!headers.single_item());
}

#[test]
fn page_zero_size_one_is_single_item() {
    let headers = parse(&[(header_names::PAGE, "0"), (header_names::PAGE_SIZE, " 1 ")]);
    assert!(headers.single_item());
}

#[test]
fn blank_filter_is_no_filter() {
    let headers = parse(&[(header_names::FILTER, "   ")]);
    assert_eq!(headers.filter_expr().unwrap(), None);
}

#[test]
fn bad_filter_is_invalid_filter() {
    let headers = parse(&[(header_names::FILTER, "name")]);
    assert!(matches!(headers.filter_expr(), Err(ApiError::InvalidFilter(_))));
}

// ── Response headers ─────────────────────────────────────────────

#[test]
fn response_echoes_request_headers_and_count() {
    let headers = parse(&[
        (header_names::ORGANIZATION, "acme"),
        (header_names::PAGE, "1"),
        (header_names::CLIENT_TYPE, "vsd"),
    ]);
    let out = headers.response_headers(7);

    assert_eq!(out[header_names::ORGANIZATION], "acme");
    assert_eq!(out[header_names::PAGE], "1");
    assert_eq!(out[header_names::CLIENT_TYPE], "vsd");
    assert_eq!(out[header_names::COUNT], "7");
    assert_eq!(out[header_names::EXPOSE_HEADERS], header_names::EXPOSED);
    assert!(!out.contains_key(header_names::FILTER));
    assert!(!out.contains_key(header_names::PAGE_SIZE));
}

// ── ListQuery from headers ───────────────────────────────────────

#[test]
fn list_query_takes_filter_and_order() {
    let headers = parse(&[
        (header_names::FILTER, "name == 'a'"),
        (header_names::ORDER_BY, "name desc"),
        (header_names::PAGE, "3"),
        (header_names::PAGE_SIZE, "5"),
    ]);
    let query = ListQuery::new("domain").with_headers(&headers).unwrap();

    assert_eq!(query.filter, Some(FilterExpr::new("name", "a")));
    assert_eq!(
        query.order_by,
        Some(OrderBy {
            field: "name".into(),
            direction: SortDirection::Descending
        })
    );
    assert!(!query.first_only);
    assert_eq!(query.limit(), usize::MAX);
}

#[test]
fn only_page_zero_size_one_limits_the_listing() {
    let single = parse(&[(header_names::PAGE, "0"), (header_names::PAGE_SIZE, "1")]);
    let query = ListQuery::new("domain").with_headers(&single).unwrap();
    assert!(query.first_only);
    assert_eq!(query.limit(), 1);

    for headers in [
        [(header_names::PAGE, "0"), (header_names::PAGE_SIZE, "0")],
        [(header_names::PAGE, "1"), (header_names::PAGE_SIZE, "1")],
        [(header_names::PAGE, "3"), (header_names::PAGE_SIZE, "5")],
        [(header_names::PAGE, "x"), (header_names::PAGE_SIZE, "1")],
    ] {
        let query = ListQuery::new("domain").with_headers(&parse(&headers)).unwrap();
        assert_eq!(query.limit(), usize::MAX, "{headers:?}");
    }
}

#[test]
fn order_by_parsing() {
    assert_eq!(OrderBy::parse("name").unwrap().direction, SortDirection::Ascending);
    assert_eq!(OrderBy::parse("name ASC").unwrap().direction, SortDirection::Ascending);
    assert!(matches!(OrderBy::parse("name sideways"), Err(ApiError::BadRequest(_))));
    assert!(matches!(OrderBy::parse("name DESC extra"), Err(ApiError::BadRequest(_))));
    assert!(matches!(OrderBy::parse(""), Err(ApiError::BadRequest(_))));
}
