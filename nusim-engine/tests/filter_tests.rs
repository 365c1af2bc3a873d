use nusim_engine::{ApiError, FilterExpr};
use nusim_model::Entity;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::{json, Map, Value};

fn domain(data: Value) -> Entity {
    let data: Map<String, Value> = serde_json::from_value(data).unwrap();
    Entity::new("domain", data)
}

// ── Parsing ──────────────────────────────────────────────────────

#[test]
fn parse_double_quoted_value() {
    let expr = FilterExpr::parse("name == \"d1\"").unwrap();
    assert_eq!(expr, FilterExpr::new("name", "d1"));
}

#[test]
fn parse_single_quoted_both_sides() {
    let expr = FilterExpr::parse("'FIPUnderlay'=='false'").unwrap();
    assert_eq!(expr, FilterExpr::new("FIPUnderlay", "false"));
}

#[test]
fn parse_bare_value_and_extra_whitespace() {
    let expr: FilterExpr = "  domainVLANID   ==   42 ".parse().unwrap();
    assert_eq!(expr, FilterExpr::new("domainVLANID", "42"));
}

#[test]
fn parse_keeps_inner_spaces_in_value() {
    let expr = FilterExpr::parse("description == \"a b c\"").unwrap();
    assert_eq!(expr.value, "a b c");
}

#[test]
fn parse_rejects_malformed_expressions() {
    for expr in [
        "name",
        "name = \"d1\"",
        "== \"d1\"",
        "na-me == \"d1\"",
        "name == \"a\" == \"b\"",
        "name != \"d1\"",
    ] {
        assert!(
            matches!(FilterExpr::parse(expr), Err(ApiError::InvalidFilter(_))),
            "{expr} should not parse"
        );
    }
}

#[test]
fn invalid_filter_is_bad_request() {
    let err = FilterExpr::parse("garbage").unwrap_err();
    assert_eq!(err.status(), 400);
    assert_eq!(err.body(), json!({"message": "Invalid filter expression: garbage"}));
}

// ── Matching ─────────────────────────────────────────────────────

#[test]
fn string_attribute_matches_textually() {
    let entity = domain(json!({"name": "d1"}));
    assert!(FilterExpr::new("name", "d1").matches(&entity));
    assert!(!FilterExpr::new("name", "D1").matches(&entity));
    assert!(!FilterExpr::new("name", "d").matches(&entity));
}

#[test]
fn number_attribute_matches_numerically() {
    let entity = domain(json!({"domain_vlanid": 42}));
    assert!(FilterExpr::new("domainVLANID", "42").matches(&entity));
    assert!(FilterExpr::new("domainVLANID", "42.0").matches(&entity));
    assert!(!FilterExpr::new("domainVLANID", "43").matches(&entity));
    assert!(!FilterExpr::new("domainVLANID", "forty-two").matches(&entity));
}

#[test]
fn bool_attribute_matches_case_insensitively() {
    let entity = domain(json!({"fip_underlay": false}));
    assert!(FilterExpr::new("FIPUnderlay", "false").matches(&entity));
    assert!(FilterExpr::new("FIPUnderlay", "False").matches(&entity));
    assert!(!FilterExpr::new("FIPUnderlay", "true").matches(&entity));
    assert!(!FilterExpr::new("FIPUnderlay", "0").matches(&entity));
}

#[test]
fn missing_null_and_nested_never_match() {
    let entity = domain(json!({"description": null, "route_target": ["a"]}));
    assert!(!FilterExpr::new("name", "").matches(&entity));
    assert!(!FilterExpr::new("description", "null").matches(&entity));
    assert!(!FilterExpr::new("routeTarget", "a").matches(&entity));
}

#[test]
fn structural_fields_are_filterable() {
    let entity = domain(json!({"name": "d1"}));
    let id = entity.id.to_string();
    assert!(FilterExpr::new("ID", id).matches(&entity));
}

proptest! {
    #[test]
    fn quoted_value_round_trips(field in "[a-zA-Z][a-zA-Z0-9_]{0,15}", value in "[a-zA-Z0-9 ._-]{0,20}") {
        let expr = FilterExpr::parse(&format!("{field} == \"{value}\"")).unwrap();
        prop_assert_eq!(&expr.field, &field);
        prop_assert_eq!(&expr.value, &value);
    }

    #[test]
    fn parsed_string_filter_matches_its_own_value(value in "[a-zA-Z0-9_-]{1,20}") {
        let entity = domain(json!({"name": value.clone()}));
        let expr = FilterExpr::parse(&format!("name == '{value}'")).unwrap();
        prop_assert!(expr.matches(&entity));
    }
}
