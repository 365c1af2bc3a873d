use nusim_cli::{build_router, load_config, load_registry, load_script, replay};
use nusim_engine::{EngineConfig, Method, Request};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::fs;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

// ── Loading ──────────────────────────────────────────────────────

#[test]
fn missing_config_path_uses_defaults() {
    assert_eq!(load_config(None).unwrap(), EngineConfig::default());
}

#[test]
fn partial_config_keeps_other_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "nusim.json", r#"{"organization": "acme", "api_prefix": "/api"}"#);

    let config = load_config(Some(path.as_path())).unwrap();
    assert_eq!(config.organization, "acme");
    assert_eq!(config.api_prefix, "/api");
    assert_eq!(config.dictionary_version, 2);
    assert_eq!(config.root_user_name, "csproot");
}

#[test]
fn unreadable_or_malformed_config_fails() {
    let dir = TempDir::new().unwrap();
    assert!(load_config(Some(dir.path().join("absent.json").as_path())).is_err());
    let path = write(&dir, "bad.json", "{ not json");
    assert!(load_config(Some(path.as_path())).is_err());
}

#[test]
fn schema_file_overrides_builtin_table() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "schemas.json",
        &json!({
            "schemas": [
                {
                    "rest_name": "enterprise",
                    "resource_name": "enterprises",
                    "attributes": ["name"],
                    "unique_fields": ["name"],
                    "mandatory_fields": ["name"],
                    "get_parents": ["me"],
                    "create_parents": ["me"]
                },
                {
                    "rest_name": "user",
                    "resource_name": "users",
                    "attributes": ["userName"],
                    "get_parents": ["me", "enterprise"],
                    "create_parents": ["enterprise"]
                }
            ]
        })
        .to_string(),
    );

    let registry = load_registry(Some(path.as_path())).unwrap();
    assert_eq!(registry.len(), 2);
    assert!(registry.get("domain").is_none());
    assert!(load_registry(None).unwrap().get("domain").is_some());
}

#[test]
fn inconsistent_schema_file_fails() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "schemas.json",
        r#"{"schemas": [{"rest_name": "zone", "resource_name": "zones", "get_parents": ["domain"]}]}"#,
    );
    assert!(load_registry(Some(path.as_path())).is_err());
}

#[test]
fn script_parses_requests() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "script.json",
        r#"[
            {"method": "GET", "path": "/nuage/api/v5_0/domains"},
            {"method": "POST", "path": "/nuage/api/v5_0/domains",
             "headers": {"X-Nuage-Organization": "acme"}, "body": {"name": "d1"}}
        ]"#,
    );
    let requests = load_script(&path).unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0], Request::new(Method::Get, "/nuage/api/v5_0/domains"));
    assert_eq!(
        requests[1],
        Request::new(Method::Post, "/nuage/api/v5_0/domains")
            .with_header("X-Nuage-Organization", "acme")
            .with_body(json!({"name": "d1"}))
    );
}

#[test]
fn malformed_script_fails() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "script.json", r#"[{"method": "PATCH", "path": "/x"}]"#);
    assert!(load_script(&path).is_err());
}

// ── Replay ───────────────────────────────────────────────────────

fn domain_script() -> Vec<Request> {
    vec![
        Request::new(Method::Post, "/nuage/api/v5_0/domains").with_body(json!({"name": "d1", "domainVLANID": 1})),
        Request::new(Method::Post, "/nuage/api/v5_0/domains").with_body(json!({"name": "d2", "domainVLANID": 1})),
        Request::new(Method::Get, "/nuage/api/v5_0/domains"),
    ]
}

#[test]
fn replay_runs_every_request_in_order() {
    let router = build_router(load_registry(None).unwrap(), EngineConfig::default()).unwrap();
    let exchanges = replay(&router, domain_script(), false);

    let statuses: Vec<u16> = exchanges.iter().map(|e| e.response.status).collect();
    assert_eq!(statuses, vec![201, 409, 200]);
    assert_eq!(exchanges[2].response.body.as_array().unwrap().len(), 1);
    assert_eq!(exchanges[1].response.body["internalErrorCode"], json!(9501));
}

#[test]
fn replay_stops_after_first_failure_when_asked() {
    let router = build_router(load_registry(None).unwrap(), EngineConfig::default()).unwrap();
    let exchanges = replay(&router, domain_script(), true);
    assert_eq!(exchanges.len(), 2);
    assert_eq!(exchanges[1].response.status, 409);
}

#[test]
fn configured_prefix_is_used_for_routing() {
    let config = EngineConfig {
        api_prefix: "/api".into(),
        ..EngineConfig::default()
    };
    let router = build_router(load_registry(None).unwrap(), config).unwrap();
    let exchanges = replay(
        &router,
        vec![Request::new(Method::Get, "/api/enterprises")],
        false,
    );
    assert_eq!(exchanges[0].response.status, 200);
}
