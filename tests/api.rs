//! HTTP contract tests against a live server over the memory store.

mod common;

use serde_json::{json, Value};
use zlb_api::config::SecurityConfig;
use zlb_api::domain::DomainConfig;
use zlb_api::{ApiConfig, KvStore};
use zlb_sdk::{ApiFailure, CookieFilter, HealthCheck, ZlbClient};

use common::{client, start_memory_server};

fn failure(err: Box<dyn std::error::Error + Send + Sync>) -> ApiFailure {
    err.downcast_ref::<ApiFailure>()
        .cloned()
        .unwrap_or_else(|| panic!("expected an API failure, got {err}"))
}

fn sticky_api() -> zlb_sdk::DomainConfig {
    zlb_sdk::DomainConfig {
        sticky: true,
        path: "/api".to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_create_then_inspect() {
    let (server, store) = start_memory_server(ApiConfig::default()).await;
    let sdk = ZlbClient::new(&server.url());

    sdk.create_domain("a.com", &sticky_api()).await.unwrap();

    let stored = store.get("zlb/a.com/cfg/path_L2FwaQ==").await.unwrap().unwrap();
    let config: DomainConfig = serde_json::from_slice(&stored.value).unwrap();
    assert!(config.sticky);
    assert_eq!(config.path, "/api");

    let registry = store.get("zlb_domain/a.com").await.unwrap().unwrap();
    assert_eq!(registry.value, b"a.com");

    let tree = sdk.inspect_domain("a.com").await.unwrap();
    let raw = tree["zlb"]["a.com"]["cfg"]["/api"].as_str().unwrap();
    let parsed: DomainConfig = serde_json::from_str(raw).unwrap();
    assert_eq!(parsed, config);
}

#[tokio::test]
async fn test_create_without_path_uses_root() {
    let (server, store) = start_memory_server(ApiConfig::default()).await;
    let sdk = ZlbClient::new(&server.url());

    sdk.create_domain("a.com", &Default::default()).await.unwrap();

    assert!(store.get("zlb/a.com/cfg/path_Lw==").await.unwrap().is_some());
    let tree = sdk.inspect_domain("a.com").await.unwrap();
    assert!(tree["zlb"]["a.com"]["cfg"]["/"].is_string());
}

#[tokio::test]
async fn test_update_overwrites_path_record() {
    let (server, store) = start_memory_server(ApiConfig::default()).await;
    let sdk = ZlbClient::new(&server.url());

    sdk.create_domain("a.com", &sticky_api()).await.unwrap();
    let mut changed = sticky_api();
    changed.sticky = false;
    changed.keep_alive = 30;
    sdk.update_domain("a.com", &changed).await.unwrap();

    let stored = store.get("zlb/a.com/cfg/path_L2FwaQ==").await.unwrap().unwrap();
    let config: DomainConfig = serde_json::from_slice(&stored.value).unwrap();
    assert!(!config.sticky);
    assert_eq!(config.keep_alive, 30);
    assert_eq!(store.keys("zlb/a.com/", None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_inspect_unknown_domain_is_empty() {
    let (server, _store) = start_memory_server(ApiConfig::default()).await;
    let sdk = ZlbClient::new(&server.url());

    let tree = sdk.inspect_domain("nowhere.com").await.unwrap();
    assert_eq!(tree, json!({}));
}

#[tokio::test]
async fn test_list_is_sorted_and_unique() {
    let (server, _store) = start_memory_server(ApiConfig::default()).await;
    let sdk = ZlbClient::new(&server.url());

    assert!(sdk.list_domains().await.unwrap().is_empty());

    sdk.create_domain("b.com", &Default::default()).await.unwrap();
    sdk.create_domain("a.com", &sticky_api()).await.unwrap();
    sdk.create_domain("a.com", &Default::default()).await.unwrap();

    assert_eq!(sdk.list_domains().await.unwrap(), vec!["a.com", "b.com"]);
}

#[tokio::test]
async fn test_remove_clears_every_namespace() {
    let (server, store) = start_memory_server(ApiConfig::default()).await;
    let sdk = ZlbClient::new(&server.url());

    sdk.create_domain("a.com", &sticky_api()).await.unwrap();
    sdk.create_domain("b.com", &sticky_api()).await.unwrap();
    let check = HealthCheck {
        kind: "http".to_string(),
        ..Default::default()
    };
    sdk.update_health_check("a.com", &check).await.unwrap();
    let filter = CookieFilter {
        name: "uid".to_string(),
        value: "42".to_string(),
        lifecycle: 60,
    };
    sdk.set_cookie_filter("a.com", &filter).await.unwrap();

    sdk.remove_domain("a.com").await.unwrap();

    let remaining = store.keys("", None).await.unwrap();
    assert!(remaining.iter().all(|k| !k.contains("a.com")), "{remaining:?}");
    assert!(remaining.contains(&"zlb_domain/b.com".to_string()));
    assert_eq!(sdk.list_domains().await.unwrap(), vec!["b.com"]);

    // removing again is not an error
    sdk.remove_domain("a.com").await.unwrap();
}

#[tokio::test]
async fn test_cookie_filter_lifecycle() {
    let (server, store) = start_memory_server(ApiConfig::default()).await;
    let sdk = ZlbClient::new(&server.url());

    let filter = CookieFilter {
        name: "uid".to_string(),
        value: "42".to_string(),
        lifecycle: 3600,
    };
    sdk.set_cookie_filter("a.com", &filter).await.unwrap();

    let stored = store.get("zlb_cookiefilter/a.com/uid/42").await.unwrap().unwrap();
    assert_eq!(stored.value, b"3600");
    assert_eq!(sdk.cookie_filters("a.com").await.unwrap(), vec![filter.clone()]);

    sdk.remove_cookie_filter("a.com", &filter).await.unwrap();
    assert!(sdk.cookie_filters("a.com").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_cookie_filter_rejects_slash() {
    let (server, store) = start_memory_server(ApiConfig::default()).await;
    let sdk = ZlbClient::new(&server.url());

    let filter = CookieFilter {
        name: "uid".to_string(),
        value: "a/b".to_string(),
        lifecycle: 1,
    };
    let err = failure(sdk.set_cookie_filter("a.com", &filter).await.unwrap_err());
    assert_eq!(err.status, 400);
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_cookie_filter_form_payload() {
    let (server, store) = start_memory_server(ApiConfig::default()).await;

    let resp = client()
        .post(format!("{}/zlb/domains/a.com/setCookieFilter", server.url()))
        .form(&[("Name", "session"), ("Value", "abc"), ("Lifecycle", "120")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "state": "OK" }));

    let stored = store.get("zlb_cookiefilter/a.com/session/abc").await.unwrap().unwrap();
    assert_eq!(stored.value, b"120");
}

#[tokio::test]
async fn test_health_check_round() {
    let (server, store) = start_memory_server(ApiConfig::default()).await;
    let sdk = ZlbClient::new(&server.url());

    let err = failure(sdk.health_check("a.com").await.unwrap_err());
    assert_eq!(err.status, 404);

    let check = HealthCheck {
        kind: "http".to_string(),
        uri: "/healthz".to_string(),
        valid_statuses: "200,204".to_string(),
        interval: 5,
        timeout: 2,
        fall: 3,
        rise: 2,
        concurrency: 10,
    };
    sdk.update_health_check("a.com", &check).await.unwrap();
    assert!(store.get("zlb_healthcheck/a.com").await.unwrap().is_some());
    assert_eq!(sdk.health_check("a.com").await.unwrap(), check);

    sdk.delete_health_check("a.com").await.unwrap();
    assert!(store.get("zlb_healthcheck/a.com").await.unwrap().is_none());
}

#[tokio::test]
async fn test_health_check_requires_type() {
    let (server, _store) = start_memory_server(ApiConfig::default()).await;
    let sdk = ZlbClient::new(&server.url());

    let err = failure(
        sdk.update_health_check("a.com", &HealthCheck::default())
            .await
            .unwrap_err(),
    );
    assert_eq!(err.status, 400);
    assert!(err.msg.contains("Type"), "{}", err.msg);
}

#[tokio::test]
async fn test_malformed_json_is_rejected() {
    let (server, store) = start_memory_server(ApiConfig::default()).await;

    let resp = client()
        .post(format!("{}/zlb/domains/a.com/create", server.url()))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["state"], "FAIL");
    assert!(body["msg"].is_string());
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_unsupported_content_type() {
    let (server, _store) = start_memory_server(ApiConfig::default()).await;

    let resp = client()
        .post(format!("{}/zlb/domains/a.com/create", server.url()))
        .header("content-type", "text/plain")
        .body("Sticky=true")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_blank_domain_name() {
    let (server, _store) = start_memory_server(ApiConfig::default()).await;

    let resp = client()
        .post(format!("{}/zlb/domains/%20/inspect", server.url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["state"], "FAIL");
    assert_eq!(body["msg"], "Please set DomainName in URI");
}

#[tokio::test]
async fn test_unknown_route_is_fail_envelope() {
    let (server, _store) = start_memory_server(ApiConfig::default()).await;

    let resp = client()
        .post(format!("{}/zlb/domains//inspect", server.url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["state"], "FAIL");
}

#[tokio::test]
async fn test_api_key_guards_domain_routes() {
    let config = ApiConfig {
        security: SecurityConfig {
            api_key: Some("secret".to_string()),
            ..Default::default()
        },
        ..Default::default()
    };
    let (server, _store) = start_memory_server(config).await;

    let err = failure(ZlbClient::new(&server.url()).list_domains().await.unwrap_err());
    assert_eq!(err.status, 401);

    let err = failure(
        ZlbClient::new(&server.url())
            .with_api_key("wrong")
            .list_domains()
            .await
            .unwrap_err(),
    );
    assert_eq!(err.status, 401);

    let sdk = ZlbClient::new(&server.url()).with_api_key("secret");
    assert!(sdk.list_domains().await.unwrap().is_empty());

    // status stays open
    let status = ZlbClient::new(&server.url()).status().await.unwrap();
    assert_eq!(status["status"], "operational");
}

#[tokio::test]
async fn test_status_reports_backend() {
    let (server, _store) = start_memory_server(ApiConfig::default()).await;

    let status = ZlbClient::new(&server.url()).status().await.unwrap();
    assert_eq!(status["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(status["store"], "memory");
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let (server, _store) = start_memory_server(ApiConfig::default()).await;

    let resp = client()
        .get(format!("{}/zlb/status", server.url()))
        .header("x-request-id", "trace-me")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.headers()["x-request-id"], "trace-me");

    let resp = client()
        .get(format!("{}/zlb/status", server.url()))
        .send()
        .await
        .unwrap();
    assert!(resp.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_domain_name_cannot_span_segments() {
    let (server, store) = start_memory_server(ApiConfig::default()).await;
    let sdk = ZlbClient::new(&server.url());
    sdk.create_domain("a.com", &Default::default()).await.unwrap();

    for action in ["create", "remove", "setCookieFilter"] {
        let resp = client()
            .post(format!(
                "{}/zlb/domains/a.com%2Fcfg%2Fpath_Lw==/{action}",
                server.url()
            ))
            .json(&json!({ "Name": "uid", "Value": "42", "Lifecycle": 1 }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400, "{action}");
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["state"], "FAIL");
    }

    let keys = store.keys("", None).await.unwrap();
    assert_eq!(keys, ["zlb/a.com/cfg/path_Lw==", "zlb_domain/a.com"]);
    assert!(sdk.inspect_domain("a.com").await.unwrap()["zlb"]["a.com"]["cfg"]["/"].is_string());
}

#[tokio::test]
async fn test_padded_domain_name_is_rejected() {
    let (server, store) = start_memory_server(ApiConfig::default()).await;

    let resp = client()
        .post(format!("{}/zlb/domains/%20a.com/create", server.url()))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["state"], "FAIL");
    assert!(body["msg"].as_str().unwrap().contains("DomainName"));
    assert!(store.is_empty());
}
