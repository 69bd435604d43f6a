//! End-to-end executions through the listener, the reqwest transport and a
//! mock backend.

mod common;

use common::*;
use serde_json::{json, Value};

#[tokio::test]
async fn test_successful_execution_is_proxied() {
    let (backend, captured) = start_mock_backend(
        MockResponse::new(200, r#"{"id":42,"name":"Ada"}"#)
            .header("Content-Type", "application/json")
            .header("X-Backend", "crm"),
    )
    .await;
    let (proxy, shutdown) = start_proxy(proxy_config(vec![tenant("dev", backend, "tok-dev")])).await;

    let response = client()
        .get(format!("http://{}/contacts/42?env=dev&fields=name", proxy))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["x-backend"], "crm");
    assert!(response.headers().contains_key("x-execution-id"));
    assert!(response.headers().contains_key("x-request-id"));
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"id": 42, "name": "Ada"}));

    let seen = captured.lock().unwrap().clone();
    assert_eq!(seen.len(), 1);
    let request = &seen[0];
    assert_eq!(request.method, "GET");
    assert!(request.target.starts_with("/api/v1/contacts/42?"));
    assert!(request.target.contains("env=dev"));
    assert!(request.target.contains("fields=name"));
    assert_eq!(request.headers["authorization"], "Bearer tok-dev");

    shutdown.trigger();
}

#[tokio::test]
async fn test_body_and_headers_are_forwarded() {
    let (backend, captured) = start_mock_backend(MockResponse::new(201, "created")).await;
    let (proxy, shutdown) = start_proxy(proxy_config(vec![tenant("dev", backend, "tok-dev")])).await;

    let response = client()
        .post(format!("http://{}/contacts?env=dev", proxy))
        .header("content-type", "application/json")
        .header("x-trace", "abc")
        .header("authorization", "Bearer caller-token")
        .body(r#"{"name":"Grace"}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 201);
    assert_eq!(response.text().await.unwrap(), "created");

    let seen = captured.lock().unwrap().clone();
    let request = &seen[0];
    assert_eq!(request.method, "POST");
    assert_eq!(request.body, br#"{"name":"Grace"}"#);
    assert_eq!(request.headers["content-type"], "application/json");
    assert_eq!(request.headers["x-trace"], "abc");
    // The tenant token replaces whatever the caller sent.
    assert_eq!(request.headers["authorization"], "Bearer tok-dev");

    shutdown.trigger();
}

#[tokio::test]
async fn test_tenants_are_routed_to_their_own_backend() {
    let (dev_backend, dev_seen) = start_mock_backend(MockResponse::new(200, "dev")).await;
    let (prod_backend, prod_seen) = start_mock_backend(MockResponse::new(200, "prod")).await;
    let (proxy, shutdown) = start_proxy(proxy_config(vec![
        tenant("dev", dev_backend, "tok-dev"),
        tenant("prod", prod_backend, "tok-prod"),
    ]))
    .await;

    let client = client();
    let dev = client
        .get(format!("http://{}/status?env=dev", proxy))
        .send()
        .await
        .unwrap();
    let prod = client
        .get(format!("http://{}/status?env=prod", proxy))
        .send()
        .await
        .unwrap();

    assert_eq!(dev.text().await.unwrap(), "dev");
    assert_eq!(prod.text().await.unwrap(), "prod");
    assert_eq!(dev_seen.lock().unwrap()[0].headers["authorization"], "Bearer tok-dev");
    assert_eq!(prod_seen.lock().unwrap()[0].headers["authorization"], "Bearer tok-prod");

    shutdown.trigger();
}

#[tokio::test]
async fn test_missing_tenant_parameter() {
    let (backend, captured) = start_mock_backend(MockResponse::new(200, "ok")).await;
    let (proxy, shutdown) = start_proxy(proxy_config(vec![tenant("dev", backend, "tok")])).await;

    let response = client()
        .get(format!("http://{}/contacts", proxy))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["kind"], "InvalidRequest");
    assert_eq!(body["statusCode"], 400);
    assert!(captured.lock().unwrap().is_empty());

    shutdown.trigger();
}

#[tokio::test]
async fn test_unknown_tenant_never_reaches_a_backend() {
    let (backend, captured) = start_mock_backend(MockResponse::new(200, "ok")).await;
    let (proxy, shutdown) = start_proxy(proxy_config(vec![tenant("dev", backend, "tok")])).await;

    let response = client()
        .get(format!("http://{}/contacts?env=staging", proxy))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["kind"], "ConfigError");
    assert!(body["message"].as_str().unwrap().contains("staging"));
    assert!(captured.lock().unwrap().is_empty());

    shutdown.trigger();
}

#[tokio::test]
async fn test_tenants_file_backs_the_store() {
    let (backend, captured) = start_mock_backend(MockResponse::new(200, "from-file")).await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tenants.toml");
    std::fs::write(
        &path,
        format!(
            "[[tenant]]\nid = \"qa\"\nurl = \"http://{}\"\ntoken = \"tok-qa\"\n",
            backend
        ),
    )
    .unwrap();

    let mut config = proxy_config(Vec::new());
    config.tenants.file = Some(path);
    let (proxy, shutdown) = start_proxy(config).await;

    let response = client()
        .get(format!("http://{}/ping?env=qa", proxy))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "from-file");
    assert_eq!(captured.lock().unwrap()[0].headers["authorization"], "Bearer tok-qa");

    shutdown.trigger();
}
