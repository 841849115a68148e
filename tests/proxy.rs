mod common;

use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{closed_addr, proxy_config, records_body, spawn_proxy, spawn_upstream, TOKEN};
use projmap::server::ProxyConfig;

#[tokio::test]
async fn test_projects_passes_upstream_body_through() {
    let upstream = spawn_upstream().await;
    let proxy = spawn_proxy(proxy_config(&upstream)).await;

    for path in ["/projects", "/api/projects"] {
        let response = reqwest::get(format!("{}{}", proxy, path)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, records_body());
    }
}

#[tokio::test]
async fn test_cors_headers_on_success_and_error() {
    let upstream = spawn_upstream().await;
    let proxy = spawn_proxy(proxy_config(&upstream)).await;
    let broken = spawn_proxy(ProxyConfig::default()).await;
    let client = reqwest::Client::new();

    for url in [format!("{}/projects", proxy), format!("{}/projects", broken)] {
        let response = client
            .get(url)
            .header("Origin", "https://projects.example.com")
            .send()
            .await
            .unwrap();
        assert_eq!(
            response.headers()["access-control-allow-origin"],
            "*"
        );
    }
}

#[tokio::test]
async fn test_preflight_allows_get_and_content_type() {
    let proxy = spawn_proxy(ProxyConfig::default()).await;

    let response = reqwest::Client::new()
        .request(reqwest::Method::OPTIONS, format!("{}/projects", proxy))
        .header("Origin", "https://projects.example.com")
        .header("Access-Control-Request-Method", "GET")
        .header("Access-Control-Request-Headers", "content-type")
        .send()
        .await
        .unwrap();

    assert!(response.status().is_success());
    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(headers["access-control-allow-methods"], "GET");
    assert_eq!(headers["access-control-allow-headers"], "content-type");
}

#[tokio::test]
async fn test_missing_credentials_is_a_configuration_error() {
    let upstream = spawn_upstream().await;
    let configs = [
        ProxyConfig {
            token: None,
            ..proxy_config(&upstream)
        },
        ProxyConfig {
            base_id: Some(String::new()),
            ..proxy_config(&upstream)
        },
    ];

    for config in configs {
        let proxy = spawn_proxy(config).await;
        let response = reqwest::get(format!("{}/projects", proxy)).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = response.json().await.unwrap();
        assert_eq!(
            body,
            json!({
                "error": "Server configuration error",
                "message": "Airtable Personal Access Token not configured"
            })
        );
    }
}

#[tokio::test]
async fn test_upstream_error_is_reported() {
    let upstream = spawn_upstream().await;
    let proxy = spawn_proxy(ProxyConfig {
        table_name: "Archive".to_string(),
        ..proxy_config(&upstream)
    })
    .await;

    let response = reqwest::get(format!("{}/projects", proxy)).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Failed to fetch data");
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("404"), "{}", message);
    assert!(message.contains("TABLE_NOT_FOUND"), "{}", message);
}

#[tokio::test]
async fn test_unreachable_upstream_is_reported() {
    let upstream = format!("http://{}", closed_addr().await);
    let proxy = spawn_proxy(proxy_config(&upstream)).await;

    let response = reqwest::get(format!("{}/projects", proxy)).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Failed to fetch data");
}

#[tokio::test]
async fn test_non_get_is_rejected() {
    let upstream = spawn_upstream().await;
    let proxy = spawn_proxy(proxy_config(&upstream)).await;

    let response = reqwest::Client::new()
        .post(format!("{}/projects", proxy))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"error": "Method not allowed"}));
}

#[tokio::test]
async fn test_list_tables() {
    let upstream = spawn_upstream().await;
    let proxy = spawn_proxy(proxy_config(&upstream)).await;

    let response = reqwest::get(format!("{}/api/list-tables", proxy))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["baseId"], "appTEST");
    assert_eq!(body["totalTables"], 2);
    assert_eq!(
        body["tables"][1],
        json!({"id": "tblC", "name": "Contacts", "description": "No description"})
    );
}

#[tokio::test]
async fn test_list_tables_failure_has_suggestion() {
    let upstream = spawn_upstream().await;
    let proxy = spawn_proxy(ProxyConfig {
        token: Some("wrong".to_string()),
        ..proxy_config(&upstream)
    })
    .await;

    let response = reqwest::get(format!("{}/list-tables", proxy)).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Failed to list tables");
    assert!(body["suggestion"].as_str().unwrap().contains("base metadata"));
}

#[tokio::test]
async fn test_debug_never_returns_the_token() {
    let upstream = spawn_upstream().await;
    let proxy = spawn_proxy(ProxyConfig {
        table_name: "Road Projects".to_string(),
        ..proxy_config(&upstream)
    })
    .await;

    let text = reqwest::get(format!("{}/debug", proxy))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(!text.contains(TOKEN));

    let body: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(body["environment"]["hasPersonalAccessToken"], true);
    assert_eq!(body["environment"]["personalAccessTokenLength"], TOKEN.len());
    assert_eq!(
        body["testUrls"]["tableUrlEncoded"],
        format!("{}/v0/appTEST/Road%20Projects", upstream)
    );
}

#[tokio::test]
async fn test_health() {
    let proxy = spawn_proxy(ProxyConfig::default()).await;
    let body: Value = reqwest::get(format!("{}/health", proxy))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");
    assert!(body["checkedAt"].is_string());
}
