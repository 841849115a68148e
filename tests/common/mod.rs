//! Mock Airtable upstream and server helpers shared by the integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::Path;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use serde_json::{json, Value};

use projmap::server::{router, AppState, ProxyConfig};

pub const TOKEN: &str = "patTEST.secret";
pub const BASE_ID: &str = "appTEST";

/// Serve `app` on an ephemeral local port
pub async fn spawn(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// An address nothing listens on
pub async fn closed_addr() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

pub fn records_body() -> Value {
    json!({
        "records": [
            {
                "id": "rec1",
                "createdTime": "2024-01-10T12:00:00.000Z",
                "fields": {"Name": "A", "Start Latitude": "1", "Start Longitude": "2"}
            }
        ]
    })
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(format!("Bearer {}", TOKEN).as_str())
}

async fn records(Path((base, table)): Path<(String, String)>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": {"type": "AUTHENTICATION_REQUIRED"}})),
        )
            .into_response();
    }
    if base != BASE_ID || table != "Projects" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": {"type": "TABLE_NOT_FOUND"}})),
        )
            .into_response();
    }
    Json(records_body()).into_response()
}

async fn tables(Path(base): Path<String>, headers: HeaderMap) -> Response {
    if !authorized(&headers) || base != BASE_ID {
        return StatusCode::FORBIDDEN.into_response();
    }
    Json(json!({
        "tables": [
            {"id": "tblP", "name": "Projects", "description": "Road projects", "fields": []},
            {"id": "tblC", "name": "Contacts", "fields": []}
        ]
    }))
    .into_response()
}

/// Start a mock Airtable API and return its root URL
pub async fn spawn_upstream() -> String {
    let app = Router::new()
        .route("/v0/meta/bases/{base}/tables", get(tables))
        .route("/v0/{base}/{table}", get(records));
    format!("http://{}", spawn(app).await)
}

pub fn proxy_config(api_url: &str) -> ProxyConfig {
    ProxyConfig {
        token: Some(TOKEN.to_string()),
        base_id: Some(BASE_ID.to_string()),
        api_url: api_url.to_string(),
        ..ProxyConfig::default()
    }
}

/// Start the proxy with `config` and return its root URL
pub async fn spawn_proxy(config: ProxyConfig) -> String {
    let app = router(Arc::new(AppState::new(config)));
    format!("http://{}", spawn(app).await)
}
