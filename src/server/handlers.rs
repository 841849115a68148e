use std::sync::Arc;

use axum::extract::State;
use axum::response::Json;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info};
use url::Url;

use super::{AppState, ProxyError};
use crate::airtable::TableInfo;

/// Forward the table read and return the upstream body verbatim
pub(super) async fn projects(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ProxyError> {
    let client = state.airtable(ProxyError::Config {
        error: "Server configuration error",
        message: "Airtable Personal Access Token not configured",
    })?;

    let table = &state.config.table_name;
    info!("Fetching from URL: {}", client.table_url(table));

    let data = client.list_records(table).await.map_err(|e| {
        error!("Error fetching from Airtable: {}", e);
        ProxyError::Fetch(e)
    })?;

    Ok(Json(data))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct TablesResponse {
    message: &'static str,
    base_id: String,
    tables: Vec<TableSummary>,
    total_tables: usize,
}

#[derive(Serialize)]
pub(super) struct TableSummary {
    id: String,
    name: String,
    description: String,
}

impl From<TableInfo> for TableSummary {
    fn from(table: TableInfo) -> Self {
        Self {
            id: table.id,
            name: table.name,
            description: table
                .description
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| "No description".to_string()),
        }
    }
}

/// List the tables of the configured base
pub(super) async fn list_tables(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TablesResponse>, ProxyError> {
    let client = state.airtable(ProxyError::Config {
        error: "Missing environment variables",
        message: "Personal Access Token or Base ID not configured",
    })?;

    let tables = client.list_tables().await.map_err(|e| {
        error!("Error listing tables: {}", e);
        ProxyError::ListTables(e)
    })?;

    Ok(Json(TablesResponse {
        message: "Available tables in your base",
        base_id: client.base_id().to_string(),
        total_tables: tables.len(),
        tables: tables.into_iter().map(TableSummary::from).collect(),
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct DebugResponse {
    message: &'static str,
    environment: DebugEnvironment,
    #[serde(skip_serializing_if = "Option::is_none")]
    test_urls: Option<DebugUrls>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct DebugEnvironment {
    has_personal_access_token: bool,
    has_base_id: bool,
    has_table_name: bool,
    table_name: String,
    base_id: Option<String>,
    personal_access_token_length: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct DebugUrls {
    base_url: String,
    table_url: String,
    base_url_encoded: String,
    table_url_encoded: String,
}

/// Report which settings are present and the URLs they produce. The token
/// itself is never echoed, only its length.
pub(super) async fn debug(State(state): State<Arc<AppState>>) -> Json<DebugResponse> {
    let config = &state.config;
    let token = config.token();
    let base_id = config.base_id();
    let api = config.api_url.trim_end_matches('/');

    let test_urls = base_id.map(|base| DebugUrls {
        base_url: format!("{}/v0/{}", api, base),
        table_url: format!("{}/v0/{}/{}", api, base, config.table_name),
        base_url_encoded: encoded_url(&config.api_url, &["v0", base]),
        table_url_encoded: encoded_url(&config.api_url, &["v0", base, &config.table_name]),
    });

    Json(DebugResponse {
        message: "Debug information",
        environment: DebugEnvironment {
            has_personal_access_token: token.is_some(),
            has_base_id: base_id.is_some(),
            has_table_name: !config.table_name.is_empty(),
            table_name: config.table_name.clone(),
            base_id: base_id.map(String::from),
            personal_access_token_length: token.map_or(0, str::len),
        },
        test_urls,
    })
}

fn encoded_url(api_url: &str, segments: &[&str]) -> String {
    let Ok(mut url) = Url::parse(api_url) else {
        return String::new();
    };
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url.to_string()
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct HealthResponse {
    status: &'static str,
    checked_at: chrono::DateTime<chrono::Utc>,
}

pub(super) async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        checked_at: chrono::Utc::now(),
    })
}

pub(super) async fn method_not_allowed() -> ProxyError {
    ProxyError::MethodNotAllowed
}
