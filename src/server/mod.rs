//! Proxy in front of the Airtable API.
//!
//! Holds the access token server-side and forwards table reads. The
//! record body is passed through untouched.

mod error;
mod handlers;

use std::sync::Arc;

use axum::http::{header, Method};
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::airtable::{AirtableClient, DEFAULT_API_URL};

pub use error::ProxyError;

pub const DEFAULT_TABLE_NAME: &str = "Projects";

/// Upstream settings, usually taken from the environment.
///
/// Token and base id are optional here so that a misconfigured deployment
/// still starts and answers every request with a configuration error.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub token: Option<String>,
    pub base_id: Option<String>,
    pub table_name: String,
    pub api_url: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            token: None,
            base_id: None,
            table_name: DEFAULT_TABLE_NAME.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

impl ProxyConfig {
    fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.is_empty())
    }

    fn base_id(&self) -> Option<&str> {
        self.base_id.as_deref().filter(|b| !b.is_empty())
    }
}

/// Application state shared across handlers
pub struct AppState {
    config: ProxyConfig,
    http: reqwest::Client,
}

impl AppState {
    pub fn new(config: ProxyConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Client for the configured base, or `missing` if the token or base id
    /// is not set
    fn airtable(&self, missing: ProxyError) -> Result<AirtableClient, ProxyError> {
        let (Some(token), Some(base_id)) = (self.config.token(), self.config.base_id()) else {
            tracing::error!("Missing required environment variables");
            return Err(missing);
        };

        AirtableClient::with_client(self.http.clone(), &self.config.api_url, token, base_id)
            .map_err(|e| {
                tracing::error!("Invalid upstream configuration: {}", e);
                ProxyError::Config {
                    error: "Server configuration error",
                    message: "Airtable API URL is invalid",
                }
            })
    }
}

/// Build the proxy router. Routes are served both at the root and under
/// `/api`.
pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route(
            "/projects",
            get(handlers::projects).fallback(handlers::method_not_allowed),
        )
        .route(
            "/list-tables",
            get(handlers::list_tables).fallback(handlers::method_not_allowed),
        )
        .route(
            "/debug",
            get(handlers::debug).fallback(handlers::method_not_allowed),
        );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(handlers::health))
        .merge(api.clone())
        .nest("/api", api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
