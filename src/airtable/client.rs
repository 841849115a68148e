//! Airtable client wrapper with bearer-token authentication.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use url::Url;

pub const DEFAULT_API_URL: &str = "https://api.airtable.com";

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("invalid Airtable API URL: {0}")]
    InvalidUrl(String),

    #[error("request to {url} failed: {source}")]
    Request {
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    #[error("Airtable API error: {status}. URL: {url}. Response: {body}")]
    Status {
        status: StatusCode,
        url: Url,
        body: String,
    },

    #[error("Failed to fetch tables: {status}")]
    Tables { status: StatusCode },
}

/// Table metadata from the base schema endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TablesResponse {
    tables: Vec<TableInfo>,
}

/// Airtable client scoped to one base
#[derive(Clone)]
pub struct AirtableClient {
    client: Client,
    api_url: Url,
    token: String,
    base_id: String,
}

impl AirtableClient {
    /// Create a client with its own connection pool
    pub fn new(api_url: &str, token: &str, base_id: &str) -> Result<Self, UpstreamError> {
        Self::with_client(Client::new(), api_url, token, base_id)
    }

    /// Create a client sharing an existing connection pool
    pub fn with_client(
        client: Client,
        api_url: &str,
        token: &str,
        base_id: &str,
    ) -> Result<Self, UpstreamError> {
        let api_url =
            Url::parse(api_url).map_err(|e| UpstreamError::InvalidUrl(format!("{api_url}: {e}")))?;
        if api_url.cannot_be_a_base() {
            return Err(UpstreamError::InvalidUrl(api_url.to_string()));
        }

        Ok(Self {
            client,
            api_url,
            token: token.to_string(),
            base_id: base_id.to_string(),
        })
    }

    pub fn base_id(&self) -> &str {
        &self.base_id
    }

    /// `<api>/v0/<baseId>/<tableName>`, each segment percent-encoded
    pub fn table_url(&self, table: &str) -> Url {
        self.url_with_segments(&["v0", &self.base_id, table])
    }

    /// `<api>/v0/meta/bases/<baseId>/tables`
    pub fn tables_url(&self) -> Url {
        self.url_with_segments(&["v0", "meta", "bases", &self.base_id, "tables"])
    }

    fn url_with_segments(&self, segments: &[&str]) -> Url {
        let mut url = self.api_url.clone();
        // cannot_be_a_base was rejected in the constructor
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Fetch the table's records and return the JSON body untouched
    pub async fn list_records(&self, table: &str) -> Result<Value, UpstreamError> {
        let url = self.table_url(table);
        let response = self.get(&url).await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status { status, url, body });
        }

        response
            .json::<Value>()
            .await
            .map_err(|source| UpstreamError::Request { url, source })
    }

    /// List the tables of the base
    pub async fn list_tables(&self) -> Result<Vec<TableInfo>, UpstreamError> {
        let url = self.tables_url();
        let response = self.get(&url).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Tables { status });
        }

        let body: TablesResponse = response
            .json()
            .await
            .map_err(|source| UpstreamError::Request { url, source })?;
        Ok(body.tables)
    }

    async fn get(&self, url: &Url) -> Result<reqwest::Response, UpstreamError> {
        debug!("GET {}", url);
        self.client
            .get(url.clone())
            .bearer_auth(&self.token)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|source| UpstreamError::Request {
                url: url.clone(),
                source,
            })
    }
}
