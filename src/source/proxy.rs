use reqwest::Client;
use serde_json::Value;
use tracing::info;
use url::Url;

use super::{rows_from_payload, DataSource, FetchError};
use crate::models::Row;

/// Rows fetched through the server-side proxy (keeps the token off the
/// client)
pub struct ProxySource {
    client: Client,
    endpoint: Url,
}

impl ProxySource {
    pub fn new(endpoint: Url) -> Self {
        Self::with_client(Client::new(), endpoint)
    }

    pub fn with_client(client: Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl DataSource for ProxySource {
    async fn fetch_rows(&self) -> Result<Vec<Row>, FetchError> {
        info!("Fetching project data from {}", self.endpoint);
        let response = self.client.get(self.endpoint.clone()).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        let payload: Value = response.json().await?;
        rows_from_payload(payload)
    }
}
