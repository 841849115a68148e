use tracing::warn;

use super::{rows_from_payload, DataSource, FetchError};
use crate::airtable::AirtableClient;
use crate::models::Row;

/// Rows fetched straight from Airtable.
///
/// Requires the access token on the client side, so this is meant for
/// local development only.
pub struct AirtableSource {
    client: AirtableClient,
    table: String,
}

impl AirtableSource {
    pub fn new(client: AirtableClient, table: &str) -> Self {
        Self {
            client,
            table: table.to_string(),
        }
    }
}

impl DataSource for AirtableSource {
    async fn fetch_rows(&self) -> Result<Vec<Row>, FetchError> {
        warn!("Using direct Airtable API calls; this exposes the access token to the client");
        let payload = self.client.list_records(&self.table).await?;
        rows_from_payload(payload)
    }
}
