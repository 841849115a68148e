//! Airtable REST client.

mod client;

pub use client::{AirtableClient, TableInfo, UpstreamError, DEFAULT_API_URL};
