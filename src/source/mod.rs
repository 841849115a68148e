//! Data sources that supply table rows to the load pipeline.

mod fixed;
mod proxy;
mod upstream;

use std::future::Future;

use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::airtable::UpstreamError;
use crate::models::Row;

pub use fixed::StaticSource;
pub use proxy::ProxySource;
pub use upstream::AirtableSource;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error! status: {0}")]
    Status(reqwest::StatusCode),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unexpected payload: {0}")]
    Payload(String),
}

/// Capability: fetch every row of the project table.
pub trait DataSource {
    fn fetch_rows(&self) -> impl Future<Output = Result<Vec<Row>, FetchError>>;
}

/// Extract rows from either the upstream shape `{records: [{fields}]}` or a
/// bare array. Each record may be wrapped in `fields` or be the field map
/// itself.
pub fn rows_from_payload(payload: Value) -> Result<Vec<Row>, FetchError> {
    let records = match payload {
        Value::Object(mut object) => match object.remove("records") {
            Some(Value::Array(records)) => records,
            Some(other) => {
                return Err(FetchError::Payload(format!(
                    "`records` is not an array: {}",
                    other
                )))
            }
            None => return Err(FetchError::Payload("missing `records`".to_string())),
        },
        Value::Array(records) => records,
        other => {
            return Err(FetchError::Payload(format!(
                "expected an object or array, got {}",
                other
            )))
        }
    };

    let mut rows = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        match record {
            Value::Object(mut object) => match object.remove("fields") {
                Some(Value::Object(fields)) => rows.push(Row::new(fields)),
                Some(_) => {
                    warn!("Record {} has non-object fields, treating as empty", index);
                    rows.push(Row::default());
                }
                None => rows.push(Row::new(object)),
            },
            other => {
                warn!("Record {} is not an object ({}), treating as empty", index, other);
                rows.push(Row::default());
            }
        }
    }

    Ok(rows)
}
