use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::airtable::UpstreamError;

/// Errors surfaced to proxy callers as JSON bodies
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("{error}: {message}")]
    Config {
        error: &'static str,
        message: &'static str,
    },

    #[error("Failed to fetch data: {0}")]
    Fetch(#[source] UpstreamError),

    #[error("Failed to list tables: {0}")]
    ListTables(#[source] UpstreamError),

    #[error("Method not allowed")]
    MethodNotAllowed,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    suggestion: Option<&'static str>,
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ProxyError::Config { error, message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    error,
                    message: Some(message.to_string()),
                    suggestion: None,
                },
            ),
            ProxyError::Fetch(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    error: "Failed to fetch data",
                    message: Some(e.to_string()),
                    suggestion: None,
                },
            ),
            ProxyError::ListTables(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    error: "Failed to list tables",
                    message: Some(e.to_string()),
                    suggestion: Some("Check if your Personal Access Token has access to base metadata"),
                },
            ),
            ProxyError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                ErrorBody {
                    error: "Method not allowed",
                    message: None,
                    suggestion: None,
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}
