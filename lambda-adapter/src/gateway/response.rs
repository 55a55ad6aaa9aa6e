//! Responses handed back to the serverless gateway.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::request::{RequestError, JSON_CONTENT_TYPE};
use crate::webhooks::AggregateError;

/// Message used when a failure carries no message of its own.
pub const UNSPECIFIED_ERROR: &str = "Error: An Unspecified error occurred";

/// Gateway proxy response: `{"statusCode", "headers"?, "body"?}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayResponse {
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl GatewayResponse {
    pub fn text(status_code: u16, body: impl Into<String>) -> Self {
        Self {
            status_code,
            headers: None,
            body: Some(body.into()),
        }
    }

    /// `{"error": message}` without any extra headers.
    pub fn error(status_code: u16, message: &str) -> Self {
        Self::text(status_code, json!({ "error": message }).to_string())
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .get_or_insert_with(HashMap::new)
            .insert(name.to_string(), value.to_string());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.as_ref()?.get(name).map(String::as_str)
    }
}

impl From<&RequestError> for GatewayResponse {
    fn from(err: &RequestError) -> Self {
        let response = GatewayResponse::error(err.status_code(), &err.to_string())
            .with_header("content-type", JSON_CONTENT_TYPE);

        match err {
            RequestError::UnsupportedContentType => {
                response.with_header("accept", JSON_CONTENT_TYPE)
            }
            _ => response,
        }
    }
}

/// Message reported for a failed verification: the first error only.
///
/// An empty message counts as no message.
pub fn failure_message(error: &AggregateError) -> String {
    match error.first() {
        Some(first) => match &first.message {
            Some(message) if !message.is_empty() => format!("{}: {}", first.name, message),
            _ => UNSPECIFIED_ERROR.to_string(),
        },
        None => UNSPECIFIED_ERROR.to_string(),
    }
}

/// Status for a failed verification, 500 unless the first error names one.
pub fn failure_status(error: &AggregateError) -> u16 {
    error.first().and_then(|first| first.status).unwrap_or(500)
}
