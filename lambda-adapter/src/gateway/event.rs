//! API Gateway proxy events.
//!
//! HTTP API payloads announce themselves with `"version": "2.0"`; anything
//! else is read as a REST API proxy event.

use aws_lambda_events::apigw::{ApiGatewayProxyRequest, ApiGatewayV2httpRequest};
use base64::Engine;
use http::HeaderMap;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

use super::request::InboundRequest;

const HTTP_API_VERSION: &str = "2.0";

#[derive(Debug, Clone)]
pub enum GatewayEvent {
    Rest(Box<ApiGatewayProxyRequest>),
    Http(Box<ApiGatewayV2httpRequest>),
}

impl<'de> Deserialize<'de> for GatewayEvent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let is_http_api = value.get("version").and_then(Value::as_str) == Some(HTTP_API_VERSION);

        if is_http_api {
            serde_json::from_value(value)
                .map(|event| GatewayEvent::Http(Box::new(event)))
                .map_err(serde::de::Error::custom)
        } else {
            serde_json::from_value(value)
                .map(|event| GatewayEvent::Rest(Box::new(event)))
                .map_err(serde::de::Error::custom)
        }
    }
}

impl GatewayEvent {
    pub fn method(&self) -> &str {
        match self {
            GatewayEvent::Rest(event) => event.http_method.as_str(),
            GatewayEvent::Http(event) => event.request_context.http.method.as_str(),
        }
    }

    /// Normalize into the transport-neutral request the adapter validates.
    pub fn into_request(self) -> InboundRequest {
        let method = self.method().to_string();
        let (headers, body, is_base64_encoded) = match self {
            GatewayEvent::Rest(event) => (event.headers, event.body, event.is_base64_encoded),
            GatewayEvent::Http(event) => (event.headers, event.body, event.is_base64_encoded),
        };

        InboundRequest::new(
            method,
            header_pairs(&headers),
            decode_body(body, is_base64_encoded),
        )
    }
}

/// Header names and values, skipping values that are not valid UTF-8.
pub(crate) fn header_pairs(headers: &HeaderMap) -> Vec<(&str, &str)> {
    headers
        .iter()
        .filter_map(|(name, value)| value.to_str().ok().map(|value| (name.as_str(), value)))
        .collect()
}

fn decode_body(body: Option<String>, is_base64_encoded: bool) -> Option<String> {
    let body = body?;
    if !is_base64_encoded {
        return Some(body);
    }

    let bytes = match base64::engine::general_purpose::STANDARD.decode(body.as_bytes()) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, body_length = body.len(), "gateway_body_base64_invalid");
            return None;
        }
    };

    match String::from_utf8(bytes) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            warn!(error = %e, "gateway_body_not_utf8");
            None
        }
    }
}
