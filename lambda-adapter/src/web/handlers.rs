//! HTTP handlers that bridge axum requests into the gateway adapter.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::gateway::event::header_pairs;
use crate::gateway::{handle, AdapterOptions, GatewayResponse, InboundRequest};
use crate::webhooks::VerifyAndReceive;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub webhooks: Arc<dyn VerifyAndReceive>,
    pub options: AdapterOptions,
}

impl AppState {
    pub fn new(webhooks: Arc<dyn VerifyAndReceive>, options: AdapterOptions) -> Self {
        Self { webhooks, options }
    }
}

/// Liveness payload, with the crate version for deploy checks.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Catch-all delivery endpoint.
///
/// Headers that are not valid UTF-8 are dropped, as is a body that is not
/// valid UTF-8.
pub async fn deliver(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> GatewayResponse {
    let body = match String::from_utf8(body.to_vec()) {
        Ok(body) => Some(body),
        Err(e) => {
            warn!(error = %e, "webhook_body_not_utf8");
            None
        }
    };

    let request = InboundRequest::new(method.as_str(), header_pairs(&headers), body);
    let response = handle(&state.webhooks, request, &state.options).await;

    info!(
        method = %method,
        status_code = response.status_code,
        "webhook_delivery_answered"
    );

    response
}

impl IntoResponse for GatewayResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut response = (status, self.body.unwrap_or_default()).into_response();

        for (name, value) in self.headers.unwrap_or_default() {
            match (
                HeaderName::try_from(name.as_str()),
                HeaderValue::from_str(&value),
            ) {
                (Ok(name), Ok(value)) => {
                    response.headers_mut().insert(name, value);
                }
                _ => warn!(header = %name, "gateway_response_header_invalid"),
            }
        }

        response
    }
}
