//! Transport-level validation of inbound webhook deliveries.

use std::collections::HashMap;

use thiserror::Error;

/// Headers every GitHub delivery must carry, in reporting order.
pub const REQUIRED_HEADERS: [&str; 3] =
    ["x-github-event", "x-hub-signature-256", "x-github-delivery"];

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// A request as seen by the adapter, independent of the hosting transport.
///
/// Header names are lowercased on construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundRequest {
    method: String,
    headers: HashMap<String, String>,
    body: Option<String>,
}

impl InboundRequest {
    pub fn new<I, K, V>(method: impl Into<String>, headers: I, body: Option<String>) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        Self {
            method: method.into(),
            headers: headers
                .into_iter()
                .map(|(name, value)| (name.as_ref().to_ascii_lowercase(), value.into()))
                .collect(),
            body,
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn into_body(self) -> Option<String> {
        self.body
    }
}

/// Delivery metadata copied verbatim from the required headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryIdentity {
    pub event_name: String,
    pub signature: String,
    pub delivery_id: String,
}

/// Why a request was turned away before verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("Unknown route: {0}")]
    UnknownRoute(String),

    #[error("Unsupported \"Content-Type\" header value. Must be \"application/json\"")]
    UnsupportedContentType,

    #[error("Required headers missing: {}", .0.join(", "))]
    MissingHeaders(Vec<&'static str>),

    #[error("Required Body")]
    MissingBody,
}

impl RequestError {
    pub fn status_code(&self) -> u16 {
        match self {
            RequestError::UnknownRoute(_) => 404,
            RequestError::UnsupportedContentType => 415,
            RequestError::MissingHeaders(_) | RequestError::MissingBody => 400,
        }
    }
}

/// Check method, content type, required headers and body, in that order.
///
/// Header presence is key existence: an empty value still counts. Only the
/// content-type prefix is checked, so `application/json; charset=utf-8` passes.
pub fn validate(request: &InboundRequest) -> Result<DeliveryIdentity, RequestError> {
    if request.method() != "POST" {
        return Err(RequestError::UnknownRoute(request.method().to_string()));
    }

    let is_json = request
        .header("content-type")
        .map(|value| value.starts_with(JSON_CONTENT_TYPE))
        .unwrap_or(false);
    if !is_json {
        return Err(RequestError::UnsupportedContentType);
    }

    let missing: Vec<&'static str> = REQUIRED_HEADERS
        .iter()
        .copied()
        .filter(|name| request.header(name).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(RequestError::MissingHeaders(missing));
    }

    if request.body().map_or(true, str::is_empty) {
        return Err(RequestError::MissingBody);
    }

    let header = |name: &str| request.header(name).unwrap_or_default().to_string();

    Ok(DeliveryIdentity {
        event_name: header("x-github-event"),
        signature: header("x-hub-signature-256"),
        delivery_id: header("x-github-delivery"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_headers() -> Vec<(&'static str, &'static str)> {
        vec![
            ("content-type", "application/json"),
            ("x-github-event", "push"),
            ("x-hub-signature-256", "sha256=abc"),
            ("x-github-delivery", "72d3162e-cc78-11e3-81ab-4c9367dc0958"),
        ]
    }

    fn request(method: &str, headers: Vec<(&str, &str)>, body: Option<&str>) -> InboundRequest {
        InboundRequest::new(method, headers, body.map(str::to_string))
    }

    #[test]
    fn test_valid_request_extracts_identity() {
        let identity = validate(&request("POST", valid_headers(), Some("{}"))).unwrap();

        assert_eq!(
            identity,
            DeliveryIdentity {
                event_name: "push".to_string(),
                signature: "sha256=abc".to_string(),
                delivery_id: "72d3162e-cc78-11e3-81ab-4c9367dc0958".to_string(),
            }
        );
    }

    #[test]
    fn test_non_post_methods_are_unknown_routes() {
        for method in ["GET", "PUT", "DELETE", "PATCH", "HEAD", "OPTIONS", "post"] {
            let err = validate(&request(method, valid_headers(), Some("{}"))).unwrap_err();
            assert_eq!(err, RequestError::UnknownRoute(method.to_string()));
            assert_eq!(err.status_code(), 404);
            assert_eq!(err.to_string(), format!("Unknown route: {}", method));
        }
    }

    #[test]
    fn test_content_type_prefix_only() {
        let mut headers = valid_headers();
        headers[0] = ("content-type", "application/json; charset=utf-8");
        assert!(validate(&request("POST", headers, Some("{}"))).is_ok());
    }

    #[test]
    fn test_rejects_other_content_types() {
        for content_type in [
            "text/plain",
            "application/x-www-form-urlencoded",
            "Application/JSON",
            " application/json",
            "",
        ] {
            let mut headers = valid_headers();
            headers[0] = ("content-type", content_type);
            let err = validate(&request("POST", headers, Some("{}"))).unwrap_err();
            assert_eq!(err, RequestError::UnsupportedContentType);
            assert_eq!(err.status_code(), 415);
        }
    }

    #[test]
    fn test_missing_content_type() {
        let headers = valid_headers().into_iter().skip(1).collect();
        let err = validate(&request("POST", headers, Some("{}"))).unwrap_err();
        assert_eq!(err, RequestError::UnsupportedContentType);
    }

    #[test]
    fn test_missing_headers_reported_in_canonical_order() {
        let subsets: [&[&str]; 7] = [
            &["x-github-event"],
            &["x-hub-signature-256"],
            &["x-github-delivery"],
            &["x-github-delivery", "x-github-event"],
            &["x-github-delivery", "x-hub-signature-256"],
            &["x-hub-signature-256", "x-github-event"],
            &["x-github-delivery", "x-hub-signature-256", "x-github-event"],
        ];

        for removed in subsets {
            let headers = valid_headers()
                .into_iter()
                .filter(|(name, _)| !removed.contains(name))
                .collect();
            let err = validate(&request("POST", headers, Some("{}"))).unwrap_err();

            let expected: Vec<&str> = REQUIRED_HEADERS
                .iter()
                .copied()
                .filter(|name| removed.contains(name))
                .collect();
            assert_eq!(err, RequestError::MissingHeaders(expected.clone()));
            assert_eq!(err.status_code(), 400);
            assert_eq!(
                err.to_string(),
                format!("Required headers missing: {}", expected.join(", "))
            );
        }
    }

    #[test]
    fn test_empty_header_value_counts_as_present() {
        let mut headers = valid_headers();
        headers[1] = ("x-github-event", "");
        let identity = validate(&request("POST", headers, Some("{}"))).unwrap();
        assert_eq!(identity.event_name, "");
    }

    #[test]
    fn test_header_names_are_case_insensitive() {
        let headers = vec![
            ("Content-Type", "application/json"),
            ("X-GitHub-Event", "issues"),
            ("X-Hub-Signature-256", "sha256=abc"),
            ("X-GitHub-Delivery", "1"),
        ];
        assert!(validate(&request("POST", headers, Some("{}"))).is_ok());
    }

    #[test]
    fn test_missing_or_empty_body() {
        for body in [None, Some("")] {
            let err = validate(&request("POST", valid_headers(), body)).unwrap_err();
            assert_eq!(err, RequestError::MissingBody);
            assert_eq!(err.to_string(), "Required Body");
        }
    }

    #[test]
    fn test_first_failure_wins() {
        let err = validate(&request("GET", vec![], None)).unwrap_err();
        assert_eq!(err.status_code(), 404);

        let err = validate(&request("POST", vec![("x-github-event", "push")], None)).unwrap_err();
        assert_eq!(err, RequestError::UnsupportedContentType);
    }
}
