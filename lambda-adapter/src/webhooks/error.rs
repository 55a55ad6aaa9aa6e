//! Error types surfaced by webhook verification and dispatch.

use std::fmt;

use thiserror::Error;

/// A single failure raised while verifying a delivery or running one handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct HandlerError {
    /// Error kind, e.g. `HttpError` or `Error`.
    pub name: String,
    /// Human readable message, if the handler provided one.
    pub message: Option<String>,
    /// HTTP-style status code to answer the delivery with.
    pub status: Option<u16>,
}

impl HandlerError {
    /// Generic handler failure without a status code.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            name: "Error".to_string(),
            message: Some(message.into()),
            status: None,
        }
    }

    /// Failure that carries an explicit HTTP status.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self {
            name: "HttpError".to_string(),
            message: Some(message.into()),
            status: Some(status),
        }
    }

    /// Failure with no message at all.
    pub fn unspecified() -> Self {
        Self {
            name: "Error".to_string(),
            message: None,
            status: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {}", self.name, message),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Every error collected from one verify-and-dispatch attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct AggregateError {
    pub errors: Vec<HandlerError>,
}

impl AggregateError {
    pub fn new(errors: Vec<HandlerError>) -> Self {
        Self { errors }
    }

    pub fn single(error: HandlerError) -> Self {
        Self {
            errors: vec![error],
        }
    }

    /// The first collected error; only this one is reported to the sender.
    pub fn first(&self) -> Option<&HandlerError> {
        self.errors.first()
    }
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
        write!(f, "{}", messages.join("\n"))
    }
}
