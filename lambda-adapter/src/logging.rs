//! Logger capability injected into the gateway adapter.
//!
//! The adapter logs once on intake and once more on verification failure.
//! [`TracingLogger`] is the default sink; [`NoopLogger`] silences both.

use crate::webhooks::AggregateError;

pub trait Logger: Send + Sync {
    fn debug(&self, message: &str);
    fn error(&self, message: &str, error: &AggregateError);
}

/// Forwards to `tracing` at the matching level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn debug(&self, message: &str) {
        tracing::debug!("{}", message);
    }

    fn error(&self, message: &str, error: &AggregateError) {
        tracing::error!(
            error = %error,
            error_count = error.errors.len(),
            "{}",
            message
        );
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn debug(&self, _message: &str) {}

    fn error(&self, _message: &str, _error: &AggregateError) {}
}
