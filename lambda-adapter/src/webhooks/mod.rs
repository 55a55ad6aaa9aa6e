//! Webhook verification and dispatch.
//!
//! The gateway adapter only talks to this module through the
//! [`VerifyAndReceive`] trait. [`Webhooks`] is the stock implementation:
//! it checks the `X-Hub-Signature-256` signature, parses the payload and fans
//! the event out to every handler registered for it.
//!
//! ## Routing
//!
//! ```text
//! "*"                 every event
//! "issues"            every issues event
//! "issues.opened"     issues events whose payload action is "opened"
//! ```

pub mod error;
pub mod signature;

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::{join_all, BoxFuture};
use futures::FutureExt;
use serde_json::Value;
use tracing::{debug, error, info, warn};

pub use error::{AggregateError, HandlerError};

/// Event name that matches every delivery.
pub const ANY_EVENT: &str = "*";

/// A delivery as handed over by the gateway, before verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitterEvent {
    /// Delivery id from `X-GitHub-Delivery`
    pub id: String,
    /// Event name from `X-GitHub-Event`
    pub name: String,
    /// Raw JSON body, exactly as received
    pub payload: String,
    /// Signature from `X-Hub-Signature-256`
    pub signature: String,
}

/// A verified delivery with its parsed payload.
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookEvent {
    pub id: String,
    pub name: String,
    pub payload: Value,
}

impl WebhookEvent {
    /// The payload `action` field, present on most GitHub events.
    pub fn action(&self) -> Option<&str> {
        self.payload.get("action").and_then(Value::as_str)
    }
}

/// Verification and dispatch seam used by the gateway adapter.
///
/// Implementations resolve once every handler has finished, or reject with
/// all collected errors.
#[async_trait]
pub trait VerifyAndReceive: Send + Sync + 'static {
    async fn verify_and_receive(&self, event: EmitterEvent) -> Result<(), AggregateError>;
}

pub type Handler =
    Arc<dyn Fn(WebhookEvent) -> BoxFuture<'static, Result<(), HandlerError>> + Send + Sync>;

pub type ErrorHook = Arc<dyn Fn(&AggregateError) + Send + Sync>;

/// Signature-checking event emitter.
///
/// Handlers are registered up front, then the instance is shared behind an
/// `Arc` for the lifetime of the process.
pub struct Webhooks {
    secret: String,
    handlers: HashMap<String, Vec<Handler>>,
    error_hooks: Vec<ErrorHook>,
}

impl Webhooks {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            handlers: HashMap::new(),
            error_hooks: Vec::new(),
        }
    }

    /// Register a handler for an event name (`issues`) or event and action
    /// (`issues.opened`).
    pub fn on<F, Fut>(&mut self, event_name: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(WebhookEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        let boxed: Handler = Arc::new(move |event: WebhookEvent| handler(event).boxed());
        self.handlers
            .entry(event_name.into())
            .or_default()
            .push(boxed);
        self
    }

    /// Register a handler that receives every delivery.
    pub fn on_any<F, Fut>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(WebhookEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        self.on(ANY_EVENT, handler)
    }

    /// Register a hook that observes handler failures.
    pub fn on_error<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&AggregateError) + Send + Sync + 'static,
    {
        self.error_hooks.push(Arc::new(hook));
        self
    }

    /// Drop every handler registered under `event_name`.
    pub fn remove_listeners(&mut self, event_name: &str) -> &mut Self {
        self.handlers.remove(event_name);
        self
    }

    /// Log every verified delivery and every handler failure.
    pub fn log_deliveries(&mut self) -> &mut Self {
        self.on_any(|event| async move {
            info!(
                event = %event.name,
                action = event.action().unwrap_or(""),
                id = %event.id,
                "webhook_event_received"
            );
            Ok(())
        });
        self.on_error(|aggregate| error!(error = %aggregate, "webhook_handlers_failed"))
    }

    pub fn sign(&self, payload: &str) -> String {
        signature::sign(&self.secret, payload)
    }

    pub fn verify(&self, payload: &str, signature: &str) -> bool {
        signature::verify(&self.secret, payload, signature)
    }

    /// Dispatch an already verified event to its handlers.
    ///
    /// Handlers run concurrently. Errors are collected in registration
    /// order: catch-all handlers first, then event, then event and action.
    pub async fn receive(&self, event: WebhookEvent) -> Result<(), AggregateError> {
        let handlers = self.handlers_for(&event);

        if handlers.is_empty() {
            debug!(event = %event.name, id = %event.id, "webhook_no_handlers");
            return Ok(());
        }

        info!(
            event = %event.name,
            action = event.action().unwrap_or(""),
            id = %event.id,
            handler_count = handlers.len(),
            "webhook_dispatch_start"
        );

        let results = join_all(handlers.iter().map(|handler| handler(event.clone()))).await;
        let errors: Vec<HandlerError> = results.into_iter().filter_map(Result::err).collect();

        if errors.is_empty() {
            info!(event = %event.name, id = %event.id, "webhook_dispatch_complete");
            return Ok(());
        }

        warn!(
            event = %event.name,
            id = %event.id,
            error_count = errors.len(),
            "webhook_dispatch_failed"
        );

        let aggregate = AggregateError::new(errors);
        for hook in &self.error_hooks {
            hook(&aggregate);
        }

        Err(aggregate)
    }

    fn handlers_for(&self, event: &WebhookEvent) -> Vec<Handler> {
        let mut names = vec![ANY_EVENT.to_string(), event.name.clone()];
        if let Some(action) = event.action() {
            names.push(format!("{}.{}", event.name, action));
        }

        names
            .iter()
            .filter_map(|name| self.handlers.get(name))
            .flatten()
            .cloned()
            .collect()
    }
}

#[async_trait]
impl VerifyAndReceive for Webhooks {
    async fn verify_and_receive(&self, event: EmitterEvent) -> Result<(), AggregateError> {
        if !self.verify(&event.payload, &event.signature) {
            return Err(AggregateError::single(HandlerError::http(
                400,
                "signature does not match event payload and secret",
            )));
        }

        let payload: Value = serde_json::from_str(&event.payload).map_err(|e| {
            AggregateError::single(HandlerError::http(400, format!("invalid JSON payload: {}", e)))
        })?;

        self.receive(WebhookEvent {
            id: event.id,
            name: event.name,
            payload,
        })
        .await
    }
}
