//! Serverless gateway adapter for GitHub webhook deliveries.
//!
//! Each invocation:
//! 1. Rejects anything that is not a well-formed delivery (404/415/400)
//! 2. Races verification and dispatch against a fixed deadline
//! 3. Maps the outcome to a gateway response
//!
//! ```text
//! GatewayEvent → InboundRequest → validate() → race_verification() → Outcome → response
//! ```
//!
//! The deadline does not cancel verification. When it fires first the
//! verification task is detached and keeps running in the background; its
//! result and any side effects of its handlers are never reported.

pub mod event;
pub mod request;
pub mod response;

use std::sync::Arc;
use std::time::Duration;

use crate::logging::{Logger, TracingLogger};
use crate::webhooks::{AggregateError, EmitterEvent, HandlerError, VerifyAndReceive};

pub use event::GatewayEvent;
pub use request::{validate, DeliveryIdentity, InboundRequest, RequestError, REQUIRED_HEADERS};
pub use response::{failure_message, failure_status, GatewayResponse, UNSPECIFIED_ERROR};

/// Hard ceiling on verification and dispatch.
pub const VERIFY_TIMEOUT: Duration = Duration::from_millis(9000);

/// Adapter configuration.
#[derive(Clone)]
pub struct AdapterOptions {
    pub logger: Arc<dyn Logger>,
}

impl AdapterOptions {
    pub fn with_logger(logger: Arc<dyn Logger>) -> Self {
        Self { logger }
    }
}

impl Default for AdapterOptions {
    fn default() -> Self {
        Self {
            logger: Arc::new(TracingLogger),
        }
    }
}

/// Result of racing verification against the deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Timeout,
    VerificationFailure(AggregateError),
}

impl Outcome {
    pub fn into_response(self) -> GatewayResponse {
        match self {
            Outcome::Success => GatewayResponse::text(200, "ok\n"),
            Outcome::Timeout => GatewayResponse::text(408, "Timeout"),
            Outcome::VerificationFailure(error) => {
                GatewayResponse::error(failure_status(&error), &failure_message(&error))
            }
        }
    }
}

/// Handle one gateway event end to end.
pub async fn handle_event<W>(
    webhooks: &Arc<W>,
    event: GatewayEvent,
    options: &AdapterOptions,
) -> GatewayResponse
where
    W: VerifyAndReceive + ?Sized,
{
    handle(webhooks, event.into_request(), options).await
}

/// Validate, verify and dispatch a single delivery.
///
/// Every failure is turned into a response; this never errors.
pub async fn handle<W>(
    webhooks: &Arc<W>,
    request: InboundRequest,
    options: &AdapterOptions,
) -> GatewayResponse
where
    W: VerifyAndReceive + ?Sized,
{
    let identity = match validate(&request) {
        Ok(identity) => identity,
        Err(err) => return GatewayResponse::from(&err),
    };

    options.logger.debug(&format!(
        "{} event received (id: {})",
        identity.event_name, identity.delivery_id
    ));

    let event = EmitterEvent {
        id: identity.delivery_id,
        name: identity.event_name,
        payload: request.into_body().unwrap_or_default(),
        signature: identity.signature,
    };

    let outcome = race_verification(Arc::clone(webhooks), event, VERIFY_TIMEOUT).await;

    if let Outcome::VerificationFailure(error) = &outcome {
        options.logger.error(&failure_message(error), error);
    }

    outcome.into_response()
}

/// Run verification on its own task and wait for it or the deadline.
///
/// A deadline that elapses at the same instant as verification wins.
pub async fn race_verification<W>(
    webhooks: Arc<W>,
    event: EmitterEvent,
    deadline: Duration,
) -> Outcome
where
    W: VerifyAndReceive + ?Sized,
{
    let verification = tokio::spawn(async move { webhooks.verify_and_receive(event).await });

    tokio::select! {
        biased;

        _ = tokio::time::sleep(deadline) => Outcome::Timeout,
        joined = verification => match joined {
            Ok(Ok(())) => Outcome::Success,
            Ok(Err(error)) => Outcome::VerificationFailure(error),
            Err(join_error) => Outcome::VerificationFailure(AggregateError::single(
                HandlerError::new(join_error.to_string()).with_name("JoinError"),
            )),
        },
    }
}
