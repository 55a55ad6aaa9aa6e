//! Serverless entry point.
//!
//! `lambda_runtime` owns the runtime API conversation (polling, request ids,
//! error reporting). Each invocation carries one API Gateway proxy event and
//! is answered with the proxy response from the gateway adapter.

use std::sync::Arc;

use lambda_runtime::{service_fn, Error, LambdaEvent};
use tracing::info;

use crate::gateway::{handle_event, AdapterOptions, GatewayEvent, GatewayResponse};
use crate::webhooks::VerifyAndReceive;

/// Serve invocations until the runtime shuts the process down.
pub async fn run<W>(webhooks: Arc<W>, options: AdapterOptions) -> Result<(), Error>
where
    W: VerifyAndReceive + ?Sized,
{
    lambda_runtime::run(service_fn(move |event: LambdaEvent<GatewayEvent>| {
        let webhooks = Arc::clone(&webhooks);
        let options = options.clone();
        async move { Ok::<_, Error>(invoke(&webhooks, event, &options).await) }
    }))
    .await
}

/// Answer a single invocation.
pub async fn invoke<W>(
    webhooks: &Arc<W>,
    event: LambdaEvent<GatewayEvent>,
    options: &AdapterOptions,
) -> GatewayResponse
where
    W: VerifyAndReceive + ?Sized,
{
    let LambdaEvent { payload, context } = event;

    info!(
        request_id = %context.request_id,
        method = payload.method(),
        "lambda_invocation_received"
    );

    let response = handle_event(webhooks, payload, options).await;

    info!(
        request_id = %context.request_id,
        status_code = response.status_code,
        "lambda_invocation_completed"
    );

    response
}
