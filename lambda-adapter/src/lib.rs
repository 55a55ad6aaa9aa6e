//! Hookgate - GitHub webhook gateway for serverless HTTP functions.
//!
//! This library provides shared modules for the two Hookgate binaries:
//! - `hookgate-lambda`: Serverless function driven by `lambda_runtime`
//! - `hookgate-web`: Plain HTTP server exposing the same contract
//!
//! ## Architecture
//!
//! ```text
//! Lambda / HTTP → gateway (validate, race deadline) → webhooks (verify, dispatch) → handlers
//! ```

pub mod config;
pub mod gateway;
pub mod logging;
pub mod runtime;
pub mod web;
pub mod webhooks;

// Re-export commonly used types
pub use config::Config;
pub use gateway::{
    handle, handle_event, AdapterOptions, GatewayEvent, GatewayResponse, InboundRequest, Outcome,
    VERIFY_TIMEOUT,
};
pub use logging::{Logger, NoopLogger, TracingLogger};
pub use web::AppState;
pub use webhooks::{AggregateError, EmitterEvent, HandlerError, VerifyAndReceive, Webhooks};
