//! # FIDO2 Proxy
//!
//! A pass-through HTTP proxy in front of the relying party's FIDO2 API. The browser talks to the
//! proxy, which attaches the access token and forwards every request unchanged, so the token
//! never reaches the browser.
//!
//! | Route                       | Relying party operation                              |
//! |-----------------------------|------------------------------------------------------|
//! | `POST /attestation/options` | `POST /rp/api/versioned/fido2/attestation/options`   |
//! | `POST /attestation/result`  | `POST /rp/api/versioned/fido2/attestation/result`    |
//! | `POST /assertion/options`   | `POST /rp/api/versioned/fido2/assertion/options`     |
//! | `POST /assertion/result`    | `POST /rp/api/versioned/fido2/assertion/result`      |
//! | `GET /devices?username=..`  | `GET /rp/api/versioned/fido2/user?username=..`       |
//! | `DELETE /devices/{keyId}`   | `DELETE /rp/api/versioned/fido2/user?keyId={keyId}`  |
//! | `GET /health`               |                                                      |
//!
//! Replies are relayed as they are. Any failure, whether reported by the relying party or met on
//! the way, becomes `400 {"errorText": <message>}`.

use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};
use fido2_types::api::{Endpoint, DEVICES_PATH};
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
mod handlers;
pub mod upstream;

pub use self::{config::Config, error::ProxyError, upstream::Upstream};

/// Build the proxy's routes around the given upstream.
pub fn router(upstream: Upstream) -> Router {
    Router::new()
        .route("/health", get(|| async { handlers::health() }))
        .route(
            Endpoint::AttestationOptions.path(),
            post(handlers::attestation_options),
        )
        .route(
            Endpoint::AttestationResult.path(),
            post(handlers::attestation_result),
        )
        .route(
            Endpoint::AssertionOptions.path(),
            post(handlers::assertion_options),
        )
        .route(
            Endpoint::AssertionResult.path(),
            post(handlers::assertion_result),
        )
        .route(DEVICES_PATH, get(handlers::registered_devices))
        .route("/devices/{key_id}", delete(handlers::deregister_device))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(upstream))
}
