use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use fido2_types::api::Endpoint;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::{ProxyError, ProxyResult},
    upstream::Upstream,
};

type Body = Result<Json<Value>, JsonRejection>;

pub(crate) async fn attestation_options(
    State(upstream): State<Arc<Upstream>>,
    body: Body,
) -> ProxyResult<Json<Value>> {
    relay(&upstream, Endpoint::AttestationOptions, body).await
}

pub(crate) async fn attestation_result(
    State(upstream): State<Arc<Upstream>>,
    body: Body,
) -> ProxyResult<Json<Value>> {
    relay(&upstream, Endpoint::AttestationResult, body).await
}

pub(crate) async fn assertion_options(
    State(upstream): State<Arc<Upstream>>,
    body: Body,
) -> ProxyResult<Json<Value>> {
    relay(&upstream, Endpoint::AssertionOptions, body).await
}

pub(crate) async fn assertion_result(
    State(upstream): State<Arc<Upstream>>,
    body: Body,
) -> ProxyResult<Json<Value>> {
    relay(&upstream, Endpoint::AssertionResult, body).await
}

#[derive(Debug, Deserialize)]
pub(crate) struct DevicesQuery {
    username: Option<String>,
}

pub(crate) async fn registered_devices(
    State(upstream): State<Arc<Upstream>>,
    Query(query): Query<DevicesQuery>,
) -> ProxyResult<Json<Value>> {
    let username = query
        .username
        .filter(|username| !username.is_empty())
        .ok_or_else(|| ProxyError::BadRequest("missing username".into()))?;
    upstream.registered_devices(&username).await.map(Json)
}

pub(crate) async fn deregister_device(
    State(upstream): State<Arc<Upstream>>,
    Path(key_id): Path<String>,
) -> ProxyResult<Json<Value>> {
    if key_id.is_empty() {
        return Err(ProxyError::BadRequest("missing key id".into()));
    }
    upstream.deregister_device(&key_id).await.map(Json)
}

pub(crate) fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
    }))
}

async fn relay(upstream: &Upstream, endpoint: Endpoint, body: Body) -> ProxyResult<Json<Value>> {
    let Json(body) = body.map_err(|rejection| ProxyError::BadRequest(rejection.body_text()))?;
    upstream.forward(endpoint, &body).await.map(Json)
}
