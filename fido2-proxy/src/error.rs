//! Failures while relaying a request, all reported to the browser as `400 {"errorText": ...}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use fido2_types::api::ErrorResponse;

/// A failed relay.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// The relying party reported an error in its reply. The text is relayed verbatim.
    #[error("{0}")]
    Rejected(String),
    /// The relying party answered with a status other than `200 OK` and no error text.
    #[error("relying party responded with status {0}")]
    Status(StatusCode),
    /// The relying party's reply is not JSON.
    #[error("relying party reply is not valid JSON: {0}")]
    InvalidReply(serde_json::Error),
    /// The relying party could not be reached.
    #[error("relying party is unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    /// The upstream URL for the request could not be built.
    #[error("invalid relying party url: {0}")]
    Url(#[from] url::ParseError),
    /// The browser's request was malformed.
    #[error("{0}")]
    BadRequest(String),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        match &self {
            ProxyError::Rejected(text) => tracing::info!("relying party rejected request: {text}"),
            ProxyError::BadRequest(text) => tracing::info!("malformed request: {text}"),
            other => tracing::error!("relay failed: {other}"),
        }

        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(self.to_string())),
        )
            .into_response()
    }
}

/// Result of a relay.
pub type ProxyResult<T> = Result<T, ProxyError>;
