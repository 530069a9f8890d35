//! The relying party behind the proxy.

use axum::http::StatusCode;
use fido2_types::api::{Endpoint, ErrorResponse, UPSTREAM_DEVICES_PATH};
use reqwest::{
    header::{ACCEPT, AUTHORIZATION},
    Client, RequestBuilder,
};
use serde_json::{Map, Value};
use url::Url;

use crate::{
    config::Config,
    error::{ProxyError, ProxyResult},
};

/// Forwards requests to the relying party, attaching the access token.
#[derive(Debug, Clone)]
pub struct Upstream {
    http: Client,
    base_url: Url,
    authorization: String,
}

impl Upstream {
    /// Create an upstream for the relying party at `base_url`.
    pub fn new(base_url: Url, access_token: &str) -> Self {
        Self::with_client(Client::new(), base_url, access_token)
    }

    /// Create an upstream reusing an existing HTTP client.
    pub fn with_client(http: Client, base_url: Url, access_token: &str) -> Self {
        Self {
            http,
            base_url,
            authorization: authorization_value(access_token),
        }
    }

    /// Create an upstream from the proxy configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.url.clone(), &config.access_token)
    }

    /// The relying party's base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Forward a JSON body to the relying party operation behind `endpoint` and return its
    /// reply.
    pub async fn forward(&self, endpoint: Endpoint, body: &Value) -> ProxyResult<Value> {
        let url = self.url(endpoint.upstream_path())?;
        tracing::debug!("forwarding {endpoint} to {url}");

        self.send(self.http.post(url).json(body)).await
    }

    /// List the authenticators registered for a user.
    pub async fn registered_devices(&self, username: &str) -> ProxyResult<Value> {
        let mut url = self.url(UPSTREAM_DEVICES_PATH)?;
        url.query_pairs_mut().append_pair("username", username);
        tracing::debug!("listing devices of {username}");

        self.send(self.http.get(url)).await
    }

    /// Remove the registration of the device with the given key ID.
    pub async fn deregister_device(&self, key_id: &str) -> ProxyResult<Value> {
        let mut url = self.url(UPSTREAM_DEVICES_PATH)?;
        url.query_pairs_mut().append_pair("keyId", key_id);
        tracing::debug!("deregistering device {key_id}");

        self.send(self.http.delete(url)).await
    }

    async fn send(&self, request: RequestBuilder) -> ProxyResult<Value> {
        let response = request
            .header(AUTHORIZATION, &self.authorization)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        normalize(status, &body)
    }

    fn url(&self, path: &str) -> ProxyResult<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}{path}"))?)
    }
}

/// The `Authorization` value for an access token. Tokens that already name a scheme, such as
/// `Bearer abc` or `Basic abc`, are used as they are; bare tokens get the `Bearer` scheme.
pub fn authorization_value(access_token: &str) -> String {
    let token = access_token.trim();
    if token.contains(' ') {
        token.to_owned()
    } else {
        format!("Bearer {token}")
    }
}

/// Turn a relying party reply into either its JSON body or an error. Anything but `200 OK` is a
/// failure. An error member in the body wins over the status, so the relying party's own message
/// is relayed whenever it gave one.
pub(crate) fn normalize(status: StatusCode, body: &[u8]) -> ProxyResult<Value> {
    let reply = if body.iter().all(u8::is_ascii_whitespace) {
        Ok(Value::Object(Map::new()))
    } else {
        serde_json::from_slice::<Value>(body)
    };

    if let Some(error) = reply.as_ref().ok().and_then(ErrorResponse::from_reply) {
        return Err(ProxyError::Rejected(error.error_text));
    }

    if status != StatusCode::OK {
        return Err(ProxyError::Status(status));
    }

    reply.map_err(ProxyError::InvalidReply)
}
