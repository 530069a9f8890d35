use fido2_types::{
    api::{Endpoint, ErrorResponse, DEVICES_PATH},
    webauthn::{
        AssertionOptions, AssertionOptionsRequest, AttestationOptions, AttestationOptionsRequest,
        AuthenticatedPublicKeyCredential, CreatedPublicKeyCredential, VerificationResult,
    },
};
use reqwest::{header::ACCEPT, Client, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use url::Url;

use crate::{RelyingPartyApi, WebauthnError};

/// A [`RelyingPartyApi`] speaking JSON over HTTP to the relying party proxy.
#[derive(Debug, Clone)]
pub struct ProxyClient {
    http: Client,
    base_url: Url,
}

impl ProxyClient {
    /// Create a client for the proxy served at `base_url`, e.g. `http://127.0.0.1:3000`.
    pub fn new(base_url: Url) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Create a client reusing an existing HTTP client.
    pub fn with_client(http: Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The base URL requests are sent to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// List the authenticators registered for a user, as reported by the relying party. Each
    /// entry carries the `keyId` accepted by [`ProxyClient::deregister_device`].
    pub async fn registered_devices(
        &self,
        username: &str,
    ) -> Result<serde_json::Value, WebauthnError> {
        let mut url = self.url(DEVICES_PATH)?;
        url.query_pairs_mut().append_pair("username", username);

        let response = self
            .http
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(upstream_failure)?;

        read_reply(response, DEVICES_PATH).await
    }

    /// Remove the registration of the device with the given key ID, returning the relying
    /// party's reply.
    pub async fn deregister_device(
        &self,
        key_id: &str,
    ) -> Result<serde_json::Value, WebauthnError> {
        let mut url = self.url(DEVICES_PATH)?;
        url.path_segments_mut()
            .map_err(|()| upstream_failure("proxy URL cannot be a base"))?
            .push(key_id);

        let response = self
            .http
            .delete(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(upstream_failure)?;

        read_reply(response, DEVICES_PATH).await
    }

    async fn post<B, R>(&self, endpoint: Endpoint, body: &B) -> Result<R, WebauthnError>
    where
        B: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .http
            .post(self.url(endpoint.path())?)
            .header(ACCEPT, "application/json")
            .json(body)
            .send()
            .await
            .map_err(upstream_failure)?;

        read_reply(response, endpoint.path()).await
    }

    fn url(&self, path: &str) -> Result<Url, WebauthnError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}{path}")).map_err(upstream_failure)
    }
}

async fn read_reply<R: DeserializeOwned>(
    response: reqwest::Response,
    path: &str,
) -> Result<R, WebauthnError> {
    let status = response.status();
    let body = response.bytes().await.map_err(upstream_failure)?;

    if status != StatusCode::OK {
        let error_text = serde_json::from_slice::<serde_json::Value>(&body)
            .ok()
            .and_then(|reply| ErrorResponse::from_reply(&reply))
            .map(|reply| reply.error_text)
            .unwrap_or_else(|| format!("{path} failed with status {status}"));
        log::error!("Relying party rejected {path}: {error_text}");
        return Err(WebauthnError::Upstream { error_text });
    }

    serde_json::from_slice(&body).map_err(upstream_failure)
}

fn upstream_failure(err: impl ToString) -> WebauthnError {
    WebauthnError::Upstream {
        error_text: err.to_string(),
    }
}

#[async_trait::async_trait]
impl RelyingPartyApi for ProxyClient {
    async fn attestation_options(
        &self,
        request: AttestationOptionsRequest,
    ) -> Result<AttestationOptions, WebauthnError> {
        self.post(Endpoint::AttestationOptions, &request).await
    }

    async fn attestation_result(
        &self,
        credential: CreatedPublicKeyCredential,
    ) -> Result<VerificationResult, WebauthnError> {
        self.post(Endpoint::AttestationResult, &credential).await
    }

    async fn assertion_options(
        &self,
        request: AssertionOptionsRequest,
    ) -> Result<AssertionOptions, WebauthnError> {
        self.post(Endpoint::AssertionOptions, &request).await
    }

    async fn assertion_result(
        &self,
        credential: AuthenticatedPublicKeyCredential,
    ) -> Result<VerificationResult, WebauthnError> {
        self.post(Endpoint::AssertionResult, &credential).await
    }
}
