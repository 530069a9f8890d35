//! The complete registration and authentication exchanges with a relying party.

use fido2_types::webauthn::{
    AssertionOptionsRequest, AttestationOptionsRequest, AuthenticatorAttachment,
    VerificationResult,
};

use crate::{Client, Platform, RelyingPartyApi, WebauthnError};

/// Runs both WebAuthn ceremonies end to end: fetch options from the relying party, let the
/// [`Client`] perform the credential operation, then submit the result for verification.
pub struct Ceremony<P, A> {
    client: Client<P>,
    api: A,
}

impl<P, A> Ceremony<P, A>
where
    P: Platform,
    A: RelyingPartyApi,
{
    /// Combine a client with the relying party it registers and authenticates against.
    pub fn new(client: Client<P>, api: A) -> Self {
        Self { client, api }
    }

    /// The client performing credential operations.
    pub fn client(&self) -> &Client<P> {
        &self.client
    }

    /// The relying party API.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Register a new credential for a user.
    pub async fn register(
        &self,
        request: AttestationOptionsRequest,
    ) -> Result<VerificationResult, WebauthnError> {
        let require_platform = request.authenticator_selection.authenticator_attachment
            == Some(AuthenticatorAttachment::Platform);
        self.advisory_capability_check(require_platform).await;

        let options = self.api.attestation_options(request).await?;
        let credential = self.client.create_credential(options).await?;
        let result = self.api.attestation_result(credential).await?;

        log::info!(
            "Registered a credential for {}",
            result.username.as_deref().unwrap_or("<unnamed user>")
        );
        Ok(result)
    }

    /// Authenticate a user with one of their registered credentials.
    pub async fn authenticate(
        &self,
        request: AssertionOptionsRequest,
    ) -> Result<VerificationResult, WebauthnError> {
        let require_platform = request.authenticator_selection.authenticator_attachment
            == Some(AuthenticatorAttachment::Platform);
        self.advisory_capability_check(require_platform).await;

        let options = self.api.assertion_options(request).await?;
        let assertion = self.client.create_assertion(options).await?;
        let result = self.api.assertion_result(assertion).await?;

        log::info!(
            "Authenticated {}",
            result.username.as_deref().unwrap_or("<unnamed user>")
        );
        Ok(result)
    }

    /// Surfaces missing capabilities early. The credential operation re-validates, so a failure
    /// here does not stop the ceremony.
    async fn advisory_capability_check(&self, require_platform_authenticator: bool) {
        if let Err(err) = self
            .client
            .is_fido2_available(require_platform_authenticator)
            .await
        {
            log::warn!("{}: {err}", err.name());
        }
    }
}
