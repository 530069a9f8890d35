//! Access to the relying party, through the proxy that fronts it.

use fido2_types::webauthn::{
    AssertionOptions, AssertionOptionsRequest, AttestationOptions, AttestationOptionsRequest,
    AuthenticatedPublicKeyCredential, CreatedPublicKeyCredential, VerificationResult,
};

use crate::WebauthnError;

#[cfg(feature = "reqwest")]
mod reqwest_client;

#[cfg(feature = "reqwest")]
pub use reqwest_client::ProxyClient;


/// The four relying party operations a pair of ceremonies is made of.
///
/// Failures reported by the relying party surface as [`WebauthnError::Upstream`] with the
/// relying party's error text unchanged.
#[cfg_attr(any(test, feature = "testable"), mockall::automock)]
#[async_trait::async_trait]
pub trait RelyingPartyApi: Send + Sync {
    /// Request the options for registering a new credential.
    async fn attestation_options(
        &self,
        request: AttestationOptionsRequest,
    ) -> Result<AttestationOptions, WebauthnError>;

    /// Submit a newly created credential for verification.
    async fn attestation_result(
        &self,
        credential: CreatedPublicKeyCredential,
    ) -> Result<VerificationResult, WebauthnError>;

    /// Request the options for authenticating with an existing credential.
    async fn assertion_options(
        &self,
        request: AssertionOptionsRequest,
    ) -> Result<AssertionOptions, WebauthnError>;

    /// Submit an assertion for verification.
    async fn assertion_result(
        &self,
        credential: AuthenticatedPublicKeyCredential,
    ) -> Result<VerificationResult, WebauthnError>;
}
