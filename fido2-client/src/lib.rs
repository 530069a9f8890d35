//! # FIDO2 Client
//!
//! This crate defines a [`Client`] type which drives the browser side of the two WebAuthn
//! ceremonies, registration and authentication. The [`Client`] uses a [`Platform`] to perform the
//! actual credential operations, while the Client itself marshals data between the `base64url`
//! transport form the relying party speaks and the raw bytes the platform consumes.
//!
//! A [`Ceremony`] combines a [`Client`] with a [`RelyingPartyApi`] to run a complete exchange
//! against the relying party proxy. With the default `reqwest` feature, [`ProxyClient`] provides
//! that API over HTTP.
//!
//! [`ProxyClient`]: rp::ProxyClient
use fido2_types::{
    encoding::InvalidEncoding,
    webauthn::{
        AssertionOptions, AttestationOptions, AuthenticatedPublicKeyCredential,
        AuthenticatorAttachment, CreatedPublicKeyCredential, PublicKeyCredentialType,
    },
    TransportBuffer,
};
use typeshare::typeshare;

pub mod adapter;
mod availability;
mod ceremony;
mod platform;
pub mod rp;

pub use self::{
    availability::is_fido2_available,
    ceremony::Ceremony,
    platform::{Platform, PlatformError},
    rp::RelyingPartyApi,
};

#[cfg(any(test, feature = "testable"))]
pub use self::{platform::MockPlatform, rp::MockRelyingPartyApi};

#[cfg(test)]
mod tests;

#[typeshare]
#[derive(Debug, Clone, serde::Serialize, PartialEq, Eq, thiserror::Error)]
#[serde(tag = "type", content = "content")]
/// Errors produced by Webauthn Operations.
pub enum WebauthnError {
    /// A binary member of the relying party's options was not valid `base64url`.
    #[error(transparent)]
    InvalidEncoding(#[from] InvalidEncoding),
    /// The platform does not expose the public-key credential API.
    #[error("Cannot continue since WebAuthn is not available on this browser and client")]
    WebAuthnUnavailable,
    /// A platform authenticator was requested but none is available.
    #[error(
        "Cannot continue since WebAuthn Platform Authentication is not available on this browser and client"
    )]
    WebAuthnPlatformUnavailable,
    /// The platform rejected or failed the operation, carrying its error unchanged.
    #[error("{0}")]
    PlatformOperation(PlatformError),
    /// The relying party (or the proxy in front of it) reported a failure.
    #[error("{error_text}")]
    Upstream {
        /// The error text exactly as reported.
        error_text: String,
    },
}

impl WebauthnError {
    /// The name under which the error is presented to users, the platform's own error name for
    /// platform failures.
    pub fn name(&self) -> &str {
        match self {
            WebauthnError::InvalidEncoding(InvalidEncoding::InvalidLength) => "InvalidLengthError",
            WebauthnError::InvalidEncoding(InvalidEncoding::InvalidSymbol { .. }) => {
                "InvalidCharacterError"
            }
            WebauthnError::WebAuthnUnavailable => "WebAuthnUnavailable",
            WebauthnError::WebAuthnPlatformUnavailable => "WebAuthnPlatformUnavailable",
            WebauthnError::PlatformOperation(err) => &err.name,
            WebauthnError::Upstream { .. } => "UpstreamError",
        }
    }
}

/// The stages a credential operation of the [`Client`] moves through.
///
/// Both operations start at [`Idle`](OperationState::Idle) and end in exactly one of
/// [`Succeeded`](OperationState::Succeeded) or [`Failed`](OperationState::Failed). Every stage may
/// transition to `Failed`.
#[typeshare]
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationState {
    /// No operation has started.
    Idle,
    /// Checking that the platform exposes WebAuthn.
    CheckingCapability,
    /// Verifying attachment requirements and converting the relying party's options.
    BuildingRequest,
    /// Waiting on the platform, which may take as long as the user does.
    AwaitingPlatform,
    /// Converting the platform's result into transport form.
    EncodingResult,
    /// The operation produced a credential.
    Succeeded,
    /// The operation failed.
    Failed,
}

type StateListener = Box<dyn Fn(OperationState) + Send + Sync>;

/// Wraps the platform's WebAuthn capability so that it accepts and returns the JSON-safe
/// representations exchanged with a relying party.
pub struct Client<P> {
    platform: P,
    remove_exclude_credentials: bool,
    state_listener: Option<StateListener>,
}

impl<P: Platform> Client<P> {
    /// Create a `Client` on top of the given platform.
    ///
    /// Exclusion lists sent by the relying party are removed by default, see
    /// [`Client::remove_exclude_credentials`].
    pub fn new(platform: P) -> Self {
        Self {
            platform,
            remove_exclude_credentials: true,
            state_listener: None,
        }
    }

    /// Whether an exclusion list sent by the relying party is replaced with an empty one before
    /// credential creation, allowing an authenticator that already holds a credential for the user
    /// to be registered again.
    pub fn remove_exclude_credentials(mut self, remove: bool) -> Self {
        self.remove_exclude_credentials = remove;
        self
    }

    /// Observe the [`OperationState`] transitions of every operation, e.g. to drive a busy
    /// indicator.
    pub fn with_state_listener(
        mut self,
        listener: impl Fn(OperationState) + Send + Sync + 'static,
    ) -> Self {
        self.state_listener = Some(Box::new(listener));
        self
    }

    /// Access the platform this client operates on.
    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Check whether the platform supports WebAuthn, and when `require_platform_authenticator` is
    /// set, whether it has a user-verifying platform authenticator.
    pub async fn is_fido2_available(
        &self,
        require_platform_authenticator: bool,
    ) -> Result<bool, WebauthnError> {
        is_fido2_available(&self.platform, require_platform_authenticator).await
    }

    /// Create a new credential from the relying party's attestation options.
    ///
    /// Returns the credential in the transport form expected by the relying party's result
    /// endpoint. A platform authenticator must be available if the options request one.
    pub async fn create_credential(
        &self,
        options: AttestationOptions,
    ) -> Result<CreatedPublicKeyCredential, WebauthnError> {
        let result = self.try_create_credential(options).await;
        self.finish(&result);
        result
    }

    /// Produce an assertion from the relying party's assertion options.
    ///
    /// Returns the assertion in the transport form expected by the relying party's result
    /// endpoint. Unlike [`Client::create_credential`], the attachment is left to the platform.
    pub async fn create_assertion(
        &self,
        options: AssertionOptions,
    ) -> Result<AuthenticatedPublicKeyCredential, WebauthnError> {
        let result = self.try_create_assertion(options).await;
        self.finish(&result);
        result
    }

    async fn try_create_credential(
        &self,
        options: AttestationOptions,
    ) -> Result<CreatedPublicKeyCredential, WebauthnError> {
        self.transition(OperationState::CheckingCapability);
        is_fido2_available(&self.platform, false).await?;

        self.transition(OperationState::BuildingRequest);
        if options.authenticator_attachment() == Some(AuthenticatorAttachment::Platform) {
            availability::ensure_platform_authenticator(&self.platform).await?;
        }
        let request =
            adapter::adapt_attestation_options(options, self.remove_exclude_credentials)?;

        self.transition(OperationState::AwaitingPlatform);
        let credential = self
            .platform
            .create(request)
            .await
            .map_err(|err| platform_failure("creating credential", err))?;

        self.transition(OperationState::EncodingResult);
        Ok(CreatedPublicKeyCredential {
            raw_id: TransportBuffer::from(&credential.raw_id),
            id: credential.id,
            ty: PublicKeyCredentialType::PublicKey,
            response: (&credential.response).into(),
        })
    }

    async fn try_create_assertion(
        &self,
        options: AssertionOptions,
    ) -> Result<AuthenticatedPublicKeyCredential, WebauthnError> {
        self.transition(OperationState::CheckingCapability);
        is_fido2_available(&self.platform, false).await?;

        self.transition(OperationState::BuildingRequest);
        let request = adapter::adapt_assertion_options(options)?;

        self.transition(OperationState::AwaitingPlatform);
        let assertion = self
            .platform
            .get(request)
            .await
            .map_err(|err| platform_failure("getting assertion", err))?;

        self.transition(OperationState::EncodingResult);
        Ok(AuthenticatedPublicKeyCredential {
            raw_id: TransportBuffer::from(&assertion.raw_id),
            id: assertion.id,
            ty: PublicKeyCredentialType::PublicKey,
            response: (&assertion.response).into(),
        })
    }

    fn finish<T>(&self, result: &Result<T, WebauthnError>) {
        self.transition(if result.is_ok() {
            OperationState::Succeeded
        } else {
            OperationState::Failed
        });
    }

    fn transition(&self, state: OperationState) {
        log::debug!("credential operation is now {state:?}");
        if let Some(listener) = &self.state_listener {
            listener(state);
        }
    }
}

fn platform_failure(operation: &str, err: PlatformError) -> WebauthnError {
    log::error!(
        "Error {operation} with code: {:?} and message: {} and name: {}",
        err.code,
        err.message,
        err.name
    );
    WebauthnError::PlatformOperation(err)
}
