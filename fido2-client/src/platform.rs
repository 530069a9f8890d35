use std::fmt;

use fido2_types::webauthn::{
    CredentialCreationOptions, CredentialRequestOptions, PlatformAssertion,
    PlatformCreatedCredential,
};
use serde::{Deserialize, Serialize};
use typeshare::typeshare;

#[cfg(doc)]
use crate::Client;

/// An error reported by the platform's WebAuthn implementation, carried unchanged so that no
/// diagnostic detail is lost on the way to the user.
#[typeshare]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformError {
    /// The platform's error name, e.g. `NotAllowedError` or `InvalidStateError`.
    pub name: String,
    /// The platform's error message.
    pub message: String,
    /// The platform's legacy numeric error code, if it provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i32>,
}

impl PlatformError {
    /// Create an error with the given name and message and no code.
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            code: None,
        }
    }

    /// Attach the platform's numeric error code.
    pub fn with_code(mut self, code: i32) -> Self {
        self.code = Some(code);
        self
    }

    /// The error browsers raise when the user dismisses the prompt or it times out.
    pub fn not_allowed() -> Self {
        Self::new(
            "NotAllowedError",
            "The operation either timed out or was not allowed.",
        )
        .with_code(0)
    }
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.message)
    }
}

impl std::error::Error for PlatformError {}

/// The platform's WebAuthn capability, consumed as an opaque collaborator by the [`Client`].
///
/// In a browser this is `window.PublicKeyCredential` together with `navigator.credentials`.
/// `create` and `get` may wait for an unbounded, user controlled time (biometric prompt, PIN
/// entry, security key tap). A user cancelling the prompt must resolve them with an error, such
/// as [`PlatformError::not_allowed`], never leave them pending.
#[cfg_attr(any(test, feature = "testable"), mockall::automock)]
#[async_trait::async_trait]
pub trait Platform: Send + Sync {
    /// Whether the platform exposes the public-key credential API at all.
    fn has_public_key_credential(&self) -> bool;

    /// Whether a user-verifying platform authenticator (as opposed to a roaming one) is available.
    async fn is_user_verifying_platform_authenticator_available(
        &self,
    ) -> Result<bool, PlatformError>;

    /// Create a new credential, `navigator.credentials.create()`.
    async fn create(
        &self,
        request: CredentialCreationOptions,
    ) -> Result<PlatformCreatedCredential, PlatformError>;

    /// Produce an assertion with an existing credential, `navigator.credentials.get()`.
    async fn get(&self, request: CredentialRequestOptions)
        -> Result<PlatformAssertion, PlatformError>;
}

#[cfg(any(test, feature = "testable"))]
impl MockPlatform {
    /// A platform without the public-key credential API.
    pub fn without_webauthn() -> Self {
        let mut platform = MockPlatform::new();
        platform
            .expect_has_public_key_credential()
            .return_const(false);
        platform
    }

    /// A platform with the public-key credential API but no platform authenticator.
    pub fn without_platform_authenticator() -> Self {
        let mut platform = MockPlatform::new();
        platform
            .expect_has_public_key_credential()
            .return_const(true);
        platform
            .expect_is_user_verifying_platform_authenticator_available()
            .returning(|| Ok(false));
        platform
    }

    /// A platform with the public-key credential API and a platform authenticator. Expectations
    /// for `create` and `get` are left to the caller.
    pub fn fully_supported() -> Self {
        let mut platform = MockPlatform::new();
        platform
            .expect_has_public_key_credential()
            .return_const(true);
        platform
            .expect_is_user_verifying_platform_authenticator_available()
            .returning(|| Ok(true));
        platform
    }
}
