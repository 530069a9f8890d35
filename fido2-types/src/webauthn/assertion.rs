//! Types used for public key authentication

use serde::{Deserialize, Serialize};
use typeshare::typeshare;

use crate::{
    utils::serde::{ignore_unknown, maybe_stringified},
    webauthn::{
        AuthenticatorAttachment, PlatformCredential, PublicKeyCredential,
        PublicKeyCredentialDescriptor, ServerCredentialDescriptor, UserVerificationRequirement,
    },
    Bytes, TransportBuffer,
};

/// The transport form of an assertion, ready to be submitted to the relying party for
/// verification.
#[typeshare]
pub type AuthenticatedPublicKeyCredential = PublicKeyCredential<AuthenticatorAssertionResponse>;

/// The assertion returned by the platform's credential-retrieval capability.
pub type PlatformAssertion = PlatformCredential<PlatformAssertionResponse>;

/// The body of an assertion options request, i.e. what the client asks the relying party for
/// before an authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct AssertionOptionsRequest {
    /// The username of the account authenticating.
    pub username: String,

    /// The user verification requirement.
    pub user_verification: UserVerificationRequirement,

    /// The attachment of the authenticator expected to hold the credential.
    pub authenticator_selection: AssertionSelectionCriteria,
}

impl AssertionOptionsRequest {
    /// Create a request preferring user verification on a platform authenticator.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            user_verification: UserVerificationRequirement::Preferred,
            authenticator_selection: AssertionSelectionCriteria {
                authenticator_attachment: Some(AuthenticatorAttachment::Platform),
            },
        }
    }

    /// Set the user verification requirement.
    pub fn user_verification(mut self, requirement: UserVerificationRequirement) -> Self {
        self.user_verification = requirement;
        self
    }

    /// Set the authenticator attachment.
    pub fn authenticator_attachment(mut self, attachment: AuthenticatorAttachment) -> Self {
        self.authenticator_selection.authenticator_attachment = Some(attachment);
        self
    }
}

/// Authenticator requirements of an assertion request.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct AssertionSelectionCriteria {
    /// The attachment of the authenticator expected to hold the credential.
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "ignore_unknown",
        default
    )]
    pub authenticator_attachment: Option<AuthenticatorAttachment>,
}

/// The assertion options issued by the relying party. Binary members are still in transport form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct AssertionOptions {
    /// The username the options were issued for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// The user verification requirement. Unknown values fall back to the default.
    #[serde(default, deserialize_with = "ignore_unknown")]
    pub user_verification: UserVerificationRequirement,

    /// The attachment of the authenticator expected to hold the credential.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authenticator_selection: Option<AssertionSelectionCriteria>,

    /// The challenge the authenticator signs, `base64url` encoded.
    pub challenge: TransportBuffer,

    /// The RP ID claimed by the relying party.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rp_id: Option<String>,

    /// How long, in milliseconds, the relying party is willing to wait for the ceremony.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "maybe_stringified"
    )]
    pub timeout: Option<u32>,

    /// The credentials registered for the account, most preferred first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_credentials: Option<Vec<ServerCredentialDescriptor>>,
}

/// This is the expected input to [`navigator.credentials.get`] when wanting to authenticate using a
/// webauthn credential.
///
/// <https://w3c.github.io/webauthn/#sctn-credentialrequestoptions-extension>
///
/// [`navigator.credentials.get`]: https://developer.mozilla.org/en-US/docs/Web/API/CredentialsContainer/get
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct CredentialRequestOptions {
    /// The key defining that this is a request for a webauthn credential.
    pub public_key: PublicKeyCredentialRequestOptions,
}

/// This type supplies `get()` requests with the data it needs to generate an assertion.
///
/// <https://w3c.github.io/webauthn/#dictdef-publickeycredentialrequestoptions>
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct PublicKeyCredentialRequestOptions {
    /// The challenge the authenticator signs.
    pub challenge: Bytes,

    /// A hint, in milliseconds, of how long the relying party is willing to wait.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,

    /// The RP ID claimed by the relying party.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rp_id: Option<String>,

    /// The credentials eligible for this ceremony.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_credentials: Option<Vec<PublicKeyCredentialDescriptor>>,

    /// The Relying Party's requirements regarding user verification for the `get()` operation.
    pub user_verification: UserVerificationRequirement,
}

/// The authenticator's response to an assertion request, as handed back by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct PlatformAssertionResponse {
    /// The authenticator data returned by the authenticator.
    pub authenticator_data: Bytes,

    /// The JSON serialization of the client data passed to the authenticator.
    #[serde(rename = "clientDataJSON")]
    pub client_data_json: Bytes,

    /// The raw signature returned from the authenticator.
    pub signature: Bytes,

    /// The user handle returned from the authenticator, or `None` if the authenticator did not
    /// return one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_handle: Option<Bytes>,
}

/// The authenticator's response to an assertion request, in transport form.
///
/// <https://w3c.github.io/webauthn/#iface-authenticatorassertionresponse>
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct AuthenticatorAssertionResponse {
    /// The authenticator data returned by the authenticator.
    pub authenticator_data: TransportBuffer,

    /// The JSON serialization of the client data passed to the authenticator.
    #[serde(rename = "clientDataJSON")]
    pub client_data_json: TransportBuffer,

    /// The raw signature returned from the authenticator.
    pub signature: TransportBuffer,

    /// The user handle returned from the authenticator. Empty when the authenticator did not
    /// return one.
    pub user_handle: TransportBuffer,
}

impl From<&PlatformAssertionResponse> for AuthenticatorAssertionResponse {
    fn from(response: &PlatformAssertionResponse) -> Self {
        Self {
            authenticator_data: TransportBuffer::from(&response.authenticator_data),
            client_data_json: TransportBuffer::from(&response.client_data_json),
            signature: TransportBuffer::from(&response.signature),
            user_handle: response
                .user_handle
                .as_ref()
                .map(TransportBuffer::from)
                .unwrap_or_default(),
        }
    }
}
