//! Types specific to public key credential creation
use serde::{Deserialize, Serialize};
use typeshare::typeshare;

use crate::{
    utils::serde::{ignore_unknown, maybe_stringified},
    webauthn::{
        AuthenticatorAttachment, PlatformCredential, PublicKeyCredential,
        PublicKeyCredentialDescriptor, PublicKeyCredentialType, ServerCredentialDescriptor,
        UserVerificationRequirement,
    },
    Bytes, TransportBuffer,
};


/// The transport form of a freshly created credential, ready to be submitted to the relying party
/// for verification.
#[typeshare]
pub type CreatedPublicKeyCredential = PublicKeyCredential<AuthenticatorAttestationResponse>;

/// The credential returned by the platform's credential-creation capability.
pub type PlatformCreatedCredential = PlatformCredential<PlatformAttestationResponse>;

/// The body of an attestation options request, i.e. what the client asks the relying party for
/// before a registration.
///
/// ```
/// # use fido2_types::webauthn::*;
/// let request = AttestationOptionsRequest::new("alice", "Alice")
///     .authenticator_attachment(AuthenticatorAttachment::CrossPlatform)
///     .attestation(AttestationConveyancePreference::None);
/// assert_eq!(
///     request.authenticator_selection.user_verification,
///     UserVerificationRequirement::Required
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct AttestationOptionsRequest {
    /// The username of the account being registered.
    pub username: String,

    /// The human palatable name of the account being registered.
    pub display_name: String,

    /// Requirements on the authenticator that will create the credential.
    pub authenticator_selection: AuthenticatorSelectionCriteria,

    /// The attestation conveyance preference.
    pub attestation: AttestationConveyancePreference,
}

impl AttestationOptionsRequest {
    /// Create a request for a user verified, non-resident credential on a platform authenticator,
    /// asking for direct attestation.
    pub fn new(username: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            display_name: display_name.into(),
            authenticator_selection: AuthenticatorSelectionCriteria {
                authenticator_attachment: Some(AuthenticatorAttachment::Platform),
                resident_key: None,
                require_resident_key: false,
                user_verification: UserVerificationRequirement::Required,
            },
            attestation: AttestationConveyancePreference::Direct,
        }
    }

    /// Set the authenticator attachment.
    pub fn authenticator_attachment(mut self, attachment: AuthenticatorAttachment) -> Self {
        self.authenticator_selection.authenticator_attachment = Some(attachment);
        self
    }

    /// Set the user verification requirement.
    pub fn user_verification(mut self, requirement: UserVerificationRequirement) -> Self {
        self.authenticator_selection.user_verification = requirement;
        self
    }

    /// Set whether a resident (discoverable) key is required.
    pub fn require_resident_key(mut self, required: bool) -> Self {
        self.authenticator_selection.require_resident_key = required;
        self
    }

    /// Set the attestation conveyance preference.
    pub fn attestation(mut self, preference: AttestationConveyancePreference) -> Self {
        self.attestation = preference;
        self
    }
}

/// The attestation options issued by the relying party: the request echoed back, enriched with a
/// challenge, the user handle, the relying party entity and so on. Binary members are still in
/// transport form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct AttestationOptions {
    /// The username the options were issued for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// The display name the options were issued for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// The attestation conveyance preference. Unknown values fall back to the default.
    #[serde(default, deserialize_with = "ignore_unknown")]
    pub attestation: AttestationConveyancePreference,

    /// Requirements on the authenticator that will create the credential.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authenticator_selection: Option<AuthenticatorSelectionCriteria>,

    /// The challenge the authenticator signs, `base64url` encoded.
    pub challenge: TransportBuffer,

    /// The account the credential is created for.
    pub user: ServerUserEntity,

    /// The relying party the credential is scoped to.
    pub rp: PublicKeyCredentialRpEntity,

    /// The key types and signature algorithms the relying party supports, most preferred first.
    #[serde(default)]
    pub pub_key_cred_params: Vec<PublicKeyCredentialParameters>,

    /// How long, in milliseconds, the relying party is willing to wait for the ceremony.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "maybe_stringified"
    )]
    pub timeout: Option<u32>,

    /// Credentials already registered for this account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_credentials: Option<Vec<ServerCredentialDescriptor>>,
}

impl AttestationOptions {
    /// The requested authenticator attachment, if any.
    pub fn authenticator_attachment(&self) -> Option<AuthenticatorAttachment> {
        self.authenticator_selection
            .as_ref()
            .and_then(|selection| selection.authenticator_attachment)
    }
}

/// The user account as described by the relying party, with its handle in transport form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct ServerUserEntity {
    /// The user handle, `base64url` encoded.
    pub id: TransportBuffer,

    /// A human palatable identifier for the user account.
    pub name: String,

    /// A human palatable name for the user account, intended only for display.
    pub display_name: String,
}

/// This is the expected input to [`navigator.credentials.create`] when wanting to create a webauthn
/// credential.
///
/// <https://w3c.github.io/webauthn/#sctn-credentialcreationoptions-extension>
///
/// [`navigator.credentials.create`]: https://developer.mozilla.org/en-US/docs/Web/API/CredentialsContainer/create
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct CredentialCreationOptions {
    /// The key defining that this is a request for a webauthn credential.
    pub public_key: PublicKeyCredentialCreationOptions,
}

/// This defines the platform request for creating a [`PublicKeyCredential`].
///
/// <https://w3c.github.io/webauthn/#dictdef-publickeycredentialcreationoptions>
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct PublicKeyCredentialCreationOptions {
    /// The attestation conveyance preference.
    pub attestation: AttestationConveyancePreference,

    /// Requirements on the authenticator that will create the credential.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authenticator_selection: Option<AuthenticatorSelectionCriteria>,

    /// Existing credentials the new credential must not be created next to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_credentials: Option<Vec<PublicKeyCredentialDescriptor>>,

    /// The relying party responsible for the request.
    pub rp: PublicKeyCredentialRpEntity,

    /// The user account performing the registration.
    pub user: PublicKeyCredentialUserEntity,

    /// The key types and signature algorithms the relying party supports.
    pub pub_key_cred_params: Vec<PublicKeyCredentialParameters>,

    /// A hint, in milliseconds, of how long the relying party is willing to wait.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,

    /// The challenge the authenticator signs.
    pub challenge: Bytes,
}

/// This type is used to supply additional Relying Party attributes when creating a new credential.
///
/// <https://w3c.github.io/webauthn/#dictdef-publickeycredentialrpentity>
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[typeshare]
pub struct PublicKeyCredentialRpEntity {
    /// A unique identifier for the [Relying Party] entity, which sets the [RP ID].
    ///
    /// If omitted, its value will be the requesting origin's effective domain.
    ///
    /// [Relying Party]: https://w3c.github.io/webauthn/#relying-party
    /// [RP ID]: https://w3c.github.io/webauthn/#rp-id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// A human palatable identifier for the Relying Party, intended only for display.
    pub name: String,
}

/// This type is used to supply additional user account attributes when creating a new credential.
///
/// <https://w3c.github.io/webauthn/#dictdef-publickeycredentialuserentity>
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct PublicKeyCredentialUserEntity {
    /// The user handle of the user account. A user handle is an opaque byte sequence with a maximum
    /// size of 64 bytes, and is not meant to be displayed to the user.
    pub id: Bytes,

    /// A human palatable identifier for the user account.
    pub name: String,

    /// A human palatable name for the user account, intended only for display.
    pub display_name: String,
}

/// This type is used to supply additional parameters when creating a new credential.
///
/// <https://w3c.github.io/webauthn/#dictdef-publickeycredentialparameters>
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[typeshare]
pub struct PublicKeyCredentialParameters {
    /// The type of credential to be created.
    #[serde(rename = "type", default, deserialize_with = "ignore_unknown")]
    pub ty: PublicKeyCredentialType,

    /// The [COSEAlgorithmIdentifier] of the signature algorithm, e.g. `-7` for ES256. Kept as a
    /// plain number so that algorithms unknown to this crate pass through unchanged.
    ///
    /// [COSEAlgorithmIdentifier]: https://w3c.github.io/webauthn/#typedefdef-cosealgorithmidentifier
    #[typeshare(serialized_as = "I54")] // because i64 fails for js
    pub alg: i64,
}

/// [Relying Parties] may use this type to specify their requirements regarding authenticator
/// attributes.
///
/// <https://w3c.github.io/webauthn/#dictdef-authenticatorselectioncriteria>
///
/// [Relying Parties]: https://w3c.github.io/webauthn/#webauthn-relying-party
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct AuthenticatorSelectionCriteria {
    /// If this member is present, eligible authenticators are filtered to be only those
    /// authenticators attached with the specified [`AuthenticatorAttachment`] modality. Unknown
    /// values are treated as if the member does not exist.
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "ignore_unknown",
        default
    )]
    pub authenticator_attachment: Option<AuthenticatorAttachment>,

    /// Specifies the extent to which the Relying Party desires to create a client-side
    /// discoverable credential.
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "ignore_unknown",
        default
    )]
    pub resident_key: Option<ResidentKeyRequirement>,

    /// Retained for backwards compatibility with WebAuthn Level 1.
    #[serde(default)]
    pub require_resident_key: bool,

    /// The Relying Party's requirements regarding user verification for the `create()` operation.
    #[serde(default, deserialize_with = "ignore_unknown")]
    pub user_verification: UserVerificationRequirement,
}

/// This enumeration’s values describe the Relying Party's requirements for client-side
/// discoverable credentials (formerly known as resident credentials or resident keys).
///
/// <https://w3c.github.io/webauthn/#enumdef-residentkeyrequirement>
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[typeshare(serialized_as = "String")]
pub enum ResidentKeyRequirement {
    /// A server-side credential is preferred, a discoverable one is accepted.
    Discouraged,

    /// A discoverable credential is strongly preferred, a server-side one is accepted.
    Preferred,

    /// A discoverable credential is required.
    Required,
}

/// Relying Parties may use this enumeration to specify their preference regarding
/// [attestation conveyance] during credential generation.
///
/// <https://w3c.github.io/webauthn/#enumdef-attestationconveyancepreference>
///
/// [attestation conveyance]: https://w3c.github.io/webauthn/#attestation-conveyance
#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[typeshare(serialized_as = "String")]
pub enum AttestationConveyancePreference {
    /// The Relying Party is not interested in authenticator attestation. This is the default, and
    /// unknown values fall back to the behavior of this value.
    #[default]
    None,

    /// The Relying Party wants a verifiable attestation statement, but allows the client to decide
    /// how to obtain it.
    Indirect,

    /// The Relying Party wants to receive the attestation statement as generated by the
    /// authenticator.
    Direct,

    /// The Relying Party wants an attestation statement that may include uniquely identifying
    /// information. Intended for controlled enterprise deployments.
    Enterprise,
}

/// The authenticator's response to a credential creation, as handed back by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct PlatformAttestationResponse {
    /// The JSON serialization of the client data passed to the authenticator.
    #[serde(rename = "clientDataJSON")]
    pub client_data_json: Bytes,

    /// The CBOR encoded attestation object.
    pub attestation_object: Bytes,
}

/// The authenticator's response to a credential creation, in transport form.
///
/// <https://w3c.github.io/webauthn/#iface-authenticatorattestationresponse>
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct AuthenticatorAttestationResponse {
    /// The JSON serialization of the client data passed to the authenticator. The exact
    /// serialization MUST be preserved, as the hash of the serialized client data has been
    /// computed over it.
    #[serde(rename = "clientDataJSON")]
    pub client_data_json: TransportBuffer,

    /// The attestation object, which is opaque to, and cryptographically protected against
    /// tampering by, the client.
    pub attestation_object: TransportBuffer,
}

impl From<&PlatformAttestationResponse> for AuthenticatorAttestationResponse {
    fn from(response: &PlatformAttestationResponse) -> Self {
        Self {
            client_data_json: TransportBuffer::from(&response.client_data_json),
            attestation_object: TransportBuffer::from(&response.attestation_object),
        }
    }
}
