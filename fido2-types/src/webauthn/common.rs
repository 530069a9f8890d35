//! Common types used in both Attestation (registration) and Assertion (authentication).
//!
use serde::{Deserialize, Serialize};
use typeshare::typeshare;

use crate::{
    utils::serde::{ignore_unknown, ignore_unknown_opt_vec},
    Bytes, InvalidEncoding, TransportBuffer,
};

#[cfg(doc)]
use crate::webauthn::{AssertionOptions, AttestationOptions, PublicKeyCredential};

/// This enumeration defines the valid credential types. It is an extension point; values can be
/// added to it in the future, as more credential types are defined.
///
/// <https://w3c.github.io/webauthn/#enumdef-publickeycredentialtype>
#[derive(Debug, Default, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
#[typeshare(serialized_as = "String")]
pub enum PublicKeyCredentialType {
    /// Currently the only type defined is a `PublicKey` meaning the public conterpart of an
    /// asymmetric key pair.
    PublicKey,
    /// This is the default as it will be ignored if the value is unknown during deserialization
    #[default]
    Unknown,
}

/// Identifies a specific public key credential on the platform side, with its ID as raw bytes.
///
/// It is used in the exclusion list of a creation request to prevent creating duplicate
/// credentials on the same authenticator, and in the allow list of a request for an assertion.
///
/// <https://w3c.github.io/webauthn/#dictdef-publickeycredentialdescriptor>
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[typeshare]
pub struct PublicKeyCredentialDescriptor {
    /// The type of the public key credential the caller is referring to.
    #[serde(rename = "type", default, deserialize_with = "ignore_unknown")]
    pub ty: PublicKeyCredentialType,

    /// The credential ID of the public key credential the caller is referring to.
    pub id: Bytes,

    /// A hint as to how the client might communicate with the managing authenticator.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "ignore_unknown_opt_vec"
    )]
    pub transports: Option<Vec<AuthenticatorTransport>>,
}

/// A credential descriptor as issued by the relying party, found in
/// [`AttestationOptions::exclude_credentials`] and [`AssertionOptions::allow_credentials`].
/// Its ID is still in transport form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[typeshare]
pub struct ServerCredentialDescriptor {
    /// The type of the public key credential, `public-key` when omitted.
    #[serde(rename = "type", default = "public_key", deserialize_with = "ignore_unknown")]
    pub ty: PublicKeyCredentialType,

    /// The credential ID, `base64url` encoded.
    pub id: TransportBuffer,

    /// Transport hints supplied by the relying party. Unknown values are dropped.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "ignore_unknown_opt_vec"
    )]
    pub transports: Option<Vec<AuthenticatorTransport>>,
}

fn public_key() -> PublicKeyCredentialType {
    PublicKeyCredentialType::PublicKey
}

impl ServerCredentialDescriptor {
    /// Decode the credential ID, keeping the server's type and transport hints.
    pub fn decode(self) -> Result<PublicKeyCredentialDescriptor, InvalidEncoding> {
        Ok(PublicKeyCredentialDescriptor {
            ty: self.ty,
            id: self.id.decode()?,
            transports: self.transports,
        })
    }
}

/// A Relying Party may require [user verification] for some of its operations but not for others,
/// and may use this type to express its needs.
///
/// <https://w3c.github.io/webauthn/#enumdef-userverificationrequirement>
///
/// [user verification]: https://w3c.github.io/webauthn/#user-verification
#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[typeshare(serialized_as = "String")]
pub enum UserVerificationRequirement {
    /// The Relying Party requires user verification for the operation and will fail the overall
    /// ceremony if the response does not have the UV flag set.
    Required,

    /// The Relying Party prefers user verification for the operation if possible, but will not fail
    /// the operation if the response does not have the UV flag set.
    #[default]
    Preferred,

    /// The Relying Party does not want user verification employed during the operation.
    Discouraged,
}

/// Authenticators may implement various transports for communicating with clients. These values
/// are hints as to how clients might communicate with a particular authenticator.
///
/// <https://w3c.github.io/webauthn/#enum-transport>
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[typeshare(serialized_as = "String")]
pub enum AuthenticatorTransport {
    /// Removable USB.
    Usb,

    /// Near Field Communication (NFC).
    Nfc,

    /// Bluetooth Smart (Bluetooth Low Energy / BLE).
    Ble,

    /// A combination of (often separate) data-transport and proximity mechanisms, for example a
    /// smartphone used to sign in on a desktop computer.
    #[serde(alias = "cable")]
    Hybrid,

    /// A client device-specific transport, i.e. a platform authenticator. These authenticators are
    /// not removable from the client device.
    Internal,
}

/// This enumeration’s values describe authenticators' attachment modalities.
///
/// <https://w3c.github.io/webauthn/#enumdef-authenticatorattachment>
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
#[typeshare(serialized_as = "String")]
pub enum AuthenticatorAttachment {
    /// Attached using a client device-specific transport and usually not removable from the client
    /// device, e.g. a fingerprint reader or face recognition built into a laptop or phone.
    Platform,

    /// Removable authenticators which can "roam" between client devices, e.g. security keys.
    CrossPlatform,
}
