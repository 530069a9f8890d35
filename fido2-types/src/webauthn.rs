//! Implementation of the [WebAuthn] data shapes exchanged during a ceremony.
//!
//! Every operation involves three representations of the same data:
//!
//! 1. what the relying party issues ([`AttestationOptions`], [`AssertionOptions`]), with binary
//!    members as [`TransportBuffer`]s,
//! 2. what the platform consumes and produces ([`CredentialCreationOptions`],
//!    [`CredentialRequestOptions`], [`PlatformCredential`]), with binary members as [`Bytes`],
//! 3. what is submitted back for verification ([`PublicKeyCredential`]).
//!
//! [WebAuthn]: https://w3c.github.io/webauthn

use serde::{Deserialize, Serialize};
use typeshare::typeshare;

use crate::{utils::serde::ignore_unknown, Bytes, TransportBuffer};

mod assertion;
mod attestation;
mod common;

// re-export types
pub use self::{assertion::*, attestation::*, common::*};

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::AuthenticatorAssertionResponse {}
    impl Sealed for super::AuthenticatorAttestationResponse {}
    impl Sealed for super::PlatformAssertionResponse {}
    impl Sealed for super::PlatformAttestationResponse {}
}

/// Marker trait for response types
pub trait AuthenticatorResponse: sealed::Sealed {}

impl AuthenticatorResponse for AuthenticatorAssertionResponse {}
impl AuthenticatorResponse for AuthenticatorAttestationResponse {}
impl AuthenticatorResponse for PlatformAssertionResponse {}
impl AuthenticatorResponse for PlatformAttestationResponse {}

/// A credential as returned by the platform, after a successful `create()` or `get()`.
///
/// <https://w3c.github.io/webauthn/#iface-pkcredential>
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct PlatformCredential<R: AuthenticatorResponse> {
    /// The credential ID chosen by the authenticator, as text. Passed through unmodified.
    pub id: String,

    /// The raw credential ID.
    pub raw_id: Bytes,

    /// The credential type reported by the platform.
    #[serde(rename = "type", default, deserialize_with = "ignore_unknown")]
    pub ty: PublicKeyCredentialType,

    /// The authenticator's response.
    pub response: R,
}

/// This is the transport form of a successful creation or assertion of a credential, as submitted
/// to the relying party.
///
/// It is recommended to use the type aliases depending on which response you are expecting:
/// * Credential Creation: [CreatedPublicKeyCredential]
/// * Credential assertion: [AuthenticatedPublicKeyCredential]
///
/// <https://w3c.github.io/webauthn/#iface-pkcredential>
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct PublicKeyCredential<R: AuthenticatorResponse> {
    /// The credential ID chosen by the authenticator, exactly as the platform reported it.
    pub id: String,

    /// The raw credential ID in transport form.
    pub raw_id: TransportBuffer,

    /// Always [`PublicKeyCredentialType::PublicKey`] for credentials produced by this client.
    #[serde(rename = "type")]
    pub ty: PublicKeyCredentialType,

    /// The authenticator's response in transport form.
    pub response: R,
}

/// The relying party's reply to a submitted credential.
///
/// After a registration this carries the `username` of the enrolled account. Every other member
/// the relying party sends is kept in [`Self::extra`], in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    /// The account the credential was verified for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Any other members of the reply.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
