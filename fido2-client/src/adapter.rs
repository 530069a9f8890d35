//! Conversion of relying party options into platform requests.
//!
//! The relying party transmits binary members as base64url text while the platform consumes raw
//! bytes. Everything that is not binary passes through unchanged.

use fido2_types::{
    encoding::InvalidEncoding,
    webauthn::{
        AssertionOptions, AttestationOptions, AuthenticatorTransport, CredentialCreationOptions,
        CredentialRequestOptions, PublicKeyCredentialCreationOptions,
        PublicKeyCredentialDescriptor, PublicKeyCredentialRequestOptions,
        PublicKeyCredentialUserEntity, ServerCredentialDescriptor,
    },
};

/// The transports put on every excluded credential, so the platform considers every kind of
/// authenticator when looking for a matching existing credential.
pub const EXCLUDE_CREDENTIAL_TRANSPORTS: [AuthenticatorTransport; 4] = [
    AuthenticatorTransport::Internal,
    AuthenticatorTransport::Usb,
    AuthenticatorTransport::Ble,
    AuthenticatorTransport::Nfc,
];

/// Build the platform's creation request from the relying party's attestation options.
///
/// The challenge, the user handle and every excluded credential ID are decoded. Excluded
/// credentials get [`EXCLUDE_CREDENTIAL_TRANSPORTS`] regardless of what the relying party sent.
/// When `remove_exclude_credentials` is set the platform always receives an empty exclusion list,
/// whatever the relying party sent, allowing an authenticator to be registered again.
pub fn adapt_attestation_options(
    options: AttestationOptions,
    remove_exclude_credentials: bool,
) -> Result<CredentialCreationOptions, InvalidEncoding> {
    let exclude_credentials = match options.exclude_credentials {
        _ if remove_exclude_credentials => Some(Vec::new()),
        Some(descriptors) => Some(
            descriptors
                .into_iter()
                .map(excluded_credential)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        None => None,
    };

    Ok(CredentialCreationOptions {
        public_key: PublicKeyCredentialCreationOptions {
            attestation: options.attestation,
            authenticator_selection: options.authenticator_selection,
            exclude_credentials,
            rp: options.rp,
            user: PublicKeyCredentialUserEntity {
                id: options.user.id.decode()?,
                name: options.user.name,
                display_name: options.user.display_name,
            },
            pub_key_cred_params: options.pub_key_cred_params,
            timeout: options.timeout,
            challenge: options.challenge.decode()?,
        },
    })
}

/// Build the platform's request from the relying party's assertion options.
///
/// The challenge and every allowed credential ID are decoded. Allowed credentials keep the type
/// and transports the relying party sent.
pub fn adapt_assertion_options(
    options: AssertionOptions,
) -> Result<CredentialRequestOptions, InvalidEncoding> {
    let allow_credentials = options
        .allow_credentials
        .map(|descriptors| {
            descriptors
                .into_iter()
                .map(ServerCredentialDescriptor::decode)
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()?;

    Ok(CredentialRequestOptions {
        public_key: PublicKeyCredentialRequestOptions {
            challenge: options.challenge.decode()?,
            timeout: options.timeout,
            rp_id: options.rp_id,
            allow_credentials,
            user_verification: options.user_verification,
        },
    })
}

fn excluded_credential(
    descriptor: ServerCredentialDescriptor,
) -> Result<PublicKeyCredentialDescriptor, InvalidEncoding> {
    Ok(PublicKeyCredentialDescriptor {
        transports: Some(EXCLUDE_CREDENTIAL_TRANSPORTS.to_vec()),
        ..descriptor.decode()?
    })
}
