use std::sync::{Arc, Mutex};

use fido2_types::{
    webauthn::{
        AssertionOptionsRequest, AttestationOptionsRequest, AuthenticatorTransport,
        CredentialCreationOptions, PlatformAssertion, PlatformAssertionResponse,
        PlatformAttestationResponse, PlatformCreatedCredential, PlatformCredential,
        VerificationResult,
    },
    Bytes,
};
use serde_json::json;

use super::*;

fn attestation_options(attachment: &str) -> AttestationOptions {
    serde_json::from_value(json!({
        "status": "ok",
        "errorMessage": "",
        "rp": { "id": "example.com", "name": "Example" },
        "user": { "id": "dXNlci0x", "name": "alice", "displayName": "Alice" },
        "challenge": "AQIDBA",
        "pubKeyCredParams": [{ "type": "public-key", "alg": -7 }],
        "timeout": 60000,
        "attestation": "direct",
        "authenticatorSelection": {
            "authenticatorAttachment": attachment,
            "requireResidentKey": false,
            "userVerification": "required"
        },
        "excludeCredentials": [{ "type": "public-key", "id": "AQ" }]
    }))
    .unwrap()
}

fn assertion_options() -> AssertionOptions {
    serde_json::from_value(json!({
        "status": "ok",
        "challenge": "BQYH",
        "rpId": "example.com",
        "userVerification": "preferred",
        "allowCredentials": [{ "type": "public-key", "id": "AQID", "transports": ["internal"] }]
    }))
    .unwrap()
}

fn created_credential() -> PlatformCreatedCredential {
    PlatformCredential {
        id: "AQID".into(),
        raw_id: Bytes::from([1, 2, 3]),
        ty: PublicKeyCredentialType::PublicKey,
        response: PlatformAttestationResponse {
            client_data_json: Bytes::from([4, 5]),
            attestation_object: Bytes::from([6, 7, 8]),
        },
    }
}

fn assertion(user_handle: Option<Bytes>) -> PlatformAssertion {
    PlatformCredential {
        id: "AQID".into(),
        raw_id: Bytes::from([1, 2, 3]),
        ty: PublicKeyCredentialType::PublicKey,
        response: PlatformAssertionResponse {
            authenticator_data: Bytes::from([9]),
            client_data_json: Bytes::from([4, 5]),
            signature: Bytes::from([10, 11]),
            user_handle,
        },
    }
}

fn verified(username: &str) -> VerificationResult {
    serde_json::from_value(json!({ "username": username, "status": "ok" })).unwrap()
}

type RecordedStates = Arc<Mutex<Vec<OperationState>>>;

fn recorded_client(platform: MockPlatform) -> (Client<MockPlatform>, RecordedStates) {
    let states = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&states);
    let client = Client::new(platform)
        .with_state_listener(move |state| recorder.lock().unwrap().push(state));
    (client, states)
}

/// A platform with WebAuthn which must not be asked about its platform authenticator.
fn platform_without_attachment_check() -> MockPlatform {
    let mut platform = MockPlatform::new();
    platform
        .expect_has_public_key_credential()
        .return_const(true);
    platform
        .expect_is_user_verifying_platform_authenticator_available()
        .never();
    platform
}

#[tokio::test]
async fn create_credential_encodes_platform_result() {
    let mut platform = MockPlatform::fully_supported();
    platform
        .expect_create()
        .withf(|request: &CredentialCreationOptions| {
            request.public_key.challenge == Bytes::from([1, 2, 3, 4])
                && request.public_key.user.id == Bytes::from(b"user-1".to_vec())
                && request.public_key.exclude_credentials == Some(Vec::new())
        })
        .times(1)
        .returning(|_| Ok(created_credential()));
    let (client, states) = recorded_client(platform);

    let credential = client
        .create_credential(attestation_options("platform"))
        .await
        .unwrap();

    assert_eq!(
        serde_json::to_value(&credential).unwrap(),
        json!({
            "id": "AQID",
            "rawId": "AQID",
            "type": "public-key",
            "response": { "clientDataJSON": "BAU", "attestationObject": "BgcI" }
        })
    );
    assert_eq!(
        *states.lock().unwrap(),
        vec![
            OperationState::CheckingCapability,
            OperationState::BuildingRequest,
            OperationState::AwaitingPlatform,
            OperationState::EncodingResult,
            OperationState::Succeeded,
        ]
    );
}

#[tokio::test]
async fn create_credential_can_keep_exclusions() {
    let mut platform = MockPlatform::fully_supported();
    platform
        .expect_create()
        .withf(|request: &CredentialCreationOptions| {
            let excluded = request.public_key.exclude_credentials.as_deref().unwrap_or_default();
            excluded.len() == 1
                && excluded[0].id == Bytes::from([1])
                && excluded[0].transports
                    == Some(vec![
                        AuthenticatorTransport::Internal,
                        AuthenticatorTransport::Usb,
                        AuthenticatorTransport::Ble,
                        AuthenticatorTransport::Nfc,
                    ])
        })
        .times(1)
        .returning(|_| Ok(created_credential()));
    let client = Client::new(platform).remove_exclude_credentials(false);

    client
        .create_credential(attestation_options("platform"))
        .await
        .unwrap();
}

#[tokio::test]
async fn exclusions_are_removed_for_roaming_authenticators_too() {
    let mut platform = platform_without_attachment_check();
    platform
        .expect_create()
        .withf(|request: &CredentialCreationOptions| {
            request.public_key.exclude_credentials == Some(Vec::new())
        })
        .times(1)
        .returning(|_| Ok(created_credential()));
    let client = Client::new(platform);

    client
        .create_credential(attestation_options("cross-platform"))
        .await
        .unwrap();
}

#[tokio::test]
async fn create_credential_without_webauthn() {
    let mut platform = MockPlatform::without_webauthn();
    platform.expect_create().never();
    let (client, states) = recorded_client(platform);

    let err = client
        .create_credential(attestation_options("platform"))
        .await
        .unwrap_err();

    assert_eq!(err, WebauthnError::WebAuthnUnavailable);
    assert_eq!(
        *states.lock().unwrap(),
        vec![OperationState::CheckingCapability, OperationState::Failed]
    );
}

#[tokio::test]
async fn create_credential_requires_platform_authenticator() {
    let mut platform = MockPlatform::without_platform_authenticator();
    platform.expect_create().never();
    let (client, states) = recorded_client(platform);

    let err = client
        .create_credential(attestation_options("platform"))
        .await
        .unwrap_err();

    assert_eq!(err, WebauthnError::WebAuthnPlatformUnavailable);
    assert_eq!(err.name(), "WebAuthnPlatformUnavailable");
    assert_eq!(
        *states.lock().unwrap(),
        vec![
            OperationState::CheckingCapability,
            OperationState::BuildingRequest,
            OperationState::Failed,
        ]
    );
}

#[tokio::test]
async fn create_credential_rejects_malformed_challenge() {
    let mut platform = MockPlatform::fully_supported();
    platform.expect_create().never();
    let client = Client::new(platform);
    let mut options = attestation_options("platform");
    options.challenge = "abcde".into();

    let err = client.create_credential(options).await.unwrap_err();

    assert_eq!(err, WebauthnError::InvalidEncoding(InvalidEncoding::InvalidLength));
    assert_eq!(err.name(), "InvalidLengthError");
    assert_eq!(
        err.to_string(),
        "InvalidLengthError: Input base64url string is the wrong length to determine padding"
    );
}

#[tokio::test]
async fn platform_failure_is_passed_through() {
    let mut platform = MockPlatform::fully_supported();
    platform
        .expect_create()
        .times(1)
        .returning(|_| Err(PlatformError::not_allowed()));
    let (client, states) = recorded_client(platform);

    let err = client
        .create_credential(attestation_options("platform"))
        .await
        .unwrap_err();

    assert_eq!(err, WebauthnError::PlatformOperation(PlatformError::not_allowed()));
    assert_eq!(err.name(), "NotAllowedError");
    assert_eq!(
        err.to_string(),
        "NotAllowedError: The operation either timed out or was not allowed."
    );
    assert_eq!(
        states.lock().unwrap().last(),
        Some(&OperationState::Failed)
    );
}

#[tokio::test]
async fn create_assertion_encodes_platform_result() {
    let mut platform = platform_without_attachment_check();
    platform
        .expect_get()
        .withf(|request| {
            let allowed = request.public_key.allow_credentials.as_deref().unwrap_or_default();
            request.public_key.challenge == Bytes::from([5, 6, 7])
                && allowed.len() == 1
                && allowed[0].id == Bytes::from([1, 2, 3])
                && allowed[0].transports == Some(vec![AuthenticatorTransport::Internal])
        })
        .times(1)
        .returning(|_| Ok(assertion(Some(Bytes::from(b"user-1".to_vec())))));
    let (client, states) = recorded_client(platform);

    let credential = client.create_assertion(assertion_options()).await.unwrap();

    assert_eq!(credential.id, "AQID");
    assert_eq!(credential.raw_id, "AQID");
    assert_eq!(credential.ty, PublicKeyCredentialType::PublicKey);
    assert_eq!(credential.response.authenticator_data, "CQ");
    assert_eq!(credential.response.client_data_json, "BAU");
    assert_eq!(credential.response.signature, "Cgs");
    assert_eq!(credential.response.user_handle, "dXNlci0x");
    assert_eq!(
        *states.lock().unwrap(),
        vec![
            OperationState::CheckingCapability,
            OperationState::BuildingRequest,
            OperationState::AwaitingPlatform,
            OperationState::EncodingResult,
            OperationState::Succeeded,
        ]
    );
}

#[tokio::test]
async fn missing_user_handle_is_empty() {
    let mut platform = platform_without_attachment_check();
    platform
        .expect_get()
        .times(1)
        .returning(|_| Ok(assertion(None)));
    let client = Client::new(platform);

    let credential = client.create_assertion(assertion_options()).await.unwrap();

    assert_eq!(credential.response.user_handle, "");
}

#[tokio::test]
async fn assertion_type_is_always_public_key() {
    let mut platform = platform_without_attachment_check();
    platform.expect_get().times(1).returning(|_| {
        let mut assertion = assertion(None);
        assertion.ty = PublicKeyCredentialType::Unknown;
        Ok(assertion)
    });
    let client = Client::new(platform);

    let credential = client.create_assertion(assertion_options()).await.unwrap();

    assert_eq!(
        serde_json::to_value(&credential).unwrap()["type"],
        "public-key"
    );
}

#[tokio::test]
async fn register_runs_the_full_exchange() {
    let mut api = MockRelyingPartyApi::new();
    api.expect_attestation_options()
        .withf(|request| request.username == "alice" && request.display_name == "Alice")
        .times(1)
        .returning(|_| Ok(attestation_options("platform")));
    api.expect_attestation_result()
        .withf(|credential| {
            credential.raw_id == "AQID" && credential.response.attestation_object == "BgcI"
        })
        .times(1)
        .returning(|_| Ok(verified("alice")));

    let mut platform = MockPlatform::fully_supported();
    platform
        .expect_create()
        .times(1)
        .returning(|_| Ok(created_credential()));
    let ceremony = Ceremony::new(Client::new(platform), api);

    let result = ceremony
        .register(AttestationOptionsRequest::new("alice", "Alice"))
        .await
        .unwrap();

    assert_eq!(result.username.as_deref(), Some("alice"));
}

#[tokio::test]
async fn authenticate_stops_at_relying_party_failure() {
    let mut api = MockRelyingPartyApi::new();
    api.expect_assertion_options().times(1).returning(|_| {
        Err(WebauthnError::Upstream {
            error_text: "user not found".into(),
        })
    });
    api.expect_assertion_result().never();

    let mut platform = MockPlatform::fully_supported();
    platform.expect_get().never();
    let ceremony = Ceremony::new(Client::new(platform), api);

    let err = ceremony
        .authenticate(AssertionOptionsRequest::new("mallory"))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "user not found");
}

#[tokio::test]
async fn capability_check_is_advisory() {
    let mut api = MockRelyingPartyApi::new();
    api.expect_assertion_options()
        .times(1)
        .returning(|_| Ok(assertion_options()));
    api.expect_assertion_result()
        .times(1)
        .returning(|_| Ok(verified("alice")));

    let mut platform = MockPlatform::without_platform_authenticator();
    platform
        .expect_get()
        .times(1)
        .returning(|_| Ok(assertion(None)));
    let ceremony = Ceremony::new(Client::new(platform), api);

    let result = ceremony
        .authenticate(AssertionOptionsRequest::new("alice"))
        .await
        .unwrap();

    assert_eq!(result.username.as_deref(), Some("alice"));
}
