//! The contract of the proxy standing between the client and the relying party's FIDO2 server.
//!
//! The proxy exposes four JSON endpoints, each forwarding verbatim to the matching operation of
//! the upstream FIDO2 server below [`UPSTREAM_PREFIX`], plus device management below
//! [`DEVICES_PATH`]. Failures of any kind are reported to the
//! client as an [`ErrorResponse`] with status 400.

use std::fmt;

use serde::{Deserialize, Serialize};
use typeshare::typeshare;

/// Path prefix of the FIDO2 operations on the upstream relying party server.
pub const UPSTREAM_PREFIX: &str = "/rp/api/versioned/fido2";

/// Upstream path of a user's registered authenticators. `GET` with a `username` query parameter
/// lists them, `DELETE` with a `keyId` query parameter removes one.
pub const UPSTREAM_DEVICES_PATH: &str = "/rp/api/versioned/fido2/user";

/// Local path of the registered authenticators: `GET /devices?username=..` lists a user's
/// devices, `DELETE /devices/{keyId}` removes one.
pub const DEVICES_PATH: &str = "/devices";

/// The operations relayed by the proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Fetch attestation (registration) options.
    AttestationOptions,
    /// Submit a created credential for verification.
    AttestationResult,
    /// Fetch assertion (authentication) options.
    AssertionOptions,
    /// Submit an assertion for verification.
    AssertionResult,
}

impl Endpoint {
    /// Every endpoint, in ceremony order.
    pub const ALL: [Endpoint; 4] = [
        Endpoint::AttestationOptions,
        Endpoint::AttestationResult,
        Endpoint::AssertionOptions,
        Endpoint::AssertionResult,
    ];

    /// The path exposed by the proxy.
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::AttestationOptions => "/attestation/options",
            Endpoint::AttestationResult => "/attestation/result",
            Endpoint::AssertionOptions => "/assertion/options",
            Endpoint::AssertionResult => "/assertion/result",
        }
    }

    /// The path of the same operation on the upstream server.
    pub fn upstream_path(self) -> &'static str {
        match self {
            Endpoint::AttestationOptions => "/rp/api/versioned/fido2/attestation/options",
            Endpoint::AttestationResult => "/rp/api/versioned/fido2/attestation/result",
            Endpoint::AssertionOptions => "/rp/api/versioned/fido2/assertion/options",
            Endpoint::AssertionResult => "/rp/api/versioned/fido2/assertion/result",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// The uniform error body returned by the proxy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct ErrorResponse {
    /// A human readable description of the failure, relayed from the relying party when it
    /// provided one.
    pub error_text: String,
}

impl ErrorResponse {
    /// Create a new error body.
    pub fn new(error_text: impl Into<String>) -> Self {
        Self {
            error_text: error_text.into(),
        }
    }

    /// Look for an error reported inside an otherwise well formed JSON reply. Relying parties use
    /// either an `errorText` or an `error` member; empty and `null` members do not count.
    pub fn from_reply(body: &serde_json::Value) -> Option<Self> {
        ["errorText", "error"].iter().find_map(|key| {
            match body.get(key)? {
                serde_json::Value::Null => None,
                serde_json::Value::Bool(false) => None,
                serde_json::Value::String(text) if text.is_empty() => None,
                serde_json::Value::String(text) => Some(Self::new(text.as_str())),
                other => Some(Self::new(other.to_string())),
            }
        })
    }
}
