//! Encoding functions for binary credential data crossing the network boundary.
//!
//! Every challenge, credential ID, signature, user handle, authenticator data, attestation object
//! and client data blob travels as URL-safe base64 text without padding.

use data_encoding::{DecodeKind, Encoding, Specification, BASE64URL, BASE64URL_NOPAD};
use serde::Serialize;
use typeshare::typeshare;


/// The text given for decoding is not valid `base64url`.
#[typeshare]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "type", content = "content")]
pub enum InvalidEncoding {
    /// The unpadded length leaves a single dangling symbol (`len % 4 == 1`), which cannot encode
    /// a whole byte.
    #[error("InvalidLengthError: Input base64url string is the wrong length to determine padding")]
    InvalidLength,
    /// A character outside of the base64 alphabets was found.
    #[error("InvalidCharacterError: Input base64url string has an invalid symbol at position {position}")]
    InvalidSymbol {
        /// Index of the offending character in the unpadded input.
        #[typeshare(serialized_as = "I54")]
        position: usize,
    },
}

/// Convert bytes to base64url without padding. Total over any input, including the empty slice.
pub fn base64url(data: &[u8]) -> String {
    BASE64URL_NOPAD.encode(data)
}

/// Decode `base64url` text into bytes.
///
/// Trailing `=` padding is optional and `+`/`/` are read as `-`/`_`, so standard base64 text is
/// accepted too. Fails with [`InvalidEncoding::InvalidLength`] when the unpadded length modulo 4
/// is 1.
pub fn decode_base64url(input: &str) -> Result<Vec<u8>, InvalidEncoding> {
    let unpadded = input.trim_end_matches('=');
    if unpadded.len() % 4 == 1 {
        return Err(InvalidEncoding::InvalidLength);
    }

    let normalized: String = unpadded
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            c => c,
        })
        .collect();

    lenient_base64url()
        .decode(normalized.as_bytes())
        .map_err(|e| match e.kind {
            DecodeKind::Length => InvalidEncoding::InvalidLength,
            _ => InvalidEncoding::InvalidSymbol {
                position: e.position,
            },
        })
}

/// Like [`decode_base64url`], for callers that only care whether the text decodes.
pub fn try_from_base64url(input: &str) -> Option<Vec<u8>> {
    decode_base64url(input).ok()
}

/// The unpadded base64url alphabet, ignoring non-zero trailing bits the same way browsers'
/// `atob` does.
fn lenient_base64url() -> Encoding {
    let specs = BASE64URL.specification();
    let specs = Specification {
        check_trailing_bits: false,
        padding: None,
        ..specs
    };
    specs
        .encoding()
        .expect("relaxing a builtin specification keeps it valid")
}
