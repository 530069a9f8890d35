use std::fmt;

use serde::{
    de::{self, SeqAccess, Visitor},
    Deserialize, Deserializer, Serialize, Serializer,
};
use typeshare::typeshare;

use crate::{encoding, InvalidEncoding};

/// Raw binary credential material on the platform side of the boundary.
///
/// Serializes with the serializer's byte representation, an array of numbers in JSON. Text is
/// rejected when parsing: encoded data belongs in a [`TransportBuffer`].
#[typeshare(transparent)]
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct Bytes(Vec<u8>);

impl Bytes {
    /// The raw bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for Bytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(data: Vec<u8>) -> Self {
        Self(data)
    }
}

impl From<&[u8]> for Bytes {
    fn from(data: &[u8]) -> Self {
        Self(data.to_vec())
    }
}

impl<const N: usize> From<[u8; N]> for Bytes {
    fn from(data: [u8; N]) -> Self {
        Self(data.to_vec())
    }
}

impl From<Bytes> for Vec<u8> {
    fn from(bytes: Bytes) -> Self {
        bytes.0
    }
}

impl Serialize for Bytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(&self.0)
    }
}

impl<'de> Deserialize<'de> for Bytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RawBytes;

        impl<'de> Visitor<'de> for RawBytes {
            type Value = Bytes;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an array of bytes")
            }

            fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Self::Value, E> {
                Ok(Bytes::from(v))
            }

            fn visit_byte_buf<E: de::Error>(self, v: Vec<u8>) -> Result<Self::Value, E> {
                Ok(Bytes(v))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut data = Vec::with_capacity(seq.size_hint().unwrap_or_default());
                while let Some(byte) = seq.next_element()? {
                    data.push(byte);
                }
                Ok(Bytes(data))
            }
        }

        deserializer.deserialize_byte_buf(RawBytes)
    }
}

/// Binary data as it crosses the network boundary: URL-safe base64 text without padding.
///
/// The text is kept verbatim as received. It is only checked when [decoded](Self::decode), which
/// lets a malformed challenge or credential ID surface as an [`InvalidEncoding`] error from the
/// component that needed the bytes instead of as an opaque JSON parse failure.
#[typeshare(transparent)]
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransportBuffer(String);

impl TransportBuffer {
    /// Encode raw bytes for transport.
    pub fn encode(data: &[u8]) -> Self {
        Self(encoding::base64url(data))
    }

    /// Decode the transport text back into raw bytes.
    pub fn decode(&self) -> Result<Bytes, InvalidEncoding> {
        encoding::decode_base64url(&self.0).map(Bytes::from)
    }

    /// The transport text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&Bytes> for TransportBuffer {
    fn from(bytes: &Bytes) -> Self {
        Self::encode(bytes.as_slice())
    }
}

impl From<String> for TransportBuffer {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl From<&str> for TransportBuffer {
    fn from(text: &str) -> Self {
        Self(text.to_owned())
    }
}

impl From<TransportBuffer> for String {
    fn from(buffer: TransportBuffer) -> Self {
        buffer.0
    }
}

impl AsRef<str> for TransportBuffer {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for TransportBuffer {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for TransportBuffer {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for TransportBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
