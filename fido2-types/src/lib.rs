//! # FIDO2 Types
//!
//! Rust type definitions for the data that crosses the network boundary during a FIDO2
//! registration ("attestation") or authentication ("assertion") ceremony, together with the
//! `base64url` transport encoding used for every binary member.
//!
//! Three families of types live here:
//!
//! * The JSON shapes exchanged with the relying party through the proxy, see [`webauthn`] and [`api`].
//! * The platform-native request and result shapes handed to and received from the WebAuthn
//!   platform capability, whose binary members are raw [`Bytes`].
//! * The [`TransportBuffer`] newtype and the [`encoding`] functions bridging the two.

mod utils;

pub mod api;
pub mod webauthn;

mod transport;

// Re-exports
pub use transport::{Bytes, TransportBuffer};
pub use utils::encoding::{self, InvalidEncoding};
