pub(crate) mod serde;

pub mod encoding;
