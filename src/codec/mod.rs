//! Signature container codec.
//!
//! Bidirectional binary <-> in-memory and data-URI <-> binary conversion
//! with CRC-32 validation, plus a JSON rendering of the in-memory form.

mod binary;
mod json;
mod uri;

pub use binary::{decode_binary, encode_binary, HEADER_LEN, MAGIC1, MAGIC2};
pub use json::to_json;
pub use uri::{decode_uri, encode_uri, URI_PREFIX};
