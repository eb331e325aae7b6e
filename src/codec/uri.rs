//! Data-URI form of the binary container.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use super::binary::{decode_binary, encode_binary};
use crate::error::{Error, Result};
use crate::signature::Signature;

/// Prefix every signature data URI carries; anything else is rejected.
pub const URI_PREFIX: &str = "data:audio/vnd.shazam.sig;base64,";

pub fn encode_uri(signature: &Signature) -> Result<String> {
    let bytes = encode_binary(signature)?;
    Ok(format!("{URI_PREFIX}{}", STANDARD.encode(bytes)))
}

pub fn decode_uri(uri: &str) -> Result<Signature> {
    let payload = uri.strip_prefix(URI_PREFIX).ok_or(Error::InvalidUriPrefix)?;
    let bytes = STANDARD.decode(payload)?;
    decode_binary(&bytes)
}
