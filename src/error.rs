//! Error types raised at the codec boundary.
//!
//! The DSP path has no failure modes on well-formed input; everything here
//! concerns parsing or producing the binary container and its data-URI form.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("bad magic at offset {offset}: expected {expected:#010x}, found {found:#010x}")]
    BadMagic {
        offset: usize,
        expected: u32,
        found: u32,
    },

    #[error("container size field says {header} payload bytes but buffer carries {actual}")]
    SizeMismatch { header: u32, actual: u32 },

    #[error("checksum mismatch: stored {stored:#010x}, computed {computed:#010x}")]
    ChecksumMismatch { stored: u32, computed: u32 },

    #[error("container truncated at offset {offset}: needed {needed} bytes, found {remaining}")]
    Truncated {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    #[error("unknown band tag {tag:#010x} at offset {offset}")]
    UnknownBandTag { tag: u32, offset: usize },

    #[error("band payload length {length} at offset {offset} is not a whole number of peak records")]
    BandPayloadLength { offset: usize, length: usize },

    #[error("unsupported sample rate id {0}")]
    UnsupportedSampleRateId(u32),

    #[error("unsupported sample rate {0} Hz")]
    UnsupportedSampleRate(u32),

    #[error("not an audio signature data URI")]
    InvalidUriPrefix,

    #[error("invalid base64 payload: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}
