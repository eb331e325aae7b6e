//! Acoustic signature generation and container codec.
//!
//! Converts a stream of 16 kHz mono i16 PCM into sparse time-frequency peak
//! maps ("signatures") and serializes them to a versioned binary container
//! or its data-URI form. The pipeline is synchronous and single-threaded;
//! drive a [`SignatureAssembler`] with `feed_input`/`try_take` and hand the
//! emitted [`Signature`]s to the codec.
//!
//! ```
//! use sonosig::{codec, SignatureAssembler};
//!
//! let mut assembler = SignatureAssembler::new();
//! assembler.feed_input(&vec![0i16; 60_000]);
//!
//! while let Some(signature) = assembler.try_take() {
//!     let uri = codec::encode_uri(&signature).unwrap();
//!     assert_eq!(codec::decode_uri(&uri).unwrap(), signature);
//! }
//! ```

pub mod codec;
pub mod error;
pub mod signature;

pub use error::{Error, Result};
pub use signature::{
    FrequencyBand, FrequencyPeak, SampleRate, Signature, SignatureAssembler,
    PROCESSING_SAMPLE_RATE,
};
