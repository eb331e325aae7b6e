//! JSON view of a signature.
//!
//! Raw wire fields keep their names; derived quantities are prefixed with an
//! underscore to mark them as informational.

use serde_json::{json, Map, Value};

use crate::signature::Signature;

pub fn to_json(signature: &Signature) -> Value {
    let mut bands = Map::new();
    for (band, peaks) in &signature.band_to_peaks {
        let rendered: Vec<Value> = peaks
            .iter()
            .map(|peak| {
                json!({
                    "fft_pass_number": peak.fft_pass_number,
                    "peak_magnitude": peak.peak_magnitude,
                    "corrected_peak_frequency_bin": peak.corrected_peak_frequency_bin,
                    "_frequency_hz": peak.frequency_hz(),
                    "_amplitude_pcm": peak.amplitude_pcm(),
                    "_seconds": peak.seconds(),
                })
            })
            .collect();
        bands.insert(band.name().to_string(), Value::Array(rendered));
    }

    json!({
        "sample_rate_hz": signature.sample_rate_hz,
        "number_samples": signature.number_samples,
        "_seconds": signature.seconds(),
        "frequency_band_to_peaks": bands,
    })
}
