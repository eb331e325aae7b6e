//! Binary container framing.
//!
//! Layout (little-endian), 48-byte header then band records:
//!
//! | offset | field |
//! |---|---|
//! | 0  | magic 0xCAFE2580 |
//! | 4  | CRC-32 of everything from offset 8 |
//! | 8  | total length minus header |
//! | 12 | magic 0x94119C00 |
//! | 28 | sample-rate id in the upper 5 bits |
//! | 44 | number of samples plus floor(rate * 0.24) |
//!
//! Each band record is a tag (0x60030040 + band id), a payload length, then
//! 5-byte peaks padded out to a 4-byte boundary. The sample-count bias is an
//! on-wire obfuscation: encoders add it, decoders subtract it.

use crate::error::{Error, Result};
use crate::signature::{FrequencyBand, FrequencyPeak, SampleRate, Signature};

pub const MAGIC1: u32 = 0xCAFE2580;
pub const MAGIC2: u32 = 0x94119C00;
pub const HEADER_LEN: usize = 48;

const BAND_TAG_BASE: u32 = 0x6003_0040;
const PEAK_RECORD_LEN: usize = 5;

/// Serialize a signature into the framed container.
pub fn encode_binary(signature: &Signature) -> Result<Vec<u8>> {
    let rate = SampleRate::from_hz(signature.sample_rate_hz)
        .ok_or(Error::UnsupportedSampleRate(signature.sample_rate_hz))?;

    let payload_len: usize = signature
        .band_to_peaks
        .iter()
        .filter(|(_, peaks)| !peaks.is_empty())
        .map(|(_, peaks)| 8 + padded(peaks.len() * PEAK_RECORD_LEN))
        .sum();

    let mut buf = Vec::with_capacity(HEADER_LEN + payload_len);
    put_u32(&mut buf, MAGIC1);
    put_u32(&mut buf, 0); // checksum slot, filled in once the rest is fixed
    put_u32(&mut buf, payload_len as u32);
    put_u32(&mut buf, MAGIC2);
    buf.extend_from_slice(&[0; 12]);
    put_u32(&mut buf, rate.id() << 27);
    buf.extend_from_slice(&[0; 12]);
    put_u32(
        &mut buf,
        signature.number_samples + sample_count_bias(signature.sample_rate_hz),
    );

    for (band, peaks) in &signature.band_to_peaks {
        if peaks.is_empty() {
            continue;
        }
        put_u32(&mut buf, BAND_TAG_BASE.wrapping_add(band.id() as u32));
        let len = peaks.len() * PEAK_RECORD_LEN;
        put_u32(&mut buf, len as u32);
        for peak in peaks {
            // Pass numbers saturate into the single wire byte.
            buf.push(peak.fft_pass_number.min(u8::MAX as u32) as u8);
            buf.extend_from_slice(&peak.peak_magnitude.to_le_bytes());
            buf.extend_from_slice(&peak.corrected_peak_frequency_bin.to_le_bytes());
        }
        buf.resize(buf.len() + padded(len) - len, 0);
    }

    let checksum = crc32fast::hash(&buf[8..]);
    buf[4..8].copy_from_slice(&checksum.to_le_bytes());
    Ok(buf)
}

/// Parse a framed container back into a signature.
pub fn decode_binary(bytes: &[u8]) -> Result<Signature> {
    if bytes.len() < HEADER_LEN {
        return Err(Error::Truncated {
            offset: 0,
            needed: HEADER_LEN,
            remaining: bytes.len(),
        });
    }

    expect_magic(bytes, 0, MAGIC1)?;
    expect_magic(bytes, 12, MAGIC2)?;

    let header_size = read_u32(bytes, 8);
    let actual_size = (bytes.len() - HEADER_LEN) as u32;
    if header_size != actual_size {
        return Err(Error::SizeMismatch {
            header: header_size,
            actual: actual_size,
        });
    }

    let stored = read_u32(bytes, 4);
    let computed = crc32fast::hash(&bytes[8..]);
    if stored != computed {
        return Err(Error::ChecksumMismatch { stored, computed });
    }

    let rate_id = read_u32(bytes, 28) >> 27;
    let rate = SampleRate::from_id(rate_id).ok_or(Error::UnsupportedSampleRateId(rate_id))?;
    let number_samples = read_u32(bytes, 44).wrapping_sub(sample_count_bias(rate.hz()));

    let mut signature = Signature {
        sample_rate_hz: rate.hz(),
        number_samples,
        band_to_peaks: Default::default(),
    };

    let mut offset = HEADER_LEN;
    while offset < bytes.len() {
        let remaining = bytes.len() - offset;
        if remaining < 8 {
            return Err(Error::Truncated {
                offset,
                needed: 8,
                remaining,
            });
        }

        let tag = read_u32(bytes, offset);
        let band = FrequencyBand::from_id(tag.wrapping_sub(BAND_TAG_BASE) as i32)
            .ok_or(Error::UnknownBandTag { tag, offset })?;

        let payload_len = read_u32(bytes, offset + 4) as usize;
        if payload_len % PEAK_RECORD_LEN != 0 {
            return Err(Error::BandPayloadLength {
                offset: offset + 4,
                length: payload_len,
            });
        }
        let body = padded(payload_len);
        if bytes.len() - (offset + 8) < body {
            return Err(Error::Truncated {
                offset: offset + 8,
                needed: body,
                remaining: bytes.len() - (offset + 8),
            });
        }

        let peaks = signature.band_to_peaks.entry(band).or_default();
        for record in bytes[offset + 8..offset + 8 + payload_len].chunks_exact(PEAK_RECORD_LEN) {
            peaks.push(FrequencyPeak {
                fft_pass_number: record[0] as u32,
                peak_magnitude: u16::from_le_bytes([record[1], record[2]]),
                corrected_peak_frequency_bin: u16::from_le_bytes([record[3], record[4]]),
                sample_rate_hz: rate.hz(),
            });
        }

        offset += 8 + body;
    }

    Ok(signature)
}

fn sample_count_bias(rate_hz: u32) -> u32 {
    (rate_hz as f64 * 0.24) as u32
}

fn padded(len: usize) -> usize {
    len.div_ceil(4) * 4
}

fn put_u32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

fn expect_magic(bytes: &[u8], offset: usize, expected: u32) -> Result<()> {
    let found = read_u32(bytes, offset);
    if found != expected {
        return Err(Error::BadMagic {
            offset,
            expected,
            found,
        });
    }
    Ok(())
}
