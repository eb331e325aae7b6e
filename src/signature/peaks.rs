//! Peak detection against the spread-spectrum baseline.
//!
//! Candidates are taken from a frame 46 passes in the past so the spread
//! ring already holds both its history and a window of its future. A bin
//! survives only if it rises above the spread neighborhood in frequency and
//! time; survivors get a log-domain parabolic sub-bin correction and a band.

use super::ring::Ring;
use super::{FrequencyBand, FrequencyPeak, PROCESSING_SAMPLE_RATE};

/// Passes between a frame entering the ring and being inspected.
pub const DETECTION_DELAY: u64 = 46;

/// Minimum raw power for a candidate bin.
pub const DETECTION_THRESHOLD: f32 = 1.0 / 64.0;

/// Time-backward dominance frame: the spread spectrum three passes before
/// the candidate, holding the recent past the candidate must not be
/// shadowed by.
const BACK_FRAME_OFFSET: isize = -49;

/// Frequency neighborhood inspected in the time-backward frame.
const NEIGHBOR_BIN_OFFSETS: [isize; 6] = [-10, -3, 1, 2, 5, 8];

/// Cross-time dominance frames, all read at bin k-1: two more frames around
/// the candidate (-53, -45) and four forward frames addressed through ring
/// wrap-around (+165, +201, +214, +250 are -91, -55, -42, -6 passes). A
/// candidate must out-rise all of them, which is what suppresses stationary
/// energy in favor of onsets.
const CROSS_FRAME_OFFSETS: [isize; 6] = [-53, -45, 165, 201, 214, 250];

/// Candidate bins; the edges stay clear of the neighborhood offsets.
const CANDIDATE_BINS: std::ops::Range<usize> = 10..1015;

/// Map a power value into the container's log-magnitude scale.
pub fn log_magnitude(power: f32) -> f64 {
    (power.max(DETECTION_THRESHOLD) as f64).ln() * 1477.3 + 6144.0
}

/// Inspect the delayed frame and emit every bin that dominates its
/// spatiotemporal neighborhood, in ascending-bin order.
pub fn detect_peaks(
    raw_ring: &Ring<Vec<f32>>,
    spread_ring: &Ring<Vec<f32>>,
) -> Vec<(FrequencyBand, FrequencyPeak)> {
    let total_passes = spread_ring.total_written();
    if total_passes < DETECTION_DELAY {
        return Vec::new();
    }
    let fft_pass_number = (total_passes - DETECTION_DELAY) as u32;

    let candidate = raw_ring.at_offset(-(DETECTION_DELAY as isize));
    let back_frame = spread_ring.at_offset(BACK_FRAME_OFFSET);

    let mut peaks = Vec::new();

    for k in CANDIDATE_BINS {
        let power = candidate[k];
        if power < DETECTION_THRESHOLD || power < back_frame[k - 1] {
            continue;
        }

        let mut neighborhood_max = 0.0f32;
        for &offset in &NEIGHBOR_BIN_OFFSETS {
            let bin = (k as isize + offset) as usize;
            neighborhood_max = neighborhood_max.max(back_frame[bin]);
        }
        if power <= neighborhood_max {
            continue;
        }

        for &offset in &CROSS_FRAME_OFFSETS {
            neighborhood_max = neighborhood_max.max(spread_ring.at_offset(offset)[k - 1]);
        }
        if power <= neighborhood_max {
            continue;
        }

        // Parabolic interpolation in the log-magnitude domain. The candidate
        // must be strictly concave across its two raw neighbors.
        let below = log_magnitude(candidate[k - 1]);
        let here = log_magnitude(power);
        let above = log_magnitude(candidate[k + 1]);
        let concavity = 2.0 * here - below - above;
        if concavity <= 0.0 {
            continue;
        }
        let corrected_bin = 64.0 * k as f64 + 32.0 * (above - below) / concavity;

        let frequency_hz =
            corrected_bin * PROCESSING_SAMPLE_RATE as f64 / (2.0 * 1024.0 * 64.0);
        let Some(band) = FrequencyBand::from_hz(frequency_hz) else {
            continue;
        };

        peaks.push((
            band,
            FrequencyPeak {
                fft_pass_number,
                peak_magnitude: here.floor().clamp(0.0, u16::MAX as f64) as u16,
                corrected_peak_frequency_bin: corrected_bin.floor().clamp(0.0, u16::MAX as f64)
                    as u16,
                sample_rate_hz: PROCESSING_SAMPLE_RATE,
            },
        ));
    }

    peaks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::spectral::{BIN_COUNT, POWER_FLOOR};
    use crate::signature::spread::{empty_spread_ring, spread_into_ring, SPECTRA_RING_SIZE};

    fn quiet() -> Vec<f32> {
        vec![POWER_FLOOR; BIN_COUNT]
    }

    fn burst(bin: usize, power: f32) -> Vec<f32> {
        let mut spectrum = quiet();
        spectrum[bin - 1] = power / 4.0;
        spectrum[bin] = power;
        spectrum[bin + 1] = power / 4.0;
        spectrum
    }

    fn run_pipeline(spectra: &[Vec<f32>]) -> Vec<(FrequencyBand, FrequencyPeak)> {
        let mut raw = Ring::new(SPECTRA_RING_SIZE, quiet());
        let mut spread = empty_spread_ring();
        let mut peaks = Vec::new();

        for spectrum in spectra {
            raw.push(spectrum.clone());
            spread_into_ring(spectrum, &mut spread);
            peaks.extend(detect_peaks(&raw, &spread));
        }
        peaks
    }

    #[test]
    fn log_magnitude_is_floored_at_the_threshold() {
        assert_eq!(log_magnitude(0.0), log_magnitude(DETECTION_THRESHOLD));
        assert!(log_magnitude(1.0) > log_magnitude(DETECTION_THRESHOLD));
        // ln(1) = 0 maps straight to the additive constant.
        assert!((log_magnitude(1.0) - 6144.0).abs() < 1e-9);
    }

    #[test]
    fn lone_burst_is_detected_with_its_pass_number() {
        let burst_pass = 20;
        let mut spectra = vec![quiet(); 80];
        spectra[burst_pass] = burst(128, 1.0);

        let peaks = run_pipeline(&spectra);
        assert_eq!(peaks.len(), 1, "exactly the burst bin should survive");

        let (band, peak) = peaks[0];
        assert_eq!(band, FrequencyBand::Hz520To1450);
        assert_eq!(peak.fft_pass_number, burst_pass as u32);
        // Symmetric neighbors cancel the sub-bin correction: bin 128 exactly.
        assert_eq!(peak.corrected_peak_frequency_bin, 128 * 64);
        assert_eq!(peak.peak_magnitude, 6144);
        assert!((peak.frequency_hz() - 1000.0).abs() < 1e-6);
    }

    #[test]
    fn quiet_input_yields_no_peaks() {
        assert!(run_pipeline(&vec![quiet(); 120]).is_empty());
    }

    #[test]
    fn sub_threshold_burst_is_dropped() {
        let mut spectra = vec![quiet(); 80];
        spectra[20] = burst(128, DETECTION_THRESHOLD / 2.0);
        assert!(run_pipeline(&spectra).is_empty());
    }

    #[test]
    fn bursts_outside_the_frequency_gate_are_dropped() {
        // Bin 16 is 125 Hz, bin 960 is 7500 Hz; both clear every dominance
        // test but fall outside 250-5500 Hz.
        for bin in [16, 960] {
            let mut spectra = vec![quiet(); 80];
            spectra[20] = burst(bin, 1.0);
            assert!(
                run_pipeline(&spectra).is_empty(),
                "bin {bin} should be gated out"
            );
        }
    }

    #[test]
    fn stationary_energy_is_self_suppressed() {
        // A steady loud bin never rises above its own future spread frames.
        let spectra = vec![burst(128, 1.0); 160];
        assert!(run_pipeline(&spectra).is_empty());
    }

    #[test]
    fn detection_waits_for_the_delay_to_fill() {
        let mut raw = Ring::new(SPECTRA_RING_SIZE, quiet());
        let mut spread = empty_spread_ring();
        for _ in 0..(DETECTION_DELAY - 1) {
            raw.push(burst(128, 1.0));
            spread_into_ring(&burst(128, 1.0), &mut spread);
            assert!(detect_peaks(&raw, &spread).is_empty());
        }
    }
}
