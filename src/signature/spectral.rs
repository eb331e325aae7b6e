//! Windowed power-spectrum computation.
//!
//! Each 128-sample hop re-analyzes the full 2048-sample window: Hann
//! windowing, a 2048-point forward FFT, and a 1025-bin power spectrum with a
//! small floor so later log-domain math never sees zero.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;

/// Analysis window length in samples.
pub const WINDOW_SIZE: usize = 2048;

/// Samples consumed per FFT pass.
pub const HOP_SIZE: usize = 128;

/// Retained spectrum bins (DC through Nyquist).
pub const BIN_COUNT: usize = WINDOW_SIZE / 2 + 1;

/// Lower clamp applied to every power value.
pub const POWER_FLOOR: f32 = 1e-10;

/// FFT front-end with a precomputed window and reusable scratch space.
pub struct SpectralAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
}

impl SpectralAnalyzer {
    pub fn new() -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(WINDOW_SIZE);
        let scratch_len = fft.get_inplace_scratch_len();

        Self {
            fft,
            window: hann_window(WINDOW_SIZE),
            buffer: vec![Complex::new(0.0, 0.0); WINDOW_SIZE],
            scratch: vec![Complex::new(0.0, 0.0); scratch_len],
        }
    }

    /// Compute the floored power spectrum of one time-ordered window.
    pub fn power_spectrum(&mut self, samples: &[i16]) -> Vec<f32> {
        debug_assert_eq!(samples.len(), WINDOW_SIZE);

        for (slot, (&sample, &weight)) in self
            .buffer
            .iter_mut()
            .zip(samples.iter().zip(self.window.iter()))
        {
            *slot = Complex::new(sample as f32 * weight, 0.0);
        }

        self.fft.process_with_scratch(&mut self.buffer, &mut self.scratch);

        self.buffer[..BIN_COUNT]
            .iter()
            .map(|c| (c.re * c.re + c.im * c.im).max(POWER_FLOOR))
            .collect()
    }
}

impl Default for SpectralAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Symmetric Hann window: 0.5 * (1 - cos(2 pi n / (N - 1))).
fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|n| 0.5 * (1.0 - (2.0 * PI * n as f32 / (size as f32 - 1.0)).cos()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spectrum_has_expected_shape_and_floor() {
        let mut analyzer = SpectralAnalyzer::new();
        let spectrum = analyzer.power_spectrum(&[0i16; WINDOW_SIZE]);

        assert_eq!(spectrum.len(), BIN_COUNT);
        assert!(spectrum.iter().all(|&p| p == POWER_FLOOR));
    }

    #[test]
    fn tone_energy_lands_on_its_bin() {
        // Bin 128 is exactly 1000 Hz at 16 kHz with a 2048-point window.
        let samples: Vec<i16> = (0..WINDOW_SIZE)
            .map(|n| (12000.0 * (2.0 * PI * 128.0 * n as f32 / WINDOW_SIZE as f32).sin()) as i16)
            .collect();

        let mut analyzer = SpectralAnalyzer::new();
        let spectrum = analyzer.power_spectrum(&samples);

        let loudest = spectrum
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(bin, _)| bin)
            .unwrap();
        assert_eq!(loudest, 128);

        // Energy well away from the tone stays orders of magnitude lower.
        assert!(spectrum[512] < spectrum[128] / 1e6);
    }

    #[test]
    fn hann_window_endpoints_and_center() {
        let window = hann_window(WINDOW_SIZE);
        assert!(window[0].abs() < 1e-6);
        assert!(window[WINDOW_SIZE - 1].abs() < 1e-6);
        assert!((window[WINDOW_SIZE / 2] - 1.0).abs() < 1e-3);
    }
}
