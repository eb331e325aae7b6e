//! Chunked signature assembly.
//!
//! The assembler owns every piece of pipeline state: the pending input
//! queue, the 2048-sample window ring, the spectral analyzer, both spectra
//! rings and the in-progress signature. Driving it is explicit and
//! synchronous: feed samples in, take signatures out. One assembler per
//! input stream; nothing is shared.

use std::collections::VecDeque;

use tracing::debug;

use super::peaks::detect_peaks;
use super::ring::Ring;
use super::spectral::{SpectralAnalyzer, HOP_SIZE, WINDOW_SIZE};
use super::spread::{empty_spread_ring, spread_into_ring, SPECTRA_RING_SIZE};
use super::{Signature, PROCESSING_SAMPLE_RATE};

/// A chunk is detached once it covers this much audio...
pub const MAX_TIME_SECONDS: f64 = 3.1;

/// ...or holds this many peaks, whichever trips first.
pub const MAX_PEAKS: usize = 255;

/// Streaming signature generator for 16 kHz mono i16 PCM.
pub struct SignatureAssembler {
    pending: VecDeque<i16>,
    sample_ring: Ring<i16>,
    analyzer: SpectralAnalyzer,
    raw_ring: Ring<Vec<f32>>,
    spread_ring: Ring<Vec<f32>>,
    signature: Signature,
    stream_offset_samples: u64,
}

impl SignatureAssembler {
    pub fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            sample_ring: Ring::new(WINDOW_SIZE, 0),
            analyzer: SpectralAnalyzer::new(),
            raw_ring: empty_raw_ring(),
            spread_ring: empty_spread_ring(),
            signature: empty_signature(),
            stream_offset_samples: 0,
        }
    }

    /// Queue raw samples. May be called incrementally with any block size;
    /// only whole 128-sample hops are ever consumed.
    pub fn feed_input(&mut self, samples: &[i16]) {
        self.pending.extend(samples.iter().copied());
    }

    /// Drive the pipeline over the queued input.
    ///
    /// Returns the next signature chunk once it reaches an emission limit
    /// (3.1 s of audio or 255 peaks). Returns `None` when the queue cannot
    /// fill another hop before a limit trips; accumulated state is kept so
    /// feeding continues seamlessly. Call until `None` to drain.
    pub fn try_take(&mut self) -> Option<Signature> {
        if self.pending.len() < HOP_SIZE {
            return None;
        }
        while self.pending.len() >= HOP_SIZE {
            self.process_hop();
            if self.limit_reached() {
                return Some(self.detach("limit"));
            }
        }
        None
    }

    /// Detach whatever has accumulated at end of stream.
    ///
    /// Consumes any remaining whole hops first (still honoring the emission
    /// limits), then returns the partial chunk, or `None` if no samples were
    /// consumed since the last emission. Sub-hop leftovers stay queued.
    pub fn flush(&mut self) -> Option<Signature> {
        while self.pending.len() >= HOP_SIZE {
            self.process_hop();
            if self.limit_reached() {
                return Some(self.detach("limit"));
            }
        }
        if self.signature.number_samples == 0 {
            return None;
        }
        Some(self.detach("flush"))
    }

    /// Seconds of input consumed so far, across all emitted chunks. The
    /// offset at emission time minus the chunk's own duration locates the
    /// chunk in the source stream.
    pub fn stream_offset_seconds(&self) -> f64 {
        self.stream_offset_samples as f64 / PROCESSING_SAMPLE_RATE as f64
    }

    fn process_hop(&mut self) {
        let hop: Vec<i16> = self.pending.drain(..HOP_SIZE).collect();
        self.sample_ring.extend_from_slice(&hop);

        let window = self.sample_ring.snapshot_timeordered();
        let power = self.analyzer.power_spectrum(&window);
        self.raw_ring.push(power.clone());
        spread_into_ring(&power, &mut self.spread_ring);

        for (band, peak) in detect_peaks(&self.raw_ring, &self.spread_ring) {
            self.signature.band_to_peaks.entry(band).or_default().push(peak);
        }

        self.signature.number_samples += HOP_SIZE as u32;
        self.stream_offset_samples += HOP_SIZE as u64;
    }

    fn limit_reached(&self) -> bool {
        let seconds = self.signature.number_samples as f64 / PROCESSING_SAMPLE_RATE as f64;
        seconds >= MAX_TIME_SECONDS || self.signature.peak_count() >= MAX_PEAKS
    }

    /// Hand the current signature to the caller and zero all DSP state.
    fn detach(&mut self, cause: &str) -> Signature {
        let detached = std::mem::replace(&mut self.signature, empty_signature());

        self.sample_ring = Ring::new(WINDOW_SIZE, 0);
        self.raw_ring = empty_raw_ring();
        self.spread_ring = empty_spread_ring();

        debug!(
            cause,
            number_samples = detached.number_samples,
            peaks = detached.peak_count(),
            stream_offset_seconds = self.stream_offset_seconds(),
            "signature chunk detached"
        );
        detached
    }
}

impl Default for SignatureAssembler {
    fn default() -> Self {
        Self::new()
    }
}

fn empty_signature() -> Signature {
    Signature {
        sample_rate_hz: PROCESSING_SAMPLE_RATE,
        number_samples: 0,
        band_to_peaks: Default::default(),
    }
}

fn empty_raw_ring() -> Ring<Vec<f32>> {
    Ring::new(SPECTRA_RING_SIZE, vec![0.0; super::spectral::BIN_COUNT])
}
