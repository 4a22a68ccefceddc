//! Windowing + FFT + log-compression, run once per captured chunk.

use crate::config::AnalysisConfig;
use crate::Result;
use num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;
use tracing::debug;

/// Hann window coefficient for sample `index` of a chunk of length `len`.
///
/// A single-sample chunk has no defined window shape; it passes through
/// unattenuated rather than dividing by zero.
pub fn hann_window(index: usize, len: usize) -> f32 {
    if len <= 1 {
        return 1.0;
    }
    0.5 * (1.0 - (2.0 * PI * index as f32 / (len - 1) as f32).cos())
}

/// FFT-based spectral analyzer.
///
/// Invoked by [`crate::SpectralFrameBuffer::ingest`] for every captured
/// chunk. Owns all FFT working memory so a frame is computed completely
/// before it is published; no allocation happens on the audio path.
pub struct SpectralAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    config: AnalysisConfig,
    fft_buffer: Vec<Complex<f32>>,
    scratch_buffer: Vec<Complex<f32>>,
    magnitude_buffer: Vec<f32>,
    chunk_count: u64,
}

impl SpectralAnalyzer {
    /// Plan the FFT and allocate working buffers.
    ///
    /// Fails fast on an invalid configuration (non-power-of-two FFT size,
    /// zero-length buffers).
    pub fn new(config: &AnalysisConfig) -> Result<Self> {
        config.validate()?;

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(config.fft_size);

        debug!(
            "SpectralAnalyzer created: fft_size={}, sensitivity={}, gain={}",
            config.fft_size, config.sensitivity, config.gain
        );

        Ok(Self {
            fft,
            config: config.clone(),
            fft_buffer: vec![Complex::new(0.0, 0.0); config.fft_size],
            scratch_buffer: vec![Complex::new(0.0, 0.0); config.fft_size],
            magnitude_buffer: vec![0.0; config.fft_size],
            chunk_count: 0,
        })
    }

    /// Analyze one chunk and return the log-compressed magnitude spectrum.
    ///
    /// Windows the first `min(chunk.len(), fft_size)` samples with a Hann
    /// window, zero-pads the rest, runs the forward FFT and compresses
    /// each bin as `ln(1 + mag * sensitivity) * gain`. Non-finite input
    /// samples are treated as silence so they cannot contaminate the
    /// spectrum.
    ///
    /// The returned slice is valid until the next call.
    pub fn analyze(&mut self, chunk: &[f32]) -> &[f32] {
        let fft_size = self.config.fft_size;
        let n = chunk.len().min(fft_size);

        for i in 0..n {
            let sample = if chunk[i].is_finite() { chunk[i] } else { 0.0 };
            self.fft_buffer[i] = Complex::new(sample * hann_window(i, n), 0.0);
        }
        for slot in &mut self.fft_buffer[n..] {
            *slot = Complex::new(0.0, 0.0);
        }

        self.fft
            .process_with_scratch(&mut self.fft_buffer, &mut self.scratch_buffer);

        for (mag, bin) in self.magnitude_buffer.iter_mut().zip(&self.fft_buffer) {
            *mag = (1.0 + bin.norm() * self.config.sensitivity).ln() * self.config.gain;
        }

        self.chunk_count += 1;
        if self.chunk_count % 512 == 0 {
            debug!("SpectralAnalyzer: {} chunks analyzed", self.chunk_count);
        }

        &self.magnitude_buffer
    }

    /// FFT size in bins.
    pub fn fft_size(&self) -> usize {
        self.config.fft_size
    }
}
