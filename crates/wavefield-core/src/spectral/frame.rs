//! Thread-safe store for the latest time-domain chunk and derived spectrum.

use crate::config::AnalysisConfig;
use crate::spectral::{SpectralAnalyzer, SpectrumSource};
use crate::Result;
use parking_lot::Mutex;

struct FrameState {
    time_domain: Vec<f32>,
    spectrum: Vec<f32>,
    analyzer: SpectralAnalyzer,
}

/// Single-writer / multi-reader store shared between the capture callback
/// and any number of consumers.
///
/// One mutex guards the time-domain and spectrum arrays together, so the
/// pair is always observed consistently. The writer ([`ingest`]) holds the
/// lock for the full window+FFT+magnitude computation (bounded,
/// `O(fft_size log fft_size)`); readers hold it only for the duration of a
/// copy-out. The spectrum is published as the final step of analysis, so a
/// reader sees either the previous complete frame or the new one, never a
/// partial frame.
///
/// Before the first ingest both arrays are all zeros — a valid idle state,
/// not an error.
///
/// [`ingest`]: SpectralFrameBuffer::ingest
pub struct SpectralFrameBuffer {
    state: Mutex<FrameState>,
    buffer_size: usize,
    fft_size: usize,
}

impl SpectralFrameBuffer {
    /// Create an idle (all-zero) frame buffer.
    pub fn new(config: &AnalysisConfig) -> Result<Self> {
        let analyzer = SpectralAnalyzer::new(config)?;
        Ok(Self {
            state: Mutex::new(FrameState {
                time_domain: vec![0.0; config.buffer_size],
                spectrum: vec![0.0; config.fft_size],
                analyzer,
            }),
            buffer_size: config.buffer_size,
            fft_size: config.fft_size,
        })
    }

    /// Ingest one captured chunk and synchronously derive its spectrum.
    ///
    /// Called by the capture source whenever new audio arrives; chunk
    /// length and cadence are driver-determined. Copies up to
    /// `buffer_size` samples over the front of the time-domain buffer
    /// (replacing prior content up to the copied length), then runs the
    /// analyzer and publishes the new spectrum. Non-finite samples are
    /// stored as silence. Empty chunks are ignored.
    pub fn ingest(&self, samples: &[f32]) {
        if samples.is_empty() {
            return;
        }

        let mut state = self.state.lock();
        let state = &mut *state;

        let n = samples.len().min(self.buffer_size);
        for (dst, &src) in state.time_domain[..n].iter_mut().zip(samples) {
            *dst = if src.is_finite() { src } else { 0.0 };
        }

        state.spectrum.copy_from_slice(state.analyzer.analyze(samples));
    }
}

impl SpectrumSource for SpectralFrameBuffer {
    fn read_spectrum(&self, out: &mut [f32]) {
        let state = self.state.lock();
        let n = out.len().min(state.spectrum.len());
        out[..n].copy_from_slice(&state.spectrum[..n]);
    }

    fn read_time_domain(&self, out: &mut [f32]) {
        let state = self.state.lock();
        let n = out.len().min(state.time_domain.len());
        out[..n].copy_from_slice(&state.time_domain[..n]);
    }

    fn rms(&self) -> f32 {
        let state = self.state.lock();
        rms_of(&state.time_domain)
    }

    fn band_average(&self, start_bin: usize, end_bin: usize) -> f32 {
        let state = self.state.lock();
        mean_of(&state.spectrum, start_bin, end_bin)
    }

    fn band_averages(&self, ranges: &[(usize, usize)], out: &mut [f32]) -> f32 {
        // One acquisition for the whole set: a concurrent ingest cannot
        // land between the band reads and the RMS
        let state = self.state.lock();
        for (slot, &(start, end)) in out.iter_mut().zip(ranges) {
            *slot = mean_of(&state.spectrum, start, end);
        }
        rms_of(&state.time_domain)
    }

    fn spectrum_len(&self) -> usize {
        self.fft_size
    }

    fn time_domain_len(&self) -> usize {
        self.buffer_size
    }
}

fn rms_of(time_domain: &[f32]) -> f32 {
    let sum: f32 = time_domain.iter().map(|s| s * s).sum();
    (sum / time_domain.len() as f32).sqrt()
}

fn mean_of(spectrum: &[f32], start_bin: usize, end_bin: usize) -> f32 {
    let end = end_bin.min(spectrum.len());
    if start_bin >= end {
        return 0.0;
    }
    let slice = &spectrum[start_bin..end];
    slice.iter().sum::<f32>() / slice.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn buffer() -> SpectralFrameBuffer {
        SpectralFrameBuffer::new(&AnalysisConfig::default()).unwrap()
    }

    #[test]
    fn test_idle_default_is_all_zero() {
        let buf = buffer();

        let mut spectrum = vec![1.0; 2048];
        buf.read_spectrum(&mut spectrum);
        assert!(spectrum.iter().all(|&s| s == 0.0));

        let mut time = vec![1.0; 4096];
        buf.read_time_domain(&mut time);
        assert!(time.iter().all(|&s| s == 0.0));

        assert_eq!(buf.rms(), 0.0);
    }

    #[test]
    fn test_rms_constant_amplitude() {
        let buf = buffer();
        buf.ingest(&vec![0.25; 4096]);
        assert!((buf.rms() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_rms_partial_chunk_averages_over_full_buffer() {
        // RMS is defined over the whole time-domain buffer, so a chunk
        // shorter than buffer_size dilutes into the zero-initialized tail
        let buf = buffer();
        buf.ingest(&vec![1.0; 1024]);
        let expected = (1024.0f32 / 4096.0).sqrt();
        assert!((buf.rms() - expected).abs() < 1e-6);
    }

    #[test]
    fn test_short_destination_copy_out() {
        let buf = buffer();
        buf.ingest(&vec![0.5; 4096]);

        let mut small = vec![-1.0; 16];
        buf.read_time_domain(&mut small);
        assert!(small.iter().all(|&s| s == 0.5));
    }

    #[test]
    fn test_long_destination_leaves_tail_untouched() {
        let buf = buffer();
        let mut big = vec![-1.0; 3000];
        buf.read_spectrum(&mut big);
        assert!(big[..2048].iter().all(|&s| s == 0.0));
        assert!(big[2048..].iter().all(|&s| s == -1.0));
    }

    #[test]
    fn test_band_average_empty_range_is_zero() {
        let buf = buffer();
        buf.ingest(&vec![0.5; 2048]);
        assert_eq!(buf.band_average(10, 10), 0.0);
        assert_eq!(buf.band_average(50, 10), 0.0);
        assert_eq!(buf.band_average(5000, 9000), 0.0);
    }

    #[test]
    fn test_band_average_clips_end_to_spectrum() {
        let buf = buffer();
        buf.ingest(&vec![0.5; 2048]);
        // Huge end index clips to fft_size instead of reading out of bounds
        let clipped = buf.band_average(1, usize::MAX);
        let full = buf.band_average(1, 2048);
        assert_eq!(clipped, full);
    }

    #[test]
    fn test_band_averages_matches_piecewise_reads() {
        let buf = buffer();
        let chunk: Vec<f32> = (0..2048).map(|i| (i as f32 * 0.01).sin()).collect();
        buf.ingest(&chunk);

        let ranges = [(1, 50), (50, 500), (5000, 9000)];
        let mut grouped = [0.0; 3];
        let rms = buf.band_averages(&ranges, &mut grouped);

        assert!((rms - buf.rms()).abs() < 1e-9);
        for (&(start, end), &got) in ranges.iter().zip(&grouped) {
            assert_eq!(got, buf.band_average(start, end));
        }
        // Empty-after-clipping range is still exactly zero
        assert_eq!(grouped[2], 0.0);
    }

    #[test]
    fn test_concurrent_ingest_and_read() {
        use std::sync::Arc;
        use std::thread;

        let buf = Arc::new(buffer());
        let writer = {
            let buf = buf.clone();
            thread::spawn(move || {
                let chunk: Vec<f32> = (0..2048).map(|i| (i as f32 * 0.01).sin()).collect();
                for _ in 0..200 {
                    buf.ingest(&chunk);
                }
            })
        };

        let mut out = vec![0.0; 2048];
        for _ in 0..200 {
            buf.read_spectrum(&mut out);
            assert!(out.iter().all(|s| s.is_finite()));
            let _ = buf.rms();
        }
        writer.join().unwrap();
    }

    proptest! {
        #[test]
        fn prop_copy_out_exact_min_len(dst_len in 0usize..5000) {
            let buf = buffer();
            buf.ingest(&vec![0.5; 4096]);

            let mut out = vec![f32::MIN; dst_len];
            buf.read_time_domain(&mut out);

            let copied = dst_len.min(4096);
            prop_assert!(out[..copied].iter().all(|&s| s == 0.5));
            prop_assert!(out[copied..].iter().all(|&s| s == f32::MIN));
        }
    }
}
