//! Spectral analysis pipeline: windowing, FFT, shared frame store and
//! band extraction.
//!
//! The capture callback pushes chunks into [`SpectralFrameBuffer::ingest`];
//! everything downstream (renderers, the particle field) reads through the
//! narrow [`SpectrumSource`] surface and never mutates analysis state.

pub mod analyzer;
pub mod bands;
pub mod frame;

pub use analyzer::SpectralAnalyzer;
pub use bands::{BandExtractor, BandSnapshot, HZ_PER_BIN};
pub use frame::SpectralFrameBuffer;

/// Read-only access to the latest analysis frame.
///
/// Implemented by [`SpectralFrameBuffer`]; consumed by renderer variants
/// and the particle field. All methods take snapshots; none block beyond
/// the duration of a copy-out.
pub trait SpectrumSource: Send + Sync {
    /// Copy the log-compressed magnitude spectrum into `out`.
    ///
    /// Copies `min(out.len(), spectrum_len())` elements; the remainder of
    /// `out` is left untouched.
    fn read_spectrum(&self, out: &mut [f32]);

    /// Copy the most recent time-domain samples into `out`.
    ///
    /// Copies `min(out.len(), time_domain_len())` elements; the remainder
    /// of `out` is left untouched.
    fn read_time_domain(&self, out: &mut [f32]);

    /// Root-mean-square amplitude of the time-domain buffer.
    fn rms(&self) -> f32;

    /// Mean of `spectrum[start_bin..end_bin)`, clipped to the valid bin
    /// range. Returns 0.0 when the clipped range is empty.
    fn band_average(&self, start_bin: usize, end_bin: usize) -> f32;

    /// Mean magnitudes for several bin ranges plus the RMS amplitude,
    /// written from one consistent view of the frame.
    ///
    /// Fills `out[i]` with the average over `ranges[i]` (same clipping
    /// rules as [`band_average`]) and returns the RMS. Implementations
    /// backed by a lock must evaluate everything under a single
    /// acquisition so the values cannot mix two frames; the default
    /// reads piecewise and offers no such guarantee.
    ///
    /// [`band_average`]: SpectrumSource::band_average
    fn band_averages(&self, ranges: &[(usize, usize)], out: &mut [f32]) -> f32 {
        for (slot, &(start, end)) in out.iter_mut().zip(ranges) {
            *slot = self.band_average(start, end);
        }
        self.rms()
    }

    /// Number of spectrum bins.
    fn spectrum_len(&self) -> usize;

    /// Number of time-domain samples.
    fn time_domain_len(&self) -> usize;
}
