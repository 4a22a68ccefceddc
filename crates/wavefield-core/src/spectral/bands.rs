//! Scalar band/energy summaries derived from the shared spectrum.

use crate::config::BandRanges;
use crate::spectral::SpectrumSource;
use std::sync::Arc;

/// Fixed linear Hz-to-bin approximation.
///
/// Known simplification inherited from the original tuning: the real bin
/// width is `sample_rate / fft_size`, which only equals 10 Hz for a
/// 20480 Hz device at 2048 bins. Band boundaries are therefore nominal,
/// not calibrated; do not retarget without retuning every consumer.
pub const HZ_PER_BIN: f32 = 10.0;

/// Post-average visibility scale applied before clamping to 1.0.
const BAND_SCALE: f32 = 1.5;

/// RMS-to-energy scale applied before clamping to 1.0.
const ENERGY_SCALE: f32 = 8.0;

/// Named band values and global energy taken from one consistent view of
/// the frame, used as a per-tick snapshot by the particle field.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BandSnapshot {
    /// Bass band average in [0, 1]
    pub bass: f32,
    /// Mid band average in [0, 1]
    pub mid: f32,
    /// High band average in [0, 1]
    pub high: f32,
    /// Global loudness in [0, 1]
    pub energy: f32,
}

/// Derives scalar summaries (named band averages, global energy) from a
/// shared [`SpectrumSource`] on demand.
pub struct BandExtractor<S: SpectrumSource + ?Sized> {
    source: Arc<S>,
}

impl<S: SpectrumSource + ?Sized> BandExtractor<S> {
    /// Wrap a shared spectrum source.
    pub fn new(source: Arc<S>) -> Self {
        Self { source }
    }

    /// Average spectral magnitude over `[lo_hz, hi_hz)`, scaled into [0, 1].
    ///
    /// Maps Hz to bins via [`HZ_PER_BIN`], always excludes bin 0 (DC) and
    /// clips the end to the spectrum. Empty ranges yield 0.0.
    pub fn band_average_hz(&self, lo_hz: f32, hi_hz: f32) -> f32 {
        let (start, end) = self.hz_to_bins(lo_hz, hi_hz);
        if start >= end {
            return 0.0;
        }
        (self.source.band_average(start, end) * BAND_SCALE).min(1.0)
    }

    /// Named band values plus energy, all from one consistent view of
    /// the frame (a single lock acquisition on the shared buffer), so a
    /// concurrent ingest cannot mix bands from two frames.
    pub fn snapshot(&self, bands: &BandRanges) -> BandSnapshot {
        let ranges = [
            self.hz_to_bins(bands.bass.0, bands.bass.1),
            self.hz_to_bins(bands.mid.0, bands.mid.1),
            self.hz_to_bins(bands.high.0, bands.high.1),
        ];
        let mut averages = [0.0; 3];
        let rms = self.source.band_averages(&ranges, &mut averages);

        BandSnapshot {
            bass: (averages[0] * BAND_SCALE).min(1.0),
            mid: (averages[1] * BAND_SCALE).min(1.0),
            high: (averages[2] * BAND_SCALE).min(1.0),
            energy: (rms * ENERGY_SCALE).min(1.0),
        }
    }

    fn hz_to_bins(&self, lo_hz: f32, hi_hz: f32) -> (usize, usize) {
        let start = ((lo_hz / HZ_PER_BIN) as usize).max(1);
        let end = ((hi_hz / HZ_PER_BIN) as usize).min(self.source.spectrum_len().saturating_sub(1));
        (start, end)
    }

    /// Single "how loud right now" scalar in [0, 1].
    pub fn energy(&self) -> f32 {
        (self.source.rms() * ENERGY_SCALE).min(1.0)
    }

    /// RMS amplitude of the time-domain buffer, unscaled.
    pub fn rms(&self) -> f32 {
        self.source.rms()
    }

    /// The underlying source, for consumers that need raw spectrum access.
    pub fn source(&self) -> &Arc<S> {
        &self.source
    }
}

impl<S: SpectrumSource + ?Sized> Clone for BandExtractor<S> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
        }
    }
}
