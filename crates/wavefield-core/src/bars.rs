//! Smoothed spectrum-bar model whose bar tips act as particle repulsors.
//!
//! This is the simulation-side remnant of the bar visualization: the
//! renderer draws whatever it likes, but the attack/decay-smoothed bar
//! heights and their normalized tip positions are core state because the
//! particle field consumes them as repulsor points.

use crate::spectral::SpectrumSource;
use glam::Vec2;

/// Default number of bars across the viewport.
pub const DEFAULT_BARS: usize = 64;

// Asymmetric smoothing: fast rise on transients, slow fall.
const ATTACK: f32 = 0.6;
const DECAY: f32 = 0.06;

// Perceptual response applied to raw magnitudes before smoothing.
const RESPONSE_SCALE: f32 = 6.0;

/// Tracks per-bar smoothed spectrum intensity and exposes bar tip
/// positions in normalized viewport space.
pub struct BarTracker {
    smoothed: Vec<f32>,
    positions: Vec<Vec2>,
    spectrum: Vec<f32>,
}

impl BarTracker {
    /// Create a tracker with `bars` slots, all at rest.
    pub fn new(bars: usize, source: &dyn SpectrumSource) -> Self {
        let bar_width = 2.0 / bars as f32;
        let positions = (0..bars)
            .map(|i| Vec2::new(-1.0 + i as f32 * bar_width + bar_width * 0.5, -1.0))
            .collect();
        Self {
            smoothed: vec![0.0; bars],
            positions,
            spectrum: vec![0.0; source.spectrum_len()],
        }
    }

    /// Pull the current spectrum and advance the smoothed bar heights.
    pub fn update(&mut self, source: &dyn SpectrumSource) {
        source.read_spectrum(&mut self.spectrum);

        let bars = self.smoothed.len();
        let bar_width = 2.0 / bars as f32;

        for (i, smoothed) in self.smoothed.iter_mut().enumerate() {
            // Even distribution of bins across bars
            let bin = (i * self.spectrum.len() / bars).min(self.spectrum.len() - 1);
            let raw = self.spectrum[bin].abs();
            let magnitude = (raw.sqrt() * RESPONSE_SCALE).min(1.0);

            let rate = if magnitude > *smoothed { ATTACK } else { DECAY };
            *smoothed += (magnitude - *smoothed) * rate;

            self.positions[i] = Vec2::new(
                -1.0 + i as f32 * bar_width + bar_width * 0.5,
                -1.0 + *smoothed * 0.5,
            );
        }
    }

    /// Bar tip positions, one per bar, index-stable across updates.
    pub fn positions(&self) -> &[Vec2] {
        &self.positions
    }

    /// Smoothed bar intensities in [0, 1].
    pub fn heights(&self) -> &[f32] {
        &self.smoothed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::spectral::SpectralFrameBuffer;

    fn buffer() -> SpectralFrameBuffer {
        SpectralFrameBuffer::new(&AnalysisConfig::default()).unwrap()
    }

    #[test]
    fn test_idle_bars_rest_at_bottom() {
        let buf = buffer();
        let tracker = BarTracker::new(DEFAULT_BARS, &buf);
        assert_eq!(tracker.positions().len(), DEFAULT_BARS);
        assert!(tracker.heights().iter().all(|&h| h == 0.0));
        assert!(tracker.positions().iter().all(|p| p.y == -1.0));
    }

    #[test]
    fn test_positions_span_viewport() {
        let buf = buffer();
        let tracker = BarTracker::new(DEFAULT_BARS, &buf);
        let first = tracker.positions()[0];
        let last = tracker.positions()[DEFAULT_BARS - 1];
        assert!(first.x > -1.0 && first.x < -0.9);
        assert!(last.x < 1.0 && last.x > 0.9);
    }

    #[test]
    fn test_attack_faster_than_decay() {
        let buf = buffer();
        buf.ingest(&vec![0.8; 2048]);
        let mut tracker = BarTracker::new(8, &buf);

        tracker.update(&buf);
        let risen = tracker.heights()[0];
        assert!(risen > 0.0);

        // Silence again: bars decay, but far slower than they rose
        buf.ingest(&vec![0.0; 4096]);
        tracker.update(&buf);
        let fallen = tracker.heights()[0];
        assert!(fallen < risen);
        assert!(fallen > risen * 0.9);
    }

    #[test]
    fn test_bar_tips_rise_with_signal() {
        let buf = buffer();
        buf.ingest(&vec![0.8; 2048]);
        let mut tracker = BarTracker::new(16, &buf);
        for _ in 0..20 {
            tracker.update(&buf);
        }
        assert!(tracker.positions().iter().any(|p| p.y > -1.0));
        assert!(tracker.positions().iter().all(|p| p.y <= -0.5 + 1e-6));
    }
}
