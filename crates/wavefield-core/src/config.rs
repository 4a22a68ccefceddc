//! Constructor-time configuration for the analysis and simulation pipeline.
//!
//! All tuning lives here rather than in hidden constants. Configuration is
//! immutable after construction; there is no runtime reconfiguration path.

use crate::{CoreError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for the spectral analysis pipeline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisConfig {
    /// Time-domain buffer length in samples
    pub buffer_size: usize,
    /// FFT size (must be a power of two)
    pub fft_size: usize,
    /// Pre-log magnitude multiplier (`K` in `ln(1 + mag*K) * G`)
    pub sensitivity: f32,
    /// Post-log output gain (`G` in `ln(1 + mag*K) * G`)
    pub gain: f32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            buffer_size: 4096,
            fft_size: 2048,
            sensitivity: 500.0,
            gain: 0.8,
        }
    }
}

impl AnalysisConfig {
    /// Validate the configuration, failing fast on startup errors
    pub fn validate(&self) -> Result<()> {
        if self.buffer_size == 0 {
            return Err(CoreError::InvalidConfig(
                "buffer_size must be non-zero".to_string(),
            ));
        }
        if self.fft_size < 2 || !self.fft_size.is_power_of_two() {
            return Err(CoreError::InvalidConfig(format!(
                "fft_size must be a power of two >= 2, got {}",
                self.fft_size
            )));
        }
        Ok(())
    }
}

/// Named frequency band boundaries in Hz
///
/// These are policy constants owned by the particle field, mapped to bins
/// through the fixed 10 Hz/bin approximation (see [`crate::BandExtractor`]).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BandRanges {
    /// Bass band `[lo, hi)` in Hz
    pub bass: (f32, f32),
    /// Mid band `[lo, hi)` in Hz
    pub mid: (f32, f32),
    /// High band `[lo, hi)` in Hz
    pub high: (f32, f32),
}

impl Default for BandRanges {
    fn default() -> Self {
        Self {
            bass: (0.0, 50.0),
            mid: (50.0, 500.0),
            high: (500.0, 2000.0),
        }
    }
}

/// Physics and population tuning for [`crate::ParticleField`]
///
/// Velocity-space constants are tuned for 60 Hz-equivalent motion; the
/// integrator multiplies by `dt * 60` so behavior is frame-rate independent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParticleConfig {
    /// Fixed population size (never grows or shrinks)
    pub count: usize,
    /// Downward acceleration applied to `velocity.y` each tick
    pub gravity: f32,
    /// Velocity damping multiplier per tick (< 1.0)
    pub drag: f32,
    /// Velocity magnitude kept after a wall bounce
    pub restitution: f32,
    /// Horizontal extent; particles bounce at `x = ±wall_x`
    pub wall_x: f32,
    /// Particles falling below this `y` respawn at the top
    pub respawn_floor: f32,
    /// Life lost per 60 Hz-equivalent tick
    pub life_decay: f32,
    /// Inverse-square repulsion strength for nearby repulsors
    pub repulsor_strength: f32,
    /// Upward impulse strength (`1/distance` falloff) near repulsors
    pub repulsor_lift: f32,
    /// Repulsors closer than this are ignored (singularity floor)
    pub repulsor_min_dist: f32,
    /// Repulsors farther than this exert no force
    pub repulsor_max_dist: f32,
    /// Horizontal jitter amplitude, scaled by the bass band
    pub jitter_x: f32,
    /// Vertical jitter amplitude, scaled by the bass band
    pub jitter_y: f32,
    /// Band boundaries driving color, size and jitter
    pub bands: BandRanges,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            count: 200,
            gravity: 0.0002,
            drag: 0.999,
            restitution: 0.7,
            wall_x: 1.3,
            respawn_floor: -1.5,
            life_decay: 0.0001,
            repulsor_strength: 0.0008,
            repulsor_lift: 0.001,
            repulsor_min_dist: 0.01,
            repulsor_max_dist: 0.3,
            jitter_x: 0.001,
            jitter_y: 0.0005,
            bands: BandRanges::default(),
        }
    }
}

impl ParticleConfig {
    /// Validate the configuration, failing fast on startup errors
    pub fn validate(&self) -> Result<()> {
        if self.count == 0 {
            return Err(CoreError::InvalidConfig(
                "particle count must be non-zero".to_string(),
            ));
        }
        if self.repulsor_min_dist <= 0.0 || self.repulsor_max_dist <= self.repulsor_min_dist {
            return Err(CoreError::InvalidConfig(
                "repulsor distance window must satisfy 0 < min < max".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_analysis_config_is_valid() {
        assert!(AnalysisConfig::default().validate().is_ok());
    }

    #[test]
    fn test_non_power_of_two_fft_rejected() {
        let config = AnalysisConfig {
            fft_size: 1000,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_buffer_rejected() {
        let config = AnalysisConfig {
            buffer_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_degenerate_fft_sizes_rejected() {
        for fft_size in [0, 1] {
            let config = AnalysisConfig {
                fft_size,
                ..Default::default()
            };
            assert!(config.validate().is_err(), "fft_size {} accepted", fft_size);
        }
    }

    #[test]
    fn test_zero_population_rejected() {
        let config = ParticleConfig {
            count: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_inverted_repulsor_window_rejected() {
        let config = ParticleConfig {
            repulsor_min_dist: 0.5,
            repulsor_max_dist: 0.3,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
