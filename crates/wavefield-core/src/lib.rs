//! Wavefield Core - Real-Time Audio Analysis and Particle Simulation
//!
//! This crate contains the core pipeline for wavefield:
//! - Capture-thread sample buffering and FFT spectral analysis
//! - Frequency band / RMS extraction
//! - Audio-reactive particle field physics
//! - Capture backends feeding the pipeline
//!
//! Rendering, shaders and window management live in consumer crates; they
//! only ever see the read-only [`SpectrumSource`] and [`ParticleSource`]
//! surfaces.

#![warn(missing_docs)]

pub use glam::{Vec2, Vec3};
use thiserror::Error;

pub mod bars;
pub mod capture;
pub mod config;
pub mod field;
pub mod spectral;

// --- Re-exports grouped by category ---

// Spectral pipeline
pub use spectral::{
    BandExtractor, BandSnapshot, SpectralAnalyzer, SpectralFrameBuffer, SpectrumSource,
};

// Particle simulation
pub use field::{Particle, ParticleField, ParticleSource, PARTICLE_FLOATS};

// Repulsor tracking
pub use bars::BarTracker;

// Capture
pub use capture::{AudioBackend, CaptureEvent};
#[cfg(feature = "capture")]
pub use capture::cpal_backend::CpalBackend;
#[cfg(feature = "mock-audio")]
pub use capture::mock_backend::MockBackend;

// Configuration
pub use config::{AnalysisConfig, BandRanges, ParticleConfig};

/// Core error types
#[derive(Error, Debug)]
pub enum CoreError {
    /// Invalid constructor-time configuration; the pipeline cannot run
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The capture device could not be opened or started
    #[error("Capture unavailable: {0}")]
    CaptureUnavailable(String),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
