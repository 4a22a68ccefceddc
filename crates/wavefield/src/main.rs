//! Wavefield - headless monitor for the audio-reactive particle pipeline.
//!
//! Drives the full core loop (capture -> spectral analysis -> bands ->
//! bars -> particle field) at 60 Hz without a renderer, printing band
//! meters so the pipeline can be exercised and profiled on any machine.

#![warn(missing_docs)]

mod logging_setup;

use anyhow::{Context, Result};
use clap::Parser;
use crossbeam_channel::Receiver;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};
use wavefield_core::{
    AnalysisConfig, AudioBackend, BandExtractor, BarTracker, CaptureEvent, MockBackend,
    ParticleConfig, ParticleField, ParticleSource, SpectralFrameBuffer,
};

/// Command-line options.
#[derive(Parser, Debug)]
#[command(name = "wavefield", version, about = "Audio-reactive particle field pipeline")]
struct Args {
    /// FFT size in bins (must be a power of two)
    #[arg(long, default_value_t = 2048)]
    fft_size: usize,

    /// Time-domain buffer length in samples
    #[arg(long, default_value_t = 4096)]
    buffer_size: usize,

    /// Particle population size
    #[arg(long, default_value_t = 200)]
    particles: usize,

    /// Feed a synthetic tone instead of opening the capture device
    #[arg(long)]
    mock: bool,

    /// Seconds to run; 0 runs until interrupted
    #[arg(long, default_value_t = 0)]
    duration: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging_setup::init(&args.log_level);

    let analysis = AnalysisConfig {
        buffer_size: args.buffer_size,
        fft_size: args.fft_size,
        ..Default::default()
    };
    let buffer = Arc::new(
        SpectralFrameBuffer::new(&analysis).context("invalid analysis configuration")?,
    );
    let audio = BandExtractor::new(buffer.clone());
    let mut field = ParticleField::new(ParticleConfig {
        count: args.particles,
        ..Default::default()
    })
    .context("invalid particle configuration")?;
    let mut bars = BarTracker::new(wavefield_core::bars::DEFAULT_BARS, buffer.as_ref());

    let (mut backend, capture_events) = create_backend(args.mock, buffer.clone());

    // Capture failure degrades to the all-zero idle state; the pipeline
    // keeps running either way
    if let Err(e) = backend.start() {
        error!("Capture unavailable, running idle: {}", e);
    }

    info!(
        "Pipeline running: fft_size={}, buffer_size={}, particles={}",
        args.fft_size, args.buffer_size, args.particles
    );

    let started = Instant::now();
    let deadline = (args.duration > 0).then(|| started + Duration::from_secs(args.duration));
    let mut tick: u64 = 0;

    loop {
        if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                break;
            }
        }

        if let Some(events) = &capture_events {
            for event in events.try_iter() {
                match event {
                    CaptureEvent::StreamError(msg) => warn!("Capture stream error: {}", msg),
                }
            }
        }

        let now = started.elapsed().as_secs_f64();
        bars.update(buffer.as_ref());
        field.update(now, &audio, bars.positions());

        tick += 1;
        if tick % 30 == 0 {
            print_meters(&audio);
        }

        std::thread::sleep(Duration::from_millis(16));
    }

    backend.stop();
    info!("Pipeline stopped after {} ticks", tick);
    Ok(())
}

#[cfg(feature = "capture")]
fn create_backend(
    mock: bool,
    buffer: Arc<SpectralFrameBuffer>,
) -> (Box<dyn AudioBackend>, Option<Receiver<CaptureEvent>>) {
    if mock {
        return (Box::new(MockBackend::new(buffer)), None);
    }
    let backend = wavefield_core::CpalBackend::new(buffer);
    let events = backend.events().clone();
    (Box::new(backend), Some(events))
}

#[cfg(not(feature = "capture"))]
fn create_backend(
    mock: bool,
    buffer: Arc<SpectralFrameBuffer>,
) -> (Box<dyn AudioBackend>, Option<Receiver<CaptureEvent>>) {
    if !mock {
        warn!("Built without capture support; using the synthetic tone source");
    }
    (Box::new(MockBackend::new(buffer)), None)
}

fn print_meters<S: wavefield_core::SpectrumSource + ?Sized>(audio: &BandExtractor<S>) {
    let bands = wavefield_core::BandRanges::default();
    println!(
        "bass {:<20} mid {:<20} high {:<20} energy {:.2}",
        meter(audio.band_average_hz(bands.bass.0, bands.bass.1)),
        meter(audio.band_average_hz(bands.mid.0, bands.mid.1)),
        meter(audio.band_average_hz(bands.high.0, bands.high.1)),
        audio.energy(),
    );
}

fn meter(value: f32) -> String {
    let filled = (value.clamp(0.0, 1.0) * 20.0).round() as usize;
    "#".repeat(filled)
}
