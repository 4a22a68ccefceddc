//! End-to-end pipeline tests: ingest -> spectrum -> bands -> particles.

use std::f32::consts::PI;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use wavefield_core::{
    AnalysisConfig, BandExtractor, BarTracker, ParticleConfig, ParticleField, ParticleSource,
    SpectralFrameBuffer, SpectrumSource,
};

fn sine_chunk(len: usize, cycles: f32, amplitude: f32) -> Vec<f32> {
    (0..len)
        .map(|i| amplitude * (2.0 * PI * cycles * i as f32 / len as f32).sin())
        .collect()
}

#[test]
fn test_sine_ingest_produces_dominant_bin() {
    // buffer_size == chunk length so RMS is measured over the exact chunk
    let config = AnalysisConfig {
        buffer_size: 2048,
        fft_size: 2048,
        ..Default::default()
    };
    let buffer = SpectralFrameBuffer::new(&config).unwrap();

    let amplitude = 0.5;
    buffer.ingest(&sine_chunk(2048, 5.0, amplitude));

    let mut spectrum = vec![0.0; 2048];
    buffer.read_spectrum(&mut spectrum);

    // Bin 5 dominates everything more than 2 bins away (first half; the
    // upper half mirrors it)
    for (j, &mag) in spectrum.iter().enumerate().take(1024) {
        if j.abs_diff(5) > 2 {
            assert!(
                spectrum[5] > mag,
                "spectrum[5]={} not dominant over spectrum[{}]={}",
                spectrum[5],
                j,
                mag
            );
        }
    }

    let expected_rms = amplitude / 2.0f32.sqrt();
    assert!(
        (buffer.rms() - expected_rms).abs() < 1e-3,
        "rms {} != {}",
        buffer.rms(),
        expected_rms
    );
}

#[test]
fn test_idle_pipeline_is_silent_and_valid() {
    let buffer = Arc::new(SpectralFrameBuffer::new(&AnalysisConfig::default()).unwrap());
    let audio = BandExtractor::new(buffer.clone());
    let mut field = ParticleField::new(ParticleConfig::default()).unwrap();

    // No capture source ever started: not an error, just zeroes
    assert_eq!(buffer.rms(), 0.0);
    assert_eq!(audio.energy(), 0.0);
    assert_eq!(audio.band_average_hz(0.0, 2000.0), 0.0);

    // The simulation still runs on silence
    for tick in 1..100 {
        field.update(tick as f64 * 0.016, &audio, &[]);
    }
    assert_eq!(field.particles().len(), 200);
}

#[test]
fn test_band_extraction_tracks_tone_band() {
    let config = AnalysisConfig::default();
    let buffer = Arc::new(SpectralFrameBuffer::new(&config).unwrap());
    let audio = BandExtractor::new(buffer.clone());

    // 25 cycles over a 2048-sample window lands in bin 25, nominally
    // 250 Hz under the fixed 10 Hz/bin mapping: squarely in the mid band
    buffer.ingest(&sine_chunk(2048, 25.0, 0.8));

    let bass = audio.band_average_hz(0.0, 50.0);
    let mid = audio.band_average_hz(50.0, 500.0);
    let high = audio.band_average_hz(500.0, 2000.0);

    assert!(mid > high, "mid {} not above high {}", mid, high);
    assert!(mid > 0.0);
    assert!(bass <= 1.0 && mid <= 1.0 && high <= 1.0);
}

#[test]
fn test_live_ingest_races_with_simulation() {
    let buffer = Arc::new(SpectralFrameBuffer::new(&AnalysisConfig::default()).unwrap());
    let audio = BandExtractor::new(buffer.clone());
    let mut field = ParticleField::new(ParticleConfig {
        count: 100,
        ..Default::default()
    })
    .unwrap();
    let mut bars = BarTracker::new(64, buffer.as_ref());

    let writer = {
        let buffer = buffer.clone();
        thread::spawn(move || {
            let chunk = sine_chunk(1024, 30.0, 0.7);
            for _ in 0..300 {
                buffer.ingest(&chunk);
                thread::sleep(Duration::from_micros(200));
            }
        })
    };

    let mut vertex_data = vec![0.0f32; 100 * wavefield_core::PARTICLE_FLOATS];
    for tick in 1..300 {
        bars.update(buffer.as_ref());
        field.update(tick as f64 * 0.005, &audio, bars.positions());

        assert_eq!(field.particles().len(), 100);
        let written = field.write_vertex_data(&mut vertex_data);
        assert_eq!(written, vertex_data.len());
        assert!(vertex_data.iter().all(|f| f.is_finite()));
    }

    writer.join().unwrap();
}

#[cfg(feature = "mock-audio")]
#[test]
fn test_mock_backend_drives_pipeline() {
    use wavefield_core::{AudioBackend, MockBackend};

    let buffer = Arc::new(SpectralFrameBuffer::new(&AnalysisConfig::default()).unwrap());
    let audio = BandExtractor::new(buffer.clone());

    let mut backend = MockBackend::new(buffer.clone());
    backend.interval = Duration::from_millis(2);
    backend.start().unwrap();
    assert!(backend.is_running());

    // Give the worker a few deliveries
    thread::sleep(Duration::from_millis(50));
    backend.stop();
    assert!(!backend.is_running());

    assert!(buffer.rms() > 0.0);
    assert!(audio.band_average_hz(200.0, 300.0) > 0.0);
}
