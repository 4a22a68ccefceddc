//! Synthetic capture backend for headless runs and tests.

use crate::capture::AudioBackend;
use crate::spectral::SpectralFrameBuffer;
use crate::Result;
use std::f32::consts::PI;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::info;

/// Feeds a continuous sine wave from a worker thread, standing in for a
/// real device with the same `ingest` cadence contract.
pub struct MockBackend {
    buffer: Arc<SpectralFrameBuffer>,
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
    /// Tone frequency in Hz at the nominal 10 Hz/bin mapping
    pub frequency_hz: f32,
    /// Samples per synthetic chunk
    pub chunk_size: usize,
    /// Delay between chunk deliveries
    pub interval: Duration,
}

impl MockBackend {
    /// Create a mock backend feeding `buffer` with a 250 Hz tone.
    pub fn new(buffer: Arc<SpectralFrameBuffer>) -> Self {
        Self {
            buffer,
            running: Arc::new(AtomicBool::new(false)),
            worker: None,
            frequency_hz: 250.0,
            chunk_size: 2048,
            interval: Duration::from_millis(20),
        }
    }
}

impl AudioBackend for MockBackend {
    fn start(&mut self) -> Result<()> {
        if self.worker.is_some() {
            return Ok(());
        }

        self.running.store(true, Ordering::SeqCst);
        let running = self.running.clone();
        let buffer = self.buffer.clone();
        let chunk_size = self.chunk_size;
        let interval = self.interval;
        // Nominal mapping: bin i covers i*10 Hz, so a tone at f Hz lands
        // in bin f/10 of a chunk_size-sample window
        let phase_step = 2.0 * PI * self.frequency_hz / (chunk_size as f32 * 10.0);

        self.worker = Some(thread::spawn(move || {
            let mut phase: f32 = 0.0;
            let mut chunk = vec![0.0f32; chunk_size];
            while running.load(Ordering::SeqCst) {
                for sample in &mut chunk {
                    *sample = phase.sin() * 0.5;
                    phase += phase_step;
                }
                phase %= 2.0 * PI;
                buffer.ingest(&chunk);
                thread::sleep(interval);
            }
        }));

        info!("Mock capture started: {} Hz tone", self.frequency_hz);
        Ok(())
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
            info!("Mock capture stopped");
        }
    }

    fn is_running(&self) -> bool {
        self.worker.is_some()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.stop();
    }
}
