//! cpal-based capture backend (default input device, mono downmix).

use crate::capture::{AudioBackend, CaptureEvent};
use crate::spectral::SpectralFrameBuffer;
use crate::{CoreError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::SampleFormat;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::Arc;
use tracing::{info, warn};

/// Capture backend built on cpal's default input device.
///
/// Interleaved frames are downmixed to mono inside the stream callback and
/// fed straight into the shared frame buffer; chunk size and cadence are
/// driver-determined. Stream errors are forwarded over [`events`] instead
/// of being handled on the audio thread.
///
/// [`events`]: CpalBackend::events
pub struct CpalBackend {
    buffer: Arc<SpectralFrameBuffer>,
    stream: Option<cpal::Stream>,
    event_tx: Sender<CaptureEvent>,
    event_rx: Receiver<CaptureEvent>,
}

impl CpalBackend {
    /// Create a backend feeding `buffer`. No device is touched until
    /// [`AudioBackend::start`].
    pub fn new(buffer: Arc<SpectralFrameBuffer>) -> Self {
        let (event_tx, event_rx) = unbounded();
        Self {
            buffer,
            stream: None,
            event_tx,
            event_rx,
        }
    }

    /// Receiver for out-of-band capture events; poll and log from a
    /// consumer thread.
    pub fn events(&self) -> &Receiver<CaptureEvent> {
        &self.event_rx
    }

    fn build_stream(&self, device: &cpal::Device) -> Result<cpal::Stream> {
        let config = device
            .default_input_config()
            .map_err(|e| CoreError::CaptureUnavailable(format!("no input config: {e}")))?;
        let channels = config.channels() as usize;
        let sample_format = config.sample_format();
        let stream_config: cpal::StreamConfig = config.into();

        let buffer = self.buffer.clone();
        let error_tx = self.event_tx.clone();
        let err_fn = move |err: cpal::StreamError| {
            let _ = error_tx.try_send(CaptureEvent::StreamError(err.to_string()));
        };

        // Reused mono scratch; the callback must not allocate per delivery
        let mut mono: Vec<f32> = Vec::new();

        let stream = match sample_format {
            SampleFormat::F32 => device.build_input_stream(
                &stream_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    downmix(data, channels, &mut mono);
                    buffer.ingest(&mono);
                },
                err_fn,
                None,
            ),
            SampleFormat::I16 => {
                let mut frame: Vec<f32> = Vec::new();
                device.build_input_stream(
                    &stream_config,
                    move |data: &[i16], _: &cpal::InputCallbackInfo| {
                        frame.clear();
                        frame.extend(data.iter().map(|&s| s as f32 / i16::MAX as f32));
                        downmix(&frame, channels, &mut mono);
                        buffer.ingest(&mono);
                    },
                    err_fn,
                    None,
                )
            }
            SampleFormat::U16 => {
                let mut frame: Vec<f32> = Vec::new();
                device.build_input_stream(
                    &stream_config,
                    move |data: &[u16], _: &cpal::InputCallbackInfo| {
                        frame.clear();
                        frame.extend(
                            data.iter()
                                .map(|&s| (s as f32 - 32768.0) / 32768.0),
                        );
                        downmix(&frame, channels, &mut mono);
                        buffer.ingest(&mono);
                    },
                    err_fn,
                    None,
                )
            }
            other => {
                return Err(CoreError::CaptureUnavailable(format!(
                    "unsupported sample format: {other:?}"
                )))
            }
        }
        .map_err(|e| CoreError::CaptureUnavailable(format!("failed to build stream: {e}")))?;

        info!(
            "Capture stream opened: {} ch, {} Hz, {:?}",
            channels, stream_config.sample_rate.0, sample_format
        );
        Ok(stream)
    }
}

impl AudioBackend for CpalBackend {
    fn start(&mut self) -> Result<()> {
        if self.stream.is_some() {
            warn!("Capture already running");
            return Ok(());
        }

        let host = cpal::default_host();
        let device = host.default_input_device().ok_or_else(|| {
            CoreError::CaptureUnavailable("no default input device".to_string())
        })?;

        let stream = self.build_stream(&device)?;
        stream
            .play()
            .map_err(|e| CoreError::CaptureUnavailable(format!("failed to start stream: {e}")))?;
        self.stream = Some(stream);
        info!("Audio capture started");
        Ok(())
    }

    fn stop(&mut self) {
        if self.stream.take().is_some() {
            info!("Audio capture stopped");
        }
    }

    fn is_running(&self) -> bool {
        self.stream.is_some()
    }
}

/// Average interleaved frames down to one mono sample per frame.
fn downmix(interleaved: &[f32], channels: usize, mono: &mut Vec<f32>) {
    mono.clear();
    if channels <= 1 {
        mono.extend_from_slice(interleaved);
        return;
    }
    mono.extend(
        interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32),
    );
}
