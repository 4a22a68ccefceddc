//! Capture backends feeding the spectral pipeline.
//!
//! A backend owns the capture session and calls
//! [`crate::SpectralFrameBuffer::ingest`] from its delivery thread. If no
//! backend ever starts, the pipeline stays in its valid all-zero idle
//! state; capture failure degrades, it does not propagate into the
//! analysis or render paths.

#[cfg(feature = "capture")]
pub mod cpal_backend;

#[cfg(feature = "mock-audio")]
pub mod mock_backend;

use crate::Result;

/// A capture session lifecycle.
///
/// `start` fails with [`crate::CoreError::CaptureUnavailable`] when the
/// device cannot be opened; callers log it once and run idle rather than
/// aborting. Retry policy, if any, belongs to the caller.
pub trait AudioBackend {
    /// Open the device and begin delivering chunks.
    fn start(&mut self) -> Result<()>;

    /// Stop delivering chunks and release the device.
    fn stop(&mut self);

    /// Whether a capture session is currently live.
    fn is_running(&self) -> bool;
}

/// Out-of-band events from a running capture session.
///
/// Delivered over a channel because they originate on the audio thread,
/// which must never block or log directly.
#[derive(Debug, Clone)]
pub enum CaptureEvent {
    /// The stream reported an error; capture may have stopped.
    StreamError(String),
}
