//! Scanner state machine.
//!
//! Drives a camera-like [`FrameSource`] through
//! `Idle → Starting → Scanning → Processing → (Success | Failure)` and back.
//! Frames are sampled at a bounded rate over a bounded detection window;
//! payloads that don't parse as scan URLs are skipped silently. Once a
//! payload parses, the capture is stopped *before* the pair is submitted so
//! one device can never race two submissions, then the sink's verdict
//! decides the terminal phase.

use std::time::Duration;

use tokio::time::{Instant, sleep};
use uuid::Uuid;

use crate::qr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    Idle,
    Starting,
    Scanning,
    Processing,
    Success,
    Failure,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum CameraError {
    #[error("camera access denied: {0}")]
    PermissionDenied(String),
    #[error("camera unavailable: {0}")]
    Hardware(String),
}

/// Abstraction over the camera + QR decoding layer. `sample` returns the
/// decoded text of a QR code visible in the current frame, if any.
///
/// `stop` must be idempotent and must never panic: it is called from user
/// action, from the scan loop, and from teardown, possibly several times.
pub trait FrameSource: Send {
    fn start(&mut self) -> Result<(), CameraError>;
    fn sample(&mut self) -> Option<String>;
    fn stop(&mut self);
}

/// Verdict surfaced to the participant after a submission.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub success: bool,
    pub message: String,
}

impl ScanOutcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Where a decoded (token, session) pair is submitted. A device frontend
/// adapts this over the scan endpoint; tests stub it.
pub trait RecordSink: Send {
    fn submit(
        &mut self,
        token: &str,
        session_id: Uuid,
    ) -> impl Future<Output = ScanOutcome> + Send;
}

#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// Delay between frame samples (default ~10/s).
    pub sample_interval: Duration,
    /// How long to keep scanning before giving up on this attempt.
    pub detection_window: Duration,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            sample_interval: Duration::from_millis(100),
            detection_window: Duration::from_secs(30),
        }
    }
}

pub struct Scanner<S: FrameSource> {
    source: S,
    config: ScannerConfig,
    phase: ScanPhase,
    capturing: bool,
}

impl<S: FrameSource> Scanner<S> {
    pub fn new(source: S, config: ScannerConfig) -> Self {
        Self {
            source,
            config,
            phase: ScanPhase::Idle,
            capturing: false,
        }
    }

    pub fn phase(&self) -> ScanPhase {
        self.phase
    }

    /// Acquires the camera. On failure the scanner lands in `Failure` and
    /// stays restartable.
    pub fn start(&mut self) -> Result<(), CameraError> {
        self.phase = ScanPhase::Starting;
        match self.source.start() {
            Ok(()) => {
                self.capturing = true;
                self.phase = ScanPhase::Scanning;
                Ok(())
            }
            Err(e) => {
                self.phase = ScanPhase::Failure;
                Err(e)
            }
        }
    }

    /// Samples one frame. Returns the parsed pair once a valid payload is
    /// seen, after stopping the capture and moving to `Processing`.
    pub fn poll(&mut self) -> Option<(String, Uuid)> {
        if self.phase != ScanPhase::Scanning {
            return None;
        }
        let raw = self.source.sample()?;
        let parsed = qr::decode_payload(&raw)?;
        // Stop the camera before any submission happens.
        self.stop();
        self.phase = ScanPhase::Processing;
        Some(parsed)
    }

    /// Runs one full scan attempt: start, sample until the detection window
    /// closes, submit the first valid payload, and settle in a terminal
    /// phase. Always returns an outcome; failures never propagate as panics.
    pub async fn run<R: RecordSink>(&mut self, sink: &mut R) -> ScanOutcome {
        if let Err(e) = self.start() {
            return ScanOutcome::failed(e.to_string());
        }

        let deadline = Instant::now() + self.config.detection_window;
        let pair = loop {
            if let Some(pair) = self.poll() {
                break Some(pair);
            }
            if Instant::now() >= deadline {
                break None;
            }
            sleep(self.config.sample_interval).await;
        };

        let Some((token, session_id)) = pair else {
            self.stop();
            self.phase = ScanPhase::Failure;
            return ScanOutcome::failed("No QR code detected");
        };

        let outcome = sink.submit(&token, session_id).await;
        self.phase = if outcome.success {
            ScanPhase::Success
        } else {
            ScanPhase::Failure
        };
        outcome
    }

    /// Releases the camera. Safe to call repeatedly, before `start`, and
    /// from teardown.
    pub fn stop(&mut self) {
        if self.capturing {
            self.source.stop();
            self.capturing = false;
        }
    }

    /// Returns to `Idle` so the user can retry after a terminal phase.
    pub fn reset(&mut self) {
        self.stop();
        self.phase = ScanPhase::Idle;
    }
}

impl<S: FrameSource> Drop for Scanner<S> {
    fn drop(&mut self) {
        // Teardown must never throw past this boundary.
        self.stop();
    }
}
