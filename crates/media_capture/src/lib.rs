//! Capture-device boundary: the session core requests local audio/video
//! through [`CaptureProvider`] and owns the resulting [`MediaHandle`]
//! until it releases the tracks at lock time.

use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureConstraints {
    pub audio: bool,
    pub video: bool,
}

impl CaptureConstraints {
    pub fn audio_video() -> Self {
        Self {
            audio: true,
            video: true,
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    #[error("camera and microphone access denied")]
    AccessDenied,
    #[error("no capture device available")]
    Unavailable,
}

/// A live local capture. `stop_tracks` must be idempotent; callers may
/// invoke it more than once during teardown.
pub trait MediaHandle: Send + Sync {
    fn stop_tracks(&self);
    fn is_live(&self) -> bool;
}

pub trait CaptureProvider: Send + Sync {
    fn request_capture(
        &self,
        constraints: CaptureConstraints,
    ) -> Result<Box<dyn MediaHandle>, CaptureError>;
}

/// Null provider used when no capture backend is wired up.
pub struct DeniedCaptureProvider;

impl CaptureProvider for DeniedCaptureProvider {
    fn request_capture(
        &self,
        _constraints: CaptureConstraints,
    ) -> Result<Box<dyn MediaHandle>, CaptureError> {
        Err(CaptureError::Unavailable)
    }
}

/// In-process stand-in for a real device: grants every request and tracks
/// whether its tracks were stopped.
pub struct StagedCaptureProvider;

impl CaptureProvider for StagedCaptureProvider {
    fn request_capture(
        &self,
        constraints: CaptureConstraints,
    ) -> Result<Box<dyn MediaHandle>, CaptureError> {
        tracing::debug!(
            audio = constraints.audio,
            video = constraints.video,
            "staged capture granted"
        );
        Ok(Box::new(StagedMediaHandle::default()))
    }
}

#[derive(Default)]
pub struct StagedMediaHandle {
    stopped: AtomicBool,
}

impl MediaHandle for StagedMediaHandle {
    fn stop_tracks(&self) {
        if !self.stopped.swap(true, Ordering::SeqCst) {
            tracing::debug!("staged capture tracks stopped");
        }
    }

    fn is_live(&self) -> bool {
        !self.stopped.load(Ordering::SeqCst)
    }
}
