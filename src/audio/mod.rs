//! Microphone audio capture.

mod capture;

pub use capture::CpalRecorder;

use crate::error::Result;
use crate::pipeline::messages::AudioClip;
use async_trait::async_trait;
use std::time::Duration;

/// Fixed-duration audio capture.
#[async_trait]
pub trait AudioCapture: Send + Sync {
    /// Record for the given duration and return the captured clip.
    ///
    /// # Errors
    ///
    /// Returns an audio error when no input device is available or the
    /// recording is interrupted.
    async fn capture(&self, duration: Duration) -> Result<AudioClip>;
}
