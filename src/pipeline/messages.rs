//! Message types passed between pipeline stages.

use crate::normalize::normalize;
use std::time::Instant;

/// A fixed-duration recording captured from the microphone.
#[derive(Debug, Clone)]
pub struct AudioClip {
    /// Mono f32 samples at `sample_rate`.
    pub samples: Vec<f32>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Timestamp when the recording finished.
    pub captured_at: Instant,
}

impl AudioClip {
    /// Duration of the clip in seconds.
    #[must_use]
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

/// One transcribed unit of speech.
///
/// Created per recognition result and consumed immediately by the
/// session state machine; nothing holds an utterance across turns.
#[derive(Debug, Clone)]
pub struct Utterance {
    /// The transcription as produced by the recognizer.
    pub raw_text: String,
    /// Normalized form used for matching.
    pub normalized_text: String,
    /// When the transcription arrived.
    pub received_at: Instant,
}

impl Utterance {
    /// Wrap a recognizer result, normalizing it once for matching.
    #[must_use]
    pub fn new(raw_text: impl Into<String>) -> Self {
        let raw_text = raw_text.into();
        let normalized_text = normalize(&raw_text);
        Self {
            raw_text,
            normalized_text,
            received_at: Instant::now(),
        }
    }
}

/// The (spoken, display) output of one assistant reply.
///
/// Immutable once produced: the spoken field goes to synthesis, the
/// display field to whatever surface is showing the conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponsePair {
    /// Text for the speech synthesizer.
    pub spoken: String,
    /// Text for on-screen display.
    pub display: String,
}

impl ResponsePair {
    /// A pair whose spoken and display forms are the same text.
    #[must_use]
    pub fn uniform(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            spoken: text.clone(),
            display: text,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn utterance_normalizes_on_construction() {
        let utt = Utterance::new("Hey, Sathi!");
        assert_eq!(utt.raw_text, "Hey, Sathi!");
        assert_eq!(utt.normalized_text, "hey sathi");
    }

    #[test]
    fn clip_duration() {
        let clip = AudioClip {
            samples: vec![0.0; 16_000],
            sample_rate: 16_000,
            captured_at: Instant::now(),
        };
        assert!((clip.duration_secs() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn uniform_pair_mirrors_text() {
        let pair = ResponsePair::uniform("hello");
        assert_eq!(pair.spoken, pair.display);
    }
}
