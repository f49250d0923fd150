//! Speech-to-text via an external whisper.cpp CLI.
//!
//! Transcription shells out to `whisper-cli`: the captured clip is
//! written to a scratch WAV, the binary runs with a hard timeout, and
//! the timestamped transcript lines are parsed back out of stdout. An
//! empty transcript is a normal outcome (silence, noise) and is
//! reported as `Ok(None)` rather than an error.

use crate::config::SttConfig;
use crate::error::{AssistantError, Result};
use crate::pipeline::messages::AudioClip;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// A speech recognizer turning audio clips into text.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Transcribe a clip.
    ///
    /// `Ok(None)` means the engine ran but heard nothing usable.
    ///
    /// # Errors
    ///
    /// Returns an STT error when the engine itself fails.
    async fn transcribe(&self, clip: &AudioClip) -> Result<Option<String>>;
}

/// whisper.cpp CLI transcriber.
pub struct WhisperCliStt {
    binary: PathBuf,
    model_path: PathBuf,
    language: String,
    timeout: Duration,
    scratch_dir: PathBuf,
}

impl WhisperCliStt {
    /// Create a transcriber, resolving the binary on `PATH` if the
    /// configured name is bare.
    ///
    /// # Errors
    ///
    /// Returns an STT error if the binary cannot be found or the model
    /// file does not exist.
    pub fn new(config: &SttConfig) -> Result<Self> {
        let binary = which::which(&config.binary).map_err(|_| {
            AssistantError::Stt(format!("transcriber binary '{}' not found", config.binary))
        })?;

        if !config.model_path.exists() {
            return Err(AssistantError::Stt(format!(
                "model file not found: {}",
                config.model_path.display()
            )));
        }

        info!(
            "STT configured: {} with model {}",
            binary.display(),
            config.model_path.display()
        );

        Ok(Self {
            binary,
            model_path: config.model_path.clone(),
            language: config.language.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            scratch_dir: config.scratch_dir.clone(),
        })
    }
}

#[async_trait]
impl SpeechRecognizer for WhisperCliStt {
    async fn transcribe(&self, clip: &AudioClip) -> Result<Option<String>> {
        std::fs::create_dir_all(&self.scratch_dir)?;
        let wav_path = self.scratch_dir.join("utterance.wav");
        write_wav(&wav_path, &clip.samples, clip.sample_rate)?;

        let started = Instant::now();
        let output = tokio::time::timeout(
            self.timeout,
            tokio::process::Command::new(&self.binary)
                .arg("-m")
                .arg(&self.model_path)
                .arg("-f")
                .arg(&wav_path)
                .arg("--language")
                .arg(&self.language)
                .output(),
        )
        .await
        .map_err(|_| {
            AssistantError::Stt(format!(
                "transcription timed out after {}s",
                self.timeout.as_secs()
            ))
        })?
        .map_err(|e| AssistantError::Stt(format!("failed to run transcriber: {e}")))?;

        if !output.status.success() {
            return Err(AssistantError::Stt(format!(
                "transcriber exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let text = parse_transcript(&stdout);

        match &text {
            Some(text) => info!(
                "transcribed {:.1}s clip in {:.0}ms: \"{text}\"",
                clip.duration_secs(),
                started.elapsed().as_millis()
            ),
            None => debug!("no transcribed text in output"),
        }

        Ok(text)
    }
}

/// Extract the transcript from whisper-cli stdout.
///
/// The transcript appears on timestamped lines of the form
/// `[00:00:00.000 --> 00:00:02.000]  hello there`. When no timestamped
/// line is present, any line that is not a known diagnostic prefix is
/// taken as a fallback.
fn parse_transcript(output: &str) -> Option<String> {
    let mut text = String::new();

    for line in output.lines() {
        if line.contains("-->")
            && let Some(idx) = line.rfind(']')
        {
            let part = line[idx + 1..].trim();
            if !part.is_empty() {
                if !text.is_empty() {
                    text.push(' ');
                }
                text.push_str(part);
            }
        }
    }

    if text.is_empty() {
        for line in output.lines() {
            let line = line.trim();
            if line.is_empty()
                || line.starts_with("whisper_")
                || line.starts_with("system_info:")
                || line.starts_with("main:")
                || line.starts_with('[')
            {
                continue;
            }
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(line);
        }
    }

    let text = text.trim().to_owned();
    if text.is_empty() { None } else { Some(text) }
}

/// Write mono f32 samples as a 16-bit PCM WAV.
fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)
        .map_err(|e| AssistantError::Stt(format!("cannot create WAV: {e}")))?;

    for &s in samples {
        let sample_i16 = (s * 32767.0).clamp(-32768.0, 32767.0) as i16;
        writer
            .write_sample(sample_i16)
            .map_err(|e| AssistantError::Stt(format!("WAV write error: {e}")))?;
    }
    writer
        .finalize()
        .map_err(|e| AssistantError::Stt(format!("WAV finalize error: {e}")))?;

    Ok(())
}
