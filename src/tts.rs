//! Text-to-speech via external synthesis engines.
//!
//! Synthesis runs through command-line engines (espeak-ng on Linux,
//! `say` on macOS) so no model weights ship with the binary. Two layers
//! of fallback keep the assistant audible:
//!
//! - within an engine, a failing preferred voice retries on the engine
//!   default, so a missing male/female variant never silences a reply;
//! - across engines, [`SpeakerStack`] tries a backup engine when the
//!   primary fails outright.

use crate::config::TtsConfig;
use crate::error::{AssistantError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::Command;
use tracing::{info, warn};

/// Preferred synthesis voice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceProfile {
    /// A male voice.
    #[default]
    Male,
    /// A female voice.
    Female,
}

/// A speech synthesis engine.
pub trait SpeechSynthesizer: Send + Sync {
    /// Engine name for logs.
    fn name(&self) -> &str;

    /// Speak text with the requested voice profile.
    ///
    /// Implementations must fall back to any available voice when the
    /// preferred profile's voice fails; an error means the engine could
    /// not produce audio at all.
    ///
    /// # Errors
    ///
    /// Returns a TTS error when synthesis fails on every voice.
    fn speak(&self, text: &str, voice: VoiceProfile) -> Result<()>;
}

/// Command-line synthesis engine.
pub struct CommandTts {
    name: &'static str,
    program: PathBuf,
    common_args: Vec<String>,
    male_args: Vec<String>,
    female_args: Vec<String>,
}

impl CommandTts {
    /// espeak-ng engine (falls back to classic espeak on PATH).
    ///
    /// # Errors
    ///
    /// Returns a TTS error if neither binary is found.
    pub fn espeak(config: &TtsConfig) -> Result<Self> {
        let program = which::which("espeak-ng")
            .or_else(|_| which::which("espeak"))
            .map_err(|_| AssistantError::Tts("espeak-ng not found on PATH".into()))?;

        // espeak amplitude runs 0-200 with 100 as the nominal level.
        let amplitude = (config.volume * 2).min(200);
        Ok(Self {
            name: "espeak",
            program,
            common_args: vec![
                "-s".to_owned(),
                config.speaking_rate.to_string(),
                "-a".to_owned(),
                amplitude.to_string(),
            ],
            male_args: vec!["-v".to_owned(), "en+m3".to_owned()],
            female_args: vec!["-v".to_owned(), "en+f3".to_owned()],
        })
    }

    /// macOS `say` engine.
    ///
    /// # Errors
    ///
    /// Returns a TTS error if the binary is not found.
    pub fn say(config: &TtsConfig) -> Result<Self> {
        let program = which::which("say")
            .map_err(|_| AssistantError::Tts("say not found on PATH".into()))?;

        Ok(Self {
            name: "say",
            program,
            common_args: vec!["-r".to_owned(), config.speaking_rate.to_string()],
            male_args: vec!["-v".to_owned(), "Daniel".to_owned()],
            female_args: vec!["-v".to_owned(), "Samantha".to_owned()],
        })
    }

    fn run(&self, text: &str, voice_args: &[String]) -> Result<()> {
        let status = Command::new(&self.program)
            .args(&self.common_args)
            .args(voice_args)
            .arg(text)
            .status()
            .map_err(|e| AssistantError::Tts(format!("{} failed to start: {e}", self.name)))?;

        if status.success() {
            Ok(())
        } else {
            Err(AssistantError::Tts(format!(
                "{} exited with {status}",
                self.name
            )))
        }
    }
}

impl SpeechSynthesizer for CommandTts {
    fn name(&self) -> &str {
        self.name
    }

    fn speak(&self, text: &str, voice: VoiceProfile) -> Result<()> {
        if text.trim().is_empty() {
            return Err(AssistantError::Tts("refusing to speak empty text".into()));
        }

        let preferred = match voice {
            VoiceProfile::Male => &self.male_args,
            VoiceProfile::Female => &self.female_args,
        };

        match self.run(text, preferred) {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!(
                    "{} preferred voice failed ({e}); retrying with engine default",
                    self.name
                );
                self.run(text, &[])
            }
        }
    }
}

/// Primary synthesis engine with an optional backup.
///
/// Shared by the session loop and the reminder scheduler; both speak
/// through the same stack, with no ordering guarantee between them.
pub struct SpeakerStack {
    primary: Box<dyn SpeechSynthesizer>,
    backup: Option<Box<dyn SpeechSynthesizer>>,
}

impl SpeakerStack {
    /// Build a stack from explicit engines.
    #[must_use]
    pub fn new(
        primary: Box<dyn SpeechSynthesizer>,
        backup: Option<Box<dyn SpeechSynthesizer>>,
    ) -> Self {
        Self { primary, backup }
    }

    /// Detect available engines on this machine.
    ///
    /// The first engine found becomes primary, the second (if any) the
    /// backup.
    ///
    /// # Errors
    ///
    /// Returns a TTS error if no engine is available at all.
    pub fn detect(config: &TtsConfig) -> Result<Self> {
        let mut engines: Vec<Box<dyn SpeechSynthesizer>> = Vec::new();
        if let Ok(engine) = CommandTts::espeak(config) {
            engines.push(Box::new(engine));
        }
        if let Ok(engine) = CommandTts::say(config) {
            engines.push(Box::new(engine));
        }

        let mut engines = engines.into_iter();
        let primary = engines.next().ok_or_else(|| {
            AssistantError::Tts("no speech synthesis engine found (install espeak-ng)".into())
        })?;
        let backup = engines.next();

        info!(
            "speech synthesis: primary={}, backup={}",
            primary.name(),
            backup.as_deref().map_or("none", |engine| engine.name()),
        );
        Ok(Self::new(primary, backup))
    }

    /// Speak through the primary engine, falling back to the backup.
    ///
    /// # Errors
    ///
    /// Returns a TTS error only when every engine has failed.
    pub fn speak(&self, text: &str, voice: VoiceProfile) -> Result<()> {
        match self.primary.speak(text, voice) {
            Ok(()) => Ok(()),
            Err(primary_err) => {
                warn!(
                    "primary synthesis ({}) failed: {primary_err}",
                    self.primary.name()
                );
                match &self.backup {
                    Some(backup) => backup.speak(text, voice).map_err(|backup_err| {
                        AssistantError::Tts(format!(
                            "all synthesis engines failed: {primary_err}; {backup_err}"
                        ))
                    }),
                    None => Err(primary_err),
                }
            }
        }
    }
}
