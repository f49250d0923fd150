//! Configuration types for the assistant.
//!
//! Everything the matching and session layers tune (wake phrases,
//! confidence thresholds, affirmative tokens, intent templates and
//! fallback keywords) is an explicit configuration value passed into
//! each component's constructor. There are no module-level mutable
//! defaults; the tables below are only what `Default` hands out.

use crate::error::{AssistantError, Result};
use crate::intent::Intent;
use crate::tts::VoiceProfile;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration for the assistant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Audio capture settings.
    pub audio: AudioConfig,
    /// Speech-to-text settings.
    pub stt: SttConfig,
    /// Text-to-speech settings.
    pub tts: TtsConfig,
    /// Remote conversational responder settings.
    pub llm: LlmConfig,
    /// Wake-phrase scoring settings.
    pub wake: WakeConfig,
    /// Session loop settings (confirmation, listen windows).
    pub session: SessionConfig,
    /// Intent classification templates and fallbacks.
    pub intent: IntentConfig,
    /// Reminder store and scheduler settings.
    pub reminders: ReminderConfig,
}

impl AssistantConfig {
    /// Load configuration from a TOML file.
    ///
    /// Missing sections and fields fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns a config error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AssistantError::Config(format!("cannot read config {}: {e}", path.display()))
        })?;
        toml::from_str(&raw).map_err(|e| {
            AssistantError::Config(format!("invalid config {}: {e}", path.display()))
        })
    }
}

/// Returns the default configuration file location.
///
/// `~/.config/sathi/config.toml` (or the platform equivalent).
#[must_use]
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sathi")
        .join("config.toml")
}

/// Audio capture configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Target sample rate in Hz for the recognition pipeline.
    pub sample_rate: u32,
    /// Input device name (None = system default).
    pub input_device: Option<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
            input_device: None,
        }
    }
}

/// Speech-to-text configuration (external whisper.cpp CLI).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SttConfig {
    /// Transcriber binary name or path, resolved on `PATH` if bare.
    pub binary: String,
    /// Path to the whisper GGML model file.
    pub model_path: PathBuf,
    /// Transcription language hint.
    pub language: String,
    /// Maximum seconds to wait for one transcription.
    pub timeout_secs: u64,
    /// Directory for scratch WAV files handed to the transcriber.
    pub scratch_dir: PathBuf,
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            binary: "whisper-cli".to_owned(),
            model_path: PathBuf::from("models/ggml-small-q8_0.bin"),
            language: "en".to_owned(),
            timeout_secs: 60,
            scratch_dir: PathBuf::from("data/audio"),
        }
    }
}

/// Text-to-speech configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsConfig {
    /// Preferred voice profile.
    pub voice: VoiceProfile,
    /// Speaking rate in words per minute. Kept on the slow side so
    /// responses stay easy to follow.
    pub speaking_rate: u32,
    /// Output volume, 0-100.
    pub volume: u32,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            voice: VoiceProfile::Male,
            speaking_rate: 150,
            volume: 90,
        }
    }
}

/// Remote conversational responder configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of the `generateContent`-style API.
    pub api_url: String,
    /// Model name to request.
    pub api_model: String,
    /// API key. Empty means "resolve from the `GEMINI_API_KEY`
    /// environment variable".
    pub api_key: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Optional replacement for the built-in companion system prompt.
    pub system_prompt: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: "https://generativelanguage.googleapis.com/v1beta/models".to_owned(),
            api_model: "gemini-2.5-flash".to_owned(),
            api_key: String::new(),
            timeout_secs: 30,
            system_prompt: None,
        }
    }
}

/// Default wake phrases.
const DEFAULT_WAKE_PHRASES: &[&str] = &[
    "hey sathi",
    "hi sathi",
    "ok sathi",
    "sathi",
    "hello sathi",
    "dear sathi",
    "sathi please",
    "sathi help",
    "listen sathi",
    "sathi are you there",
];

/// Wake-phrase scoring configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WakeConfig {
    /// Phrases that activate the assistant. Normalized at load; entries
    /// that normalize to nothing are dropped.
    pub phrases: Vec<String>,
    /// Score at or above which the wake is accepted outright.
    pub accept_threshold: f32,
    /// Score at or above which a spoken confirmation is requested.
    /// Must be below `accept_threshold`.
    pub confirm_threshold: f32,
    /// Minimum window similarity for the phrase-level fuzzy tier.
    pub span_threshold: f32,
    /// Minimum token similarity for the single-token fuzzy tier.
    pub token_threshold: f32,
}

impl Default for WakeConfig {
    fn default() -> Self {
        Self {
            phrases: DEFAULT_WAKE_PHRASES.iter().map(|p| (*p).to_owned()).collect(),
            accept_threshold: 0.9,
            confirm_threshold: 0.55,
            span_threshold: 0.65,
            token_threshold: 0.85,
        }
    }
}

/// Default affirmative tokens accepted in a wake confirmation.
const DEFAULT_AFFIRMATIVES: &[&str] = &["yes", "yeah", "yup", "ya", "correct", "right"];

/// Session loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Tokens whose presence in a confirmation counts as "yes".
    pub affirmative_tokens: Vec<String>,
    /// Spoken prompt used when a wake score lands in the confirm band.
    pub confirm_prompt: String,
    /// Listen window in seconds while idle (waiting for a wake phrase).
    pub wake_listen_secs: u64,
    /// Listen window in seconds for a conversational utterance. Longer
    /// than the wake window to leave room for slower speech.
    pub utterance_listen_secs: u64,
    /// Listen window in seconds for the confirmation re-listen.
    pub confirm_listen_secs: u64,
    /// Upper bound in seconds on the whole confirmation exchange;
    /// exceeding it raises a timeout and returns the session to idle.
    pub confirm_timeout_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            affirmative_tokens: DEFAULT_AFFIRMATIVES.iter().map(|t| (*t).to_owned()).collect(),
            confirm_prompt: "Did you say Sathi? Please say yes or no.".to_owned(),
            wake_listen_secs: 5,
            utterance_listen_secs: 8,
            confirm_listen_secs: 3,
            confirm_timeout_secs: 8,
        }
    }
}

/// Intent classification configuration.
///
/// Each intent owns a list of regex templates and a list of fallback
/// keywords; both default to the built-in tables in [`crate::intent`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntentConfig {
    /// Date query templates.
    pub date_patterns: Vec<String>,
    /// Time query templates.
    pub time_patterns: Vec<String>,
    /// Day-of-week query templates.
    pub day_patterns: Vec<String>,
    /// Calendar query templates.
    pub calendar_patterns: Vec<String>,
    /// Date fallback keywords.
    pub date_keywords: Vec<String>,
    /// Time fallback keywords.
    pub time_keywords: Vec<String>,
    /// Day fallback keywords.
    pub day_keywords: Vec<String>,
    /// Calendar fallback keywords.
    pub calendar_keywords: Vec<String>,
}

impl IntentConfig {
    /// The regex templates configured for an intent.
    #[must_use]
    pub fn patterns_for(&self, intent: Intent) -> &[String] {
        match intent {
            Intent::Date => &self.date_patterns,
            Intent::Time => &self.time_patterns,
            Intent::Day => &self.day_patterns,
            Intent::Calendar => &self.calendar_patterns,
        }
    }

    /// The fallback keywords configured for an intent.
    #[must_use]
    pub fn keywords_for(&self, intent: Intent) -> &[String] {
        match intent {
            Intent::Date => &self.date_keywords,
            Intent::Time => &self.time_keywords,
            Intent::Day => &self.day_keywords,
            Intent::Calendar => &self.calendar_keywords,
        }
    }
}

fn owned(table: &[&str]) -> Vec<String> {
    table.iter().map(|s| (*s).to_owned()).collect()
}

impl Default for IntentConfig {
    fn default() -> Self {
        Self {
            date_patterns: owned(crate::intent::DATE_PATTERNS),
            time_patterns: owned(crate::intent::TIME_PATTERNS),
            day_patterns: owned(crate::intent::DAY_PATTERNS),
            calendar_patterns: owned(crate::intent::CALENDAR_PATTERNS),
            date_keywords: owned(crate::intent::DATE_KEYWORDS),
            time_keywords: owned(crate::intent::TIME_KEYWORDS),
            day_keywords: Vec::new(),
            calendar_keywords: Vec::new(),
        }
    }
}

/// Reminder store and scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReminderConfig {
    /// Whether the background reminder scheduler runs at all.
    pub enabled: bool,
    /// SQLite database path.
    pub db_path: PathBuf,
    /// Spoken lead-in before each reminder message.
    pub announce_prefix: String,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            db_path: PathBuf::from("sathi_reminders.db"),
            announce_prefix: "Excuse me, I have a reminder for you. ".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn defaults_carry_canonical_thresholds() {
        let config = AssistantConfig::default();
        assert_eq!(config.wake.accept_threshold, 0.9);
        assert_eq!(config.wake.confirm_threshold, 0.55);
        assert_eq!(config.wake.span_threshold, 0.65);
        assert_eq!(config.wake.token_threshold, 0.85);
        assert!(config.wake.phrases.contains(&"hey sathi".to_owned()));
        assert!(
            config
                .session
                .affirmative_tokens
                .contains(&"yes".to_owned())
        );
    }

    #[test]
    fn default_roundtrips_through_toml() {
        let config = AssistantConfig::default();
        let raw = toml::to_string(&config).unwrap();
        let back: AssistantConfig = toml::from_str(&raw).unwrap();
        assert_eq!(back.wake.phrases, config.wake.phrases);
        assert_eq!(back.intent.date_patterns, config.intent.date_patterns);
        assert_eq!(back.session.confirm_prompt, config.session.confirm_prompt);
    }

    #[test]
    fn partial_file_overrides_one_knob() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[wake]
accept_threshold = 0.8
phrases = ["hey assistant"]
"#,
        )
        .unwrap();

        let config = AssistantConfig::load(&path).unwrap();
        assert_eq!(config.wake.accept_threshold, 0.8);
        assert_eq!(config.wake.phrases, vec!["hey assistant".to_owned()]);
        // Untouched sections keep their defaults.
        assert_eq!(config.wake.confirm_threshold, 0.55);
        assert_eq!(config.session.wake_listen_secs, 5);
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = AssistantConfig::load(Path::new("/nonexistent/sathi.toml")).unwrap_err();
        assert!(matches!(err, AssistantError::Config(_)));
    }
}
