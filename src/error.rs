//! Error types for the assistant.

/// Top-level error type for the voice companion.
#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    /// Audio device or stream error.
    #[error("audio error: {0}")]
    Audio(String),

    /// Speech-to-text transcription error.
    #[error("STT error: {0}")]
    Stt(String),

    /// Remote conversational responder error.
    #[error("LLM error: {0}")]
    Llm(String),

    /// Text-to-speech synthesis error.
    #[error("TTS error: {0}")]
    Tts(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Session loop coordination error.
    #[error("pipeline error: {0}")]
    Pipeline(String),

    /// Reminder storage error.
    #[error("reminder store error: {0}")]
    Store(String),

    /// Reminder scheduler error.
    #[error("scheduler error: {0}")]
    Scheduler(String),

    /// Channel send/receive error.
    #[error("channel error: {0}")]
    Channel(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, AssistantError>;
