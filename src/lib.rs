//! Sathi: voice-activated companion assistant.
//!
//! This crate provides the interaction loop for a spoken companion:
//! Microphone → STT → wake gate → intent dispatch → TTS
//!
//! # Architecture
//!
//! - **Wake scoring**: fuzzy multi-tier matching of transcriptions
//!   against configured wake phrases ([`wake`])
//! - **Session state machine**: Idle / AwaitingConfirmation / Conversing
//!   with a two-tier accept/confirm policy ([`session`])
//! - **Intent dispatch**: deterministic date/time/day/calendar answers
//!   or a remote conversational responder ([`intent`], [`dispatch`])
//! - **Pipeline**: the run loop wiring capture, recognition, and
//!   synthesis around the state machine ([`pipeline`])
//! - **Reminders**: SQLite-backed spoken reminders announced by a
//!   background scheduler ([`reminders`])

pub mod audio;
pub mod clock;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod intent;
pub mod llm;
pub mod normalize;
pub mod pipeline;
pub mod reminders;
pub mod session;
pub mod stt;
pub mod tts;
pub mod wake;

pub use config::AssistantConfig;
pub use error::{AssistantError, Result};
pub use pipeline::coordinator::PipelineCoordinator;
pub use pipeline::messages::{ResponsePair, Utterance};
pub use session::{ConversationState, SessionEvent, SessionReply, WakeStateMachine};
pub use wake::{MatchResult, MatchTier, WakeScorer};
