//! Wake and conversation session state machine.
//!
//! Owns the session's [`ConversationState`] and is its only mutator.
//! Pre-activation utterances are gated by the wake scorer with a
//! two-tier policy: confident scores activate immediately, borderline
//! scores trigger a short spoken confirmation, everything else is
//! discarded. Once conversing, utterances flow to the dispatcher and
//! the session stays active until externally stopped.
//!
//! The machine itself performs no I/O: it returns a [`SessionReply`]
//! describing what should be spoken, and the pipeline coordinator does
//! the speaking and the (bounded) listening.

use crate::config::{SessionConfig, WakeConfig};
use crate::dispatch::ConversationDispatcher;
use crate::pipeline::messages::{ResponsePair, Utterance};
use crate::wake::WakeScorer;
use rand::seq::SliceRandom;
use tracing::{debug, info};

/// Greetings spoken when the assistant wakes.
pub const GREETINGS: &[&str] = &[
    "Hello! I'm Sathi, your helpful companion. How may I assist you?",
    "Good day! I'm here to help you. What can I do for you?",
    "Hello dear! I'm Sathi, ready to assist you.",
    "I'm here to help! Please tell me what you need.",
    "Yes, I'm listening! How can I make your day better?",
    "I'm your assistant Sathi. Please let me know how I can help you.",
];

/// Session state. Exactly one value is active at a time and every
/// transition replaces it wholesale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationState {
    /// Waiting for a wake phrase.
    Idle,
    /// A borderline wake score is pending spoken confirmation.
    AwaitingConfirmation,
    /// Activated; utterances go to the dispatcher.
    Conversing,
}

impl std::fmt::Display for ConversationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::AwaitingConfirmation => write!(f, "awaiting-confirmation"),
            Self::Conversing => write!(f, "conversing"),
        }
    }
}

/// Events delivered to the state machine by the pipeline.
#[derive(Debug)]
pub enum SessionEvent {
    /// A transcription arrived.
    UtteranceReceived(Utterance),
    /// The confirmation re-listen produced text (or nothing usable).
    ConfirmationReceived(Option<String>),
    /// The bounded confirmation wait expired.
    Timeout,
}

/// What the pipeline should speak in response to an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionReply {
    /// Wake accepted: speak a greeting.
    Greeting(String),
    /// Borderline wake: ask for confirmation, then re-listen briefly.
    ConfirmationPrompt(String),
    /// Conversational answer to speak and display.
    Answer(ResponsePair),
}

/// The wake-gated session state machine.
pub struct WakeStateMachine {
    state: ConversationState,
    scorer: WakeScorer,
    dispatcher: ConversationDispatcher,
    accept_threshold: f32,
    confirm_threshold: f32,
    affirmative_tokens: Vec<String>,
    confirm_prompt: String,
}

impl WakeStateMachine {
    /// Build the machine in the `Idle` state.
    #[must_use]
    pub fn new(
        wake: &WakeConfig,
        session: &SessionConfig,
        dispatcher: ConversationDispatcher,
    ) -> Self {
        Self {
            state: ConversationState::Idle,
            scorer: WakeScorer::new(wake),
            dispatcher,
            accept_threshold: wake.accept_threshold,
            confirm_threshold: wake.confirm_threshold,
            affirmative_tokens: session.affirmative_tokens.clone(),
            confirm_prompt: session.confirm_prompt.clone(),
        }
    }

    /// Current session state.
    #[must_use]
    pub fn state(&self) -> ConversationState {
        self.state
    }

    /// Process one event, possibly transitioning and producing a reply.
    ///
    /// Events that make no sense in the current state are discarded.
    pub async fn handle(&mut self, event: SessionEvent) -> Option<SessionReply> {
        match (self.state, event) {
            (ConversationState::Idle, SessionEvent::UtteranceReceived(utt)) => {
                self.gate_wake(&utt)
            }
            (ConversationState::AwaitingConfirmation, SessionEvent::ConfirmationReceived(text)) => {
                self.resolve_confirmation(text.as_deref())
            }
            (ConversationState::AwaitingConfirmation, SessionEvent::Timeout) => {
                info!("no confirmation heard; returning to idle");
                self.state = ConversationState::Idle;
                None
            }
            (ConversationState::Conversing, SessionEvent::UtteranceReceived(utt)) => {
                let pair = self.dispatcher.dispatch(&utt.raw_text).await;
                Some(SessionReply::Answer(pair))
            }
            (state, event) => {
                debug!("ignoring {event:?} in state {state}");
                None
            }
        }
    }

    /// Idle-state wake gating: accept, confirm, or discard.
    fn gate_wake(&mut self, utt: &Utterance) -> Option<SessionReply> {
        let result = self.scorer.evaluate(&utt.raw_text);
        info!(
            "wake score {:.2} for \"{}\" (tier: {:?})",
            result.score, utt.normalized_text, result.tier
        );

        if result.score >= self.accept_threshold {
            info!("wake phrase accepted");
            self.state = ConversationState::Conversing;
            Some(SessionReply::Greeting(pick_greeting()))
        } else if result.score >= self.confirm_threshold {
            info!("borderline wake score; asking for confirmation");
            self.state = ConversationState::AwaitingConfirmation;
            Some(SessionReply::ConfirmationPrompt(self.confirm_prompt.clone()))
        } else {
            debug!("wake phrase not detected");
            None
        }
    }

    /// Confirmation outcome: affirmative activates, anything else idles.
    fn resolve_confirmation(&mut self, text: Option<&str>) -> Option<SessionReply> {
        let affirmed = text.is_some_and(|t| self.is_affirmative(t));
        if affirmed {
            info!("wake confirmed");
            self.state = ConversationState::Conversing;
            Some(SessionReply::Greeting(pick_greeting()))
        } else {
            info!("confirmation negative or empty; returning to idle");
            self.state = ConversationState::Idle;
            None
        }
    }

    fn is_affirmative(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        !lower.trim().is_empty()
            && self
                .affirmative_tokens
                .iter()
                .any(|token| lower.contains(token.as_str()))
    }
}

/// Pick a random greeting from the table.
fn pick_greeting() -> String {
    GREETINGS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(GREETINGS[0])
        .to_owned()
}
