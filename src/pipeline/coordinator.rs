//! Session run loop: capture → transcribe → state machine → speak.
//!
//! One task owns the loop end to end, so the state machine has exactly
//! one writer. Each iteration records a fixed listen window, transcribes
//! it, and hands the utterance to the state machine; whatever comes back
//! is printed to the display channel and spoken. Capture or
//! transcription failures simply re-listen. The confirmation sub-dialog
//! runs inline under a hard time bound; exceeding it delivers `Timeout`.
//! Cancellation is checked at every suspension point, so shutdown is
//! safe in any state.

use crate::audio::AudioCapture;
use crate::config::SessionConfig;
use crate::error::Result;
use crate::pipeline::messages::{ResponsePair, Utterance};
use crate::session::{ConversationState, SessionEvent, SessionReply, WakeStateMachine};
use crate::stt::SpeechRecognizer;
use crate::tts::{SpeakerStack, VoiceProfile};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Owns the session loop and all of its collaborators.
pub struct PipelineCoordinator {
    capture: Box<dyn AudioCapture>,
    recognizer: Box<dyn SpeechRecognizer>,
    session: WakeStateMachine,
    speaker: Arc<SpeakerStack>,
    voice: VoiceProfile,
    config: SessionConfig,
}

impl PipelineCoordinator {
    /// Wire a coordinator from its collaborators.
    #[must_use]
    pub fn new(
        capture: Box<dyn AudioCapture>,
        recognizer: Box<dyn SpeechRecognizer>,
        session: WakeStateMachine,
        speaker: Arc<SpeakerStack>,
        voice: VoiceProfile,
        config: SessionConfig,
    ) -> Self {
        Self {
            capture,
            recognizer,
            session,
            speaker,
            voice,
            config,
        }
    }

    /// Current session state (read-only; the loop is the sole mutator).
    #[must_use]
    pub fn state(&self) -> ConversationState {
        self.session.state()
    }

    /// Run the session loop until the cancellation token fires.
    ///
    /// # Errors
    ///
    /// Currently infallible at the loop level: every per-utterance
    /// failure is recovered in place. The signature leaves room for
    /// fatal setup errors surfaced by collaborators.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<()> {
        info!("assistant ready; listening for a wake phrase");

        loop {
            let listen = match self.session.state() {
                ConversationState::Conversing => {
                    Duration::from_secs(self.config.utterance_listen_secs)
                }
                _ => Duration::from_secs(self.config.wake_listen_secs),
            };

            let heard = tokio::select! {
                () = cancel.cancelled() => break,
                heard = self.listen_once(listen) => heard,
            };
            let Some(text) = heard else {
                continue;
            };

            let utterance = Utterance::new(text);
            if utterance.normalized_text.is_empty() {
                debug!("transcription normalized to nothing; re-listening");
                continue;
            }

            match self
                .session
                .handle(SessionEvent::UtteranceReceived(utterance))
                .await
            {
                Some(SessionReply::Greeting(greeting)) => {
                    self.deliver(&ResponsePair::uniform(greeting)).await;
                }
                Some(SessionReply::ConfirmationPrompt(prompt)) => {
                    self.deliver(&ResponsePair::uniform(prompt)).await;
                    self.confirm(&cancel).await;
                }
                Some(SessionReply::Answer(pair)) => {
                    self.deliver(&pair).await;
                }
                None => {}
            }
        }

        info!("session loop stopped");
        Ok(())
    }

    /// One capture → transcribe cycle.
    ///
    /// Returns `None` on capture failure, transcription failure, or an
    /// empty result; the caller re-listens in all three cases.
    async fn listen_once(&self, duration: Duration) -> Option<String> {
        let clip = match self.capture.capture(duration).await {
            Ok(clip) => clip,
            Err(e) => {
                warn!("capture failed: {e}");
                return None;
            }
        };

        match self.recognizer.transcribe(&clip).await {
            Ok(Some(text)) if !text.trim().is_empty() => Some(text),
            Ok(_) => {
                debug!("no speech recognized");
                None
            }
            Err(e) => {
                warn!("transcription failed: {e}");
                None
            }
        }
    }

    /// The bounded confirmation re-listen.
    ///
    /// Resolves the `AwaitingConfirmation` state one way or the other:
    /// heard text becomes `ConfirmationReceived`, exceeding the bound
    /// (or shutdown) becomes `Timeout`.
    async fn confirm(&mut self, cancel: &CancellationToken) {
        let bound = Duration::from_secs(self.config.confirm_timeout_secs);
        let listen = Duration::from_secs(self.config.confirm_listen_secs);

        let event = tokio::select! {
            () = cancel.cancelled() => SessionEvent::Timeout,
            outcome = tokio::time::timeout(bound, self.listen_once(listen)) => match outcome {
                Ok(heard) => SessionEvent::ConfirmationReceived(heard),
                Err(_) => SessionEvent::Timeout,
            },
        };

        if let Some(SessionReply::Greeting(greeting)) = self.session.handle(event).await {
            self.deliver(&ResponsePair::uniform(greeting)).await;
        }
    }

    /// Print the display text and speak the spoken text.
    ///
    /// Synthesis failures are reported on the display channel and never
    /// escape; the session must always return to listening.
    async fn deliver(&self, pair: &ResponsePair) {
        println!("Sathi: {}", pair.display);

        let speaker = Arc::clone(&self.speaker);
        let text = pair.spoken.clone();
        let voice = self.voice;
        match tokio::task::spawn_blocking(move || speaker.speak(&text, voice)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                error!("speech synthesis failed: {e}");
                println!("(My voice is not working right now. Please read the screen.)");
            }
            Err(e) => error!("synthesis task failed: {e}"),
        }
    }
}
