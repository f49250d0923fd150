//! End-to-end session flow through mock collaborators.
//!
//! Drives the real coordinator and state machine with a scripted
//! recognizer, an instant capture stub, and a recording speaker, so the
//! whole wake → confirm → converse path runs without audio hardware.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use async_trait::async_trait;
use chrono::{Datelike, Local};
use sathi::audio::AudioCapture;
use sathi::clock::ordinal;
use sathi::config::AssistantConfig;
use sathi::dispatch::ConversationDispatcher;
use sathi::error::{AssistantError, Result};
use sathi::intent::IntentClassifier;
use sathi::llm::ConversationalResponder;
use sathi::pipeline::coordinator::PipelineCoordinator;
use sathi::pipeline::messages::AudioClip;
use sathi::session::{ConversationState, GREETINGS, WakeStateMachine};
use sathi::stt::SpeechRecognizer;
use sathi::tts::{SpeakerStack, SpeechSynthesizer, VoiceProfile};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Capture stub returning a short silent clip immediately.
struct InstantCapture;

#[async_trait]
impl AudioCapture for InstantCapture {
    async fn capture(&self, _duration: Duration) -> Result<AudioClip> {
        Ok(AudioClip {
            samples: vec![0.0; 160],
            sample_rate: 16_000,
            captured_at: Instant::now(),
        })
    }
}

/// Recognizer that plays back a fixed script of transcriptions, then
/// cancels the session loop.
struct ScriptedRecognizer {
    script: Mutex<VecDeque<Option<String>>>,
    cancel: CancellationToken,
}

#[async_trait]
impl SpeechRecognizer for ScriptedRecognizer {
    async fn transcribe(&self, _clip: &AudioClip) -> Result<Option<String>> {
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(entry) => Ok(entry),
            None => {
                self.cancel.cancel();
                Ok(None)
            }
        }
    }
}

/// Speaker that records everything it is asked to say.
struct RecordingSpeaker {
    spoken: Arc<Mutex<Vec<String>>>,
}

impl SpeechSynthesizer for RecordingSpeaker {
    fn name(&self) -> &str {
        "recording"
    }

    fn speak(&self, text: &str, _voice: VoiceProfile) -> Result<()> {
        self.spoken.lock().unwrap().push(text.to_owned());
        Ok(())
    }
}

struct EchoResponder;

#[async_trait]
impl ConversationalResponder for EchoResponder {
    async fn respond(&self, prompt: &str) -> Result<String> {
        Ok(format!("echo: {prompt}"))
    }
}

struct DownResponder;

#[async_trait]
impl ConversationalResponder for DownResponder {
    async fn respond(&self, _prompt: &str) -> Result<String> {
        Err(AssistantError::Llm("backend unreachable".to_owned()))
    }
}

/// Run the coordinator over a script and return (spoken lines, final state).
async fn run_script(
    script: Vec<Option<&str>>,
    responder: Box<dyn ConversationalResponder>,
) -> (Vec<String>, ConversationState) {
    let config = AssistantConfig::default();
    let cancel = CancellationToken::new();

    let recognizer = ScriptedRecognizer {
        script: Mutex::new(
            script
                .into_iter()
                .map(|entry| entry.map(ToOwned::to_owned))
                .collect(),
        ),
        cancel: cancel.clone(),
    };

    let spoken = Arc::new(Mutex::new(Vec::new()));
    let speaker = Arc::new(SpeakerStack::new(
        Box::new(RecordingSpeaker {
            spoken: Arc::clone(&spoken),
        }),
        None,
    ));

    let classifier = IntentClassifier::new(&config.intent).unwrap();
    let dispatcher = ConversationDispatcher::new(classifier, responder);
    let session = WakeStateMachine::new(&config.wake, &config.session, dispatcher);

    let mut coordinator = PipelineCoordinator::new(
        Box::new(InstantCapture),
        Box::new(recognizer),
        session,
        speaker,
        VoiceProfile::Male,
        config.session.clone(),
    );
    coordinator.run(cancel).await.unwrap();

    let spoken = spoken.lock().unwrap().clone();
    (spoken, coordinator.state())
}

#[tokio::test]
async fn confident_wake_greets_then_answers_date() {
    let (spoken, state) = run_script(
        vec![Some("hey sathi"), Some("what's the date today")],
        Box::new(EchoResponder),
    )
    .await;

    assert_eq!(spoken.len(), 2, "spoken: {spoken:?}");
    assert!(GREETINGS.contains(&spoken[0].as_str()), "not a greeting: {}", spoken[0]);

    let now = Local::now();
    let weekday = now.format("%A").to_string();
    let day = ordinal(now.day());
    assert!(spoken[1].contains(&weekday), "answer: {}", spoken[1]);
    assert!(spoken[1].contains(&day), "answer: {}", spoken[1]);
    assert_eq!(state, ConversationState::Conversing);
}

#[tokio::test]
async fn borderline_wake_confirms_and_activates() {
    let (spoken, state) = run_script(
        vec![Some("sathy"), Some("yes please"), Some("what day is it")],
        Box::new(EchoResponder),
    )
    .await;

    let config = AssistantConfig::default();
    assert_eq!(spoken.len(), 3, "spoken: {spoken:?}");
    assert_eq!(spoken[0], config.session.confirm_prompt);
    assert!(GREETINGS.contains(&spoken[1].as_str()), "not a greeting: {}", spoken[1]);
    assert!(spoken[2].starts_with("Today is"), "answer: {}", spoken[2]);
    assert_eq!(state, ConversationState::Conversing);
}

#[tokio::test]
async fn negative_confirmation_returns_to_idle() {
    let (spoken, state) = run_script(vec![Some("sathy"), Some("no thanks")], Box::new(EchoResponder)).await;

    let config = AssistantConfig::default();
    assert_eq!(spoken, vec![config.session.confirm_prompt]);
    assert_eq!(state, ConversationState::Idle);
}

#[tokio::test]
async fn unrelated_speech_never_wakes() {
    let (spoken, state) = run_script(
        vec![Some("good morning everyone"), Some("lovely weather")],
        Box::new(EchoResponder),
    )
    .await;

    assert!(spoken.is_empty(), "spoken: {spoken:?}");
    assert_eq!(state, ConversationState::Idle);
}

#[tokio::test]
async fn responder_failure_surfaces_as_apology() {
    let (spoken, state) = run_script(
        vec![Some("hey sathi"), Some("tell me a joke")],
        Box::new(DownResponder),
    )
    .await;

    assert_eq!(spoken.len(), 2, "spoken: {spoken:?}");
    assert!(spoken[1].starts_with("I'm sorry"), "answer: {}", spoken[1]);
    assert_eq!(state, ConversationState::Conversing);
}

#[tokio::test]
async fn empty_transcriptions_relisten_without_state_change() {
    let (spoken, state) =
        run_script(vec![None, None, Some("hey sathi")], Box::new(EchoResponder)).await;

    assert_eq!(spoken.len(), 1, "spoken: {spoken:?}");
    assert!(GREETINGS.contains(&spoken[0].as_str()));
    assert_eq!(state, ConversationState::Conversing);
}

#[tokio::test]
async fn conversing_echoes_unclassified_text() {
    let (spoken, _) = run_script(
        vec![Some("hey sathi"), Some("please sing me a song")],
        Box::new(EchoResponder),
    )
    .await;

    assert_eq!(spoken.len(), 2);
    assert_eq!(spoken[1], "echo: please sing me a song");
}
