//! Headless assistant binary: wake loop plus reminder scheduler.

use sathi::audio::CpalRecorder;
use sathi::config::{AssistantConfig, default_config_path};
use sathi::dispatch::ConversationDispatcher;
use sathi::intent::IntentClassifier;
use sathi::llm::{ConversationalResponder, GeminiResponder, OfflineResponder};
use sathi::pipeline::coordinator::PipelineCoordinator;
use sathi::reminders::{ReminderScheduler, ReminderStore};
use sathi::session::WakeStateMachine;
use sathi::stt::WhisperCliStt;
use sathi::tts::SpeakerStack;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config_path = std::env::args()
        .nth(1)
        .map_or_else(default_config_path, PathBuf::from);
    let config = if config_path.exists() {
        info!("loading config from {}", config_path.display());
        AssistantConfig::load(&config_path)?
    } else {
        info!("no config file at {}; using defaults", config_path.display());
        AssistantConfig::default()
    };

    let capture = CpalRecorder::new(&config.audio)?;
    let recognizer = WhisperCliStt::new(&config.stt)?;
    let speaker = Arc::new(SpeakerStack::detect(&config.tts)?);

    let responder: Box<dyn ConversationalResponder> = match GeminiResponder::new(&config.llm) {
        Ok(responder) => Box::new(responder),
        Err(e) => {
            warn!("conversational responder unavailable ({e}); date and time queries still work");
            Box::new(OfflineResponder)
        }
    };

    let classifier = IntentClassifier::new(&config.intent)?;
    let dispatcher = ConversationDispatcher::new(classifier, responder);
    let session = WakeStateMachine::new(&config.wake, &config.session, dispatcher);

    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown requested");
            ctrl_c_cancel.cancel();
        }
    });

    let mut scheduler_handle = None;
    if config.reminders.enabled {
        let store = ReminderStore::open(&config.reminders.db_path)?;
        let scheduler = ReminderScheduler::new(
            store,
            Arc::clone(&speaker),
            config.tts.voice,
            &config.reminders,
        );
        scheduler_handle = Some(tokio::spawn(scheduler.run(cancel.clone())));
    }

    let mut coordinator = PipelineCoordinator::new(
        Box::new(capture),
        Box::new(recognizer),
        session,
        speaker,
        config.tts.voice,
        config.session.clone(),
    );
    coordinator.run(cancel.clone()).await?;

    if let Some(handle) = scheduler_handle {
        let _ = handle.await;
    }

    Ok(())
}
