//! Routes utterances to deterministic formatters or the conversational
//! responder.
//!
//! Every dispatch produces a [`ResponsePair`]: intent hits go to the
//! pure clock formatters, everything else to the remote responder, and
//! any failure collapses to a fixed apologetic reply. Callers can rely
//! on always having something to speak.

use crate::clock;
use crate::intent::IntentClassifier;
use crate::llm::ConversationalResponder;
use crate::pipeline::messages::ResponsePair;
use chrono::Local;
use tracing::{debug, warn};

/// Fixed reply used when the responder fails.
fn apology() -> ResponsePair {
    ResponsePair {
        spoken: "I'm sorry, I'm having trouble answering right now. \
                 Please try again in a moment."
            .to_owned(),
        display: "Unable to answer right now".to_owned(),
    }
}

/// Converts a post-activation utterance into a response pair.
pub struct ConversationDispatcher {
    classifier: IntentClassifier,
    responder: Box<dyn ConversationalResponder>,
}

impl ConversationDispatcher {
    /// Build a dispatcher from a compiled classifier and a responder.
    #[must_use]
    pub fn new(classifier: IntentClassifier, responder: Box<dyn ConversationalResponder>) -> Self {
        Self {
            classifier,
            responder,
        }
    }

    /// Produce the response for an utterance. Never fails.
    pub async fn dispatch(&self, text: &str) -> ResponsePair {
        if let Some(intent) = self.classifier.classify(text) {
            debug!("intent detected: {intent}");
            return clock::respond(intent, Local::now().naive_local());
        }

        match self.responder.respond(text).await {
            Ok(reply) => ResponsePair::uniform(reply),
            Err(e) => {
                warn!("conversational responder failed: {e}");
                apology()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use crate::config::IntentConfig;
    use crate::error::{AssistantError, Result};
    use async_trait::async_trait;
    use chrono::Datelike;

    struct CannedResponder {
        reply: Result<String>,
    }

    #[async_trait]
    impl ConversationalResponder for CannedResponder {
        async fn respond(&self, _prompt: &str) -> Result<String> {
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(_) => Err(AssistantError::Llm("backend down".to_owned())),
            }
        }
    }

    fn dispatcher(reply: Result<String>) -> ConversationDispatcher {
        let classifier = IntentClassifier::new(&IntentConfig::default()).unwrap();
        ConversationDispatcher::new(classifier, Box::new(CannedResponder { reply }))
    }

    #[tokio::test]
    async fn date_query_answers_with_todays_weekday() {
        let d = dispatcher(Ok("unused".to_owned()));
        let pair = d.dispatch("what's the date today").await;
        let weekday = Local::now().format("%A").to_string();
        assert!(
            pair.spoken.contains(&weekday),
            "spoken was: {}",
            pair.spoken
        );
        assert!(pair.spoken.contains(&Local::now().year().to_string()));
    }

    #[tokio::test]
    async fn unclassified_text_goes_to_the_responder() {
        let d = dispatcher(Ok("That sounds lovely.".to_owned()));
        let pair = d.dispatch("tell me something nice").await;
        assert_eq!(pair.spoken, "That sounds lovely.");
        assert_eq!(pair.display, "That sounds lovely.");
    }

    #[tokio::test]
    async fn responder_failure_yields_the_apologetic_pair() {
        let d = dispatcher(Err(AssistantError::Llm("down".to_owned())));
        let pair = d.dispatch("tell me something nice").await;
        assert_eq!(pair, apology());
    }

    #[tokio::test]
    async fn time_query_never_reaches_the_responder() {
        // A failing responder must not affect deterministic intents.
        let d = dispatcher(Err(AssistantError::Llm("down".to_owned())));
        let pair = d.dispatch("what's the time").await;
        assert!(pair.spoken.starts_with("It's "), "spoken: {}", pair.spoken);
    }
}
