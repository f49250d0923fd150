//! Conversational responses via a remote LLM.
//!
//! Utterances that classify to no deterministic intent go to a
//! `generateContent`-style HTTP API (Gemini and compatible servers),
//! with the companion system prompt prepended to every request. The
//! response shape is extracted totally: any missing field is an error
//! the dispatcher converts into the apologetic reply, never a panic.

use crate::config::LlmConfig;
use crate::error::{AssistantError, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

/// Behaviour rules for the companion persona.
pub const SYSTEM_PROMPT: &str = "\
You are Sathi, a gentle elder care companion.\n\
Use simple, clear English and keep responses short, two or three sentences.\n\
Speak slowly and warmly. Show patience and kindness, and comfort the user\n\
when they are lonely. Gently encourage daily care: medicine, meals, water,\n\
rest, and light exercise. Be their trusted friend and make them feel safe.";

/// A conversational responder for utterances with no deterministic intent.
#[async_trait]
pub trait ConversationalResponder: Send + Sync {
    /// Produce a reply to the user's utterance.
    ///
    /// # Errors
    ///
    /// Returns an LLM error when the backend is unreachable or returns
    /// an unusable response.
    async fn respond(&self, prompt: &str) -> Result<String>;
}

/// Responder backed by a Gemini-style `generateContent` endpoint.
pub struct GeminiResponder {
    http: reqwest::Client,
    url: String,
    api_key: String,
    system_prompt: String,
}

impl GeminiResponder {
    /// Create a responder from configuration.
    ///
    /// The API key comes from the config, or from the `GEMINI_API_KEY`
    /// environment variable when the config leaves it empty.
    ///
    /// # Errors
    ///
    /// Returns a config error when no API key can be resolved or the
    /// HTTP client cannot be built.
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = if config.api_key.trim().is_empty() {
            std::env::var("GEMINI_API_KEY").unwrap_or_default()
        } else {
            config.api_key.clone()
        };
        if api_key.trim().is_empty() {
            return Err(AssistantError::Config(
                "no LLM API key: set llm.api_key or GEMINI_API_KEY".to_owned(),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AssistantError::Config(format!("cannot build HTTP client: {e}")))?;

        let url = format!(
            "{}/{}:generateContent",
            config.api_url.trim_end_matches('/'),
            config.api_model
        );
        info!("conversational responder: {url}");

        Ok(Self {
            http,
            url,
            api_key,
            system_prompt: config
                .system_prompt
                .clone()
                .unwrap_or_else(|| SYSTEM_PROMPT.to_owned()),
        })
    }
}

#[async_trait]
impl ConversationalResponder for GeminiResponder {
    async fn respond(&self, prompt: &str) -> Result<String> {
        let body = serde_json::json!({
            "contents": [{
                "parts": [{
                    "text": format!("{}\nUser: {prompt}", self.system_prompt),
                }],
            }],
        });

        let response = self
            .http
            .post(&self.url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| AssistantError::Llm(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AssistantError::Llm(format!(
                "responder returned HTTP {status}"
            )));
        }

        let value: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AssistantError::Llm(format!("invalid response body: {e}")))?;

        debug!("responder reply received");
        extract_text(&value)
            .ok_or_else(|| AssistantError::Llm("response contained no text".to_owned()))
    }
}

/// Pull the first candidate's text out of a `generateContent` response.
fn extract_text(value: &serde_json::Value) -> Option<String> {
    let text = value
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .get(0)?
        .get("text")?
        .as_str()?
        .trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_owned())
    }
}

/// Responder used when no API key is configured.
///
/// Every call errors, which the dispatcher turns into the apologetic
/// reply, so deterministic date/time answers keep working without a key.
pub struct OfflineResponder;

#[async_trait]
impl ConversationalResponder for OfflineResponder {
    async fn respond(&self, _prompt: &str) -> Result<String> {
        Err(AssistantError::Llm(
            "conversational responder is not configured".to_owned(),
        ))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn extracts_candidate_text() {
        let value = serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "  Hello there.  " }] },
            }],
        });
        assert_eq!(extract_text(&value).as_deref(), Some("Hello there."));
    }

    #[test]
    fn missing_fields_extract_to_none() {
        assert_eq!(extract_text(&serde_json::json!({})), None);
        assert_eq!(extract_text(&serde_json::json!({ "candidates": [] })), None);
        let no_parts = serde_json::json!({
            "candidates": [{ "content": {} }],
        });
        assert_eq!(extract_text(&no_parts), None);
    }

    #[test]
    fn whitespace_only_text_extracts_to_none() {
        let value = serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "   " }] },
            }],
        });
        assert_eq!(extract_text(&value), None);
    }

    #[test]
    fn missing_api_key_is_a_config_error() {
        let config = LlmConfig {
            api_key: String::new(),
            ..LlmConfig::default()
        };
        // Only meaningful when the environment variable is absent.
        if std::env::var("GEMINI_API_KEY").is_err() {
            assert!(GeminiResponder::new(&config).is_err());
        }
    }

    #[tokio::test]
    async fn offline_responder_always_errors() {
        let err = OfflineResponder.respond("hello").await.unwrap_err();
        assert!(matches!(err, AssistantError::Llm(_)));
    }
}
