//! Optional crash-summary assistant backed by the Gemini API.
//!
//! Only compiled with the `ai-assist` feature. The request is made with a
//! blocking client and a short timeout so a crash report never hangs the
//! process; any failure is logged and otherwise ignored.

use crate::core::config::AiConfig;
use crate::core::dispatcher::FlexLogger;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const CHUNK_SIZE: usize = 100;

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiMessage {
    parts: Vec<GeminiPart>,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    error: Option<GeminiError>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiMessage,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    code: i32,
    message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AssistError {
    #[error("API key is empty")]
    InvalidKey,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("remote error {code}: {message}")]
    Remote { code: i32, message: String },

    #[error("response contained no candidates")]
    EmptyResponse,
}

fn build_prompt(config: &AiConfig, crash_message: &str) -> String {
    format!(
        "You are a senior software engineer. Analyze the following crash \
         report, explain the most likely root cause, and suggest a concrete \
         fix. Keep the answer short and practical. Answer in {}.\n\n{}",
        config.language, crash_message
    )
}

/// Ask Gemini for a summary of `crash_message`.
pub fn summarize_crash(config: &AiConfig, crash_message: &str) -> Result<String, AssistError> {
    if config.api_key.trim().is_empty() {
        return Err(AssistError::InvalidKey);
    }

    let request = GeminiRequest {
        contents: vec![GeminiMessage {
            parts: vec![GeminiPart {
                text: build_prompt(config, crash_message),
            }],
            role: Some("user".to_string()),
        }],
    };

    let url = format!(
        "{}/{}:generateContent?key={}",
        GEMINI_ENDPOINT, config.model, config.api_key
    );

    let client = reqwest::blocking::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()?;
    let response: GeminiResponse = client.post(&url).json(&request).send()?.json()?;

    if let Some(error) = response.error {
        return Err(AssistError::Remote {
            code: error.code,
            message: error.message,
        });
    }

    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content.parts.into_iter().next())
        .map(|p| p.text)
        .ok_or(AssistError::EmptyResponse)
}

/// Run [`report_crash`] on its own thread.
///
/// The caller gets the handle back but never has to join it; the crash
/// path must proceed without waiting on the network.
pub(crate) fn spawn_report(
    logger: Arc<FlexLogger>,
    config: AiConfig,
    crash_message: String,
) -> std::io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("flexlog-ai".to_string())
        .spawn(move || report_crash(&logger, &config, &crash_message))
}

/// Summarize a crash and log the result through `logger`.
///
/// The summary is split into ~100 character chunks at word boundaries and
/// logged at Debug under the `AiHelper` tag; failures are logged at Error
/// under the same tag.
pub(crate) fn report_crash(logger: &FlexLogger, config: &AiConfig, crash_message: &str) {
    match summarize_crash(config, crash_message) {
        Ok(summary) => {
            for chunk in wrap_text(&summary, CHUNK_SIZE) {
                logger.debug(Some("AiHelper"), chunk);
            }
        }
        Err(e) => {
            logger.error(
                Some("AiHelper"),
                format!("Failed to fetch crash summary: {}", e),
                None,
            );
        }
    }
}

/// Split `text` into chunks of at most `chunk_size` characters, breaking at
/// word boundaries. A single word longer than `chunk_size` becomes its own
/// chunk rather than being split.
pub(crate) fn wrap_text(text: &str, chunk_size: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
        } else if current.chars().count() + 1 + word.chars().count() <= chunk_size {
            current.push(' ');
            current.push_str(word);
        } else {
            chunks.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
