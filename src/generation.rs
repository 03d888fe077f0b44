//! # Feature: Text Generation
//!
//! Role-tagged prompts go out through [`TextGenerator`]; the production backend
//! is the OpenAI chat completion API. A content-filter stop is reported as
//! [`GenerationError::SafetyBlocked`] so callers can tell it apart from an
//! outage.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.3.0
//! - **Toggleable**: false

use async_trait::async_trait;
use log::{debug, warn};
use openai::chat::{ChatCompletion, ChatCompletionMessage, ChatCompletionMessageRole};
use regex::{Captures, Regex, RegexBuilder};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptRole {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptMessage {
    pub role: PromptRole,
    pub content: String,
}

impl PromptMessage {
    pub fn system(content: impl Into<String>) -> Self {
        PromptMessage {
            role: PromptRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        PromptMessage {
            role: PromptRole::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub messages: Vec<PromptMessage>,
    pub max_tokens: u64,
    pub temperature: f32,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    #[error("response blocked by the content filter")]
    SafetyBlocked,
    #[error("generation failed: {0}")]
    Upstream(String),
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError>;
}

pub struct OpenAiGenerator {
    model: String,
}

impl OpenAiGenerator {
    /// Expects `openai::set_key` to have been called already.
    pub fn new(model: impl Into<String>) -> Self {
        OpenAiGenerator {
            model: model.into(),
        }
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        let messages: Vec<ChatCompletionMessage> = request
            .messages
            .into_iter()
            .map(|message| ChatCompletionMessage {
                role: match message.role {
                    PromptRole::System => ChatCompletionMessageRole::System,
                    PromptRole::User => ChatCompletionMessageRole::User,
                },
                content: Some(message.content),
                name: None,
                function_call: None,
            })
            .collect();

        debug!(
            "Requesting completion from {} (max_tokens={}, temperature={})",
            self.model, request.max_tokens, request.temperature
        );

        let chat_completion = ChatCompletion::builder(&self.model, messages)
            .max_tokens(request.max_tokens)
            .temperature(request.temperature)
            .create()
            .await
            .map_err(|e| GenerationError::Upstream(e.to_string()))?;

        let choice = chat_completion
            .choices
            .first()
            .ok_or_else(|| GenerationError::Upstream("No response from OpenAI".to_string()))?;

        if choice.finish_reason == "content_filter" {
            return Err(GenerationError::SafetyBlocked);
        }

        choice
            .message
            .content
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
            .ok_or_else(|| GenerationError::Upstream("Empty response from OpenAI".to_string()))
    }
}

/// Turns references to the bot's creator into a clickable mention.
///
/// Occurrences of `creator_name` are replaced outright. If that left no
/// mention, "my amazing creator" style phrases get one appended. Finally
/// "created by ..."/"made by ..." clauses are rewritten to point at it.
pub fn mention_creator(text: &str, creator_name: &str, mention: &str) -> String {
    let mut output = text.to_string();

    if !creator_name.trim().is_empty() {
        match RegexBuilder::new(&regex::escape(creator_name))
            .case_insensitive(true)
            .build()
        {
            Ok(name) => output = name.replace_all(&output, regex::NoExpand(mention)).into_owned(),
            Err(e) => warn!("Could not build creator name pattern: {}", e),
        }
    }

    if !output.contains(mention) {
        match Regex::new(r"(?i)my (wonderful|amazing|awesome|great) creator") {
            Ok(praise) => {
                output = praise
                    .replace_all(&output, |caps: &Captures| format!("{} {}", &caps[0], mention))
                    .into_owned();
            }
            Err(e) => warn!("Could not build creator praise pattern: {}", e),
        }
    }

    match Regex::new(r"(?i)\b(created|made) by ([^.!?\n]+)") {
        Ok(credit) => {
            output = credit
                .replace_all(&output, |caps: &Captures| format!("{} by {}", &caps[1], mention))
                .into_owned();
        }
        Err(e) => warn!("Could not build creator credit pattern: {}", e),
    }

    output
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Replays a canned result and records every request.
    pub struct MockGenerator {
        result: Result<String, GenerationError>,
        calls: AtomicUsize,
        pub requests: Mutex<Vec<GenerationRequest>>,
    }

    impl MockGenerator {
        pub fn replying(text: &str) -> Self {
            MockGenerator::with_result(Ok(text.to_string()))
        }

        pub fn with_result(result: Result<String, GenerationError>) -> Self {
            MockGenerator {
                result,
                calls: AtomicUsize::new(0),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextGenerator for MockGenerator {
        async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request);
            self.result.clone()
        }
    }
}
