//! # Error Taxonomy
//!
//! Every failure a command can run into falls into one of these buckets. Each
//! bucket knows the message the invoking user sees; operators get the
//! `Display` form in the logs.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.3.0
//! - **Toggleable**: false

use thiserror::Error;

use crate::generation::GenerationError;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommandError {
    /// The invoking member lacks the capability bit the command declares.
    #[error("member lacks the permission required by this command")]
    PermissionDenied,

    /// Malformed input: out-of-range numbers, bad durations, too few options.
    #[error("invalid input: {0}")]
    Validation(String),

    /// Text generation or a gateway mutation failed or timed out.
    #[error("upstream call failed: {0}")]
    Upstream(String),

    /// Text generation refused to answer.
    #[error("response blocked by the safety filter")]
    SafetyBlocked,

    /// A settings write failed. Logged only, never shown to the user.
    #[error("settings write failed: {0}")]
    Persistence(String),

    /// The single-flight AI gate is already held.
    #[error("a generation request is already in flight")]
    Busy,

    /// A handler panicked.
    #[error("handler panicked: {0}")]
    Internal(String),
}

impl CommandError {
    /// Text shown to the invoking user.
    pub fn user_message(&self) -> String {
        match self {
            CommandError::PermissionDenied => {
                "❌ You don't have permission to use this command.".to_string()
            }
            CommandError::Validation(reason) => format!("⚠️ {}", reason),
            CommandError::Upstream(_) => {
                "❌ Sorry, something went wrong while talking to Discord or the AI service. Please try again later."
                    .to_string()
            }
            CommandError::SafetyBlocked => {
                "🚫 The response was blocked due to safety concerns.".to_string()
            }
            CommandError::Persistence(_) => {
                "⚠️ Your change could not be saved right now.".to_string()
            }
            CommandError::Busy => {
                "⏳ The bot is processing another request, please wait and try again.".to_string()
            }
            CommandError::Internal(_) => crate::router::GENERIC_ERROR_MESSAGE.to_string(),
        }
    }
}

impl From<GenerationError> for CommandError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::SafetyBlocked => CommandError::SafetyBlocked,
            GenerationError::Upstream(reason) => CommandError::Upstream(reason),
        }
    }
}
