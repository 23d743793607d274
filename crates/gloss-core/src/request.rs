//! Chat-completion request shape and the fixed translation prompt

use crate::config::RunSettings;
use serde::{Deserialize, Serialize};

/// Instruction sent as the system message of every request
pub const SYSTEM_PROMPT: &str = "\
You are an expert linguistic assistant helping young Vietnamese learners understand English \
academic content. Your task is to identify 5-10 COMPLICATED vocabulary words that would be \
challenging for Vietnamese students. Focus on: abstract concepts, academic terminology, \
complex adjectives, philosophical terms, technical vocabulary. AVOID: proper names, places, \
people's names, simple words, basic vocabulary. Return ONLY a valid, raw JSON object with \
English terms as lowercase keys and Vietnamese translations as values.";

/// Message author role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instruction
    System,
    /// Caller content
    User,
}

/// One message of a chat-completion request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author role
    pub role: Role,
    /// Message text
    pub content: String,
}

impl ChatMessage {
    /// System message
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// User message
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Body of a chat-completion request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    /// Model identifier
    pub model: String,
    /// Ordered messages
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature
    pub temperature: f32,
    /// Response length cap
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Request a translation dictionary for one row's source text
    #[must_use]
    pub fn translation_dictionary(settings: &RunSettings, source_text: &str) -> Self {
        Self {
            model: settings.model.clone(),
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(format!(
                    "Here is the text: {source_text}. Please create the translation JSON."
                )),
            ],
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        }
    }

    /// Text of the user message, if any
    #[must_use]
    pub fn user_content(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }
}
