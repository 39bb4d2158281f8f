//! Request and response bodies for the messages API

use serde::{Deserialize, Serialize};

/// Models available for drafting
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum DraftModel {
    /// Fast and cheap; fine for short courses
    #[default]
    Haiku45,
    Sonnet45,
    Opus45,
}

impl DraftModel {
    /// API model identifier
    pub fn model_id(&self) -> &'static str {
        match self {
            Self::Haiku45 => "claude-haiku-4-5-20251001",
            Self::Sonnet45 => "claude-sonnet-4-5-20250929",
            Self::Opus45 => "claude-opus-4-5-20251101",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Haiku45 => "Haiku 4.5",
            Self::Sonnet45 => "Sonnet 4.5",
            Self::Opus45 => "Opus 4.5",
        }
    }

    /// Parse a short name or a full model id
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "haiku" | "haiku45" | "claude-haiku-4-5-20251001" => Some(Self::Haiku45),
            "sonnet" | "sonnet45" | "claude-sonnet-4-5-20250929" => Some(Self::Sonnet45),
            "opus" | "opus45" | "claude-opus-4-5-20251101" => Some(Self::Opus45),
            _ => None,
        }
    }
}

impl std::str::FromStr for DraftModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Unknown model: {}. Options: haiku, sonnet, opus", s))
    }
}

/// Message role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single message in the conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
}

/// Request body for the messages API
#[derive(Debug, Clone, Serialize)]
pub struct CreateMessageRequest {
    pub model: String,
    pub max_tokens: u32,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
}

impl CreateMessageRequest {
    /// Create a request with default settings
    pub fn new(model: DraftModel, messages: Vec<Message>) -> Self {
        Self { model: model.model_id().to_string(), max_tokens: 8192, messages, system: None }
    }

    /// Set the system prompt
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set max tokens
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Response from the messages API
#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    pub id: String,
    pub content: Vec<ResponseBlock>,
    pub stop_reason: Option<String>,
    pub usage: Usage,
}

impl MessageResponse {
    /// All text blocks joined together
    pub fn text(&self) -> String {
        self.content.iter().filter_map(|block| block.text.as_deref()).collect::<Vec<_>>().join("")
    }
}

/// Content block in a response
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseBlock {
    /// Block type (usually "text")
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

/// Token usage statistics
#[derive(Debug, Clone, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_parse() {
        assert_eq!(DraftModel::parse("haiku"), Some(DraftModel::Haiku45));
        assert_eq!(DraftModel::parse("SONNET"), Some(DraftModel::Sonnet45));
        assert_eq!(DraftModel::parse("claude-opus-4-5-20251101"), Some(DraftModel::Opus45));
        assert_eq!(DraftModel::parse("unknown"), None);
        assert!("gpt".parse::<DraftModel>().is_err());
    }

    #[test]
    fn request_serializes_without_empty_system() {
        let request = CreateMessageRequest::new(DraftModel::Haiku45, vec![Message::user("Hi")])
            .with_max_tokens(100);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], "claude-haiku-4-5-20251001");
        assert_eq!(json["max_tokens"], 100);
        assert_eq!(json["messages"][0]["role"], "user");
        assert!(json.get("system").is_none());
    }

    #[test]
    fn response_text_joins_blocks() {
        let body = r#"{
            "id": "msg_1",
            "content": [
                {"type": "text", "text": "{\"title\":"},
                {"type": "text", "text": "\"X\"}"}
            ],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 10, "output_tokens": 5}
        }"#;
        let response: MessageResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.text(), r#"{"title":"X"}"#);
    }
}
