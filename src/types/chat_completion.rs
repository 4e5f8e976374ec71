use serde::{Deserialize, Serialize};

use crate::types::{Message, Model, Usage};

/// Maximum number of tokens generated per reply.
pub const MAX_TOKENS: u32 = 512;

/// Sampling temperature used for every request.
pub const TEMPERATURE: f32 = 0.7;

/// Nucleus sampling probability used for every request.
pub const TOP_P: f32 = 0.95;

/// Body of a `POST chat/completions` request.
///
/// Borrows the conversation so that what goes on the wire is exactly the
/// caller's message slice.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatCompletionRequest<'a> {
    /// The model to run.
    pub model: Model,

    /// The conversation so far, oldest first.
    pub messages: &'a [Message],

    /// Upper bound on generated tokens.
    pub max_tokens: u32,

    /// Sampling temperature.
    pub temperature: f32,

    /// Nucleus sampling probability.
    pub top_p: f32,

    /// Always false; replies are received whole.
    pub stream: bool,
}

impl<'a> ChatCompletionRequest<'a> {
    /// Builds a request with the fixed generation parameters.
    pub fn new(model: Model, messages: &'a [Message]) -> Self {
        Self {
            model,
            messages,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            top_p: TOP_P,
            stream: false,
        }
    }
}

/// The message inside a returned choice.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChoiceMessage {
    /// Role reported by the server, usually `assistant`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Generated text. Some servers send `null` for empty completions.
    #[serde(default)]
    pub content: Option<String>,
}

/// One candidate completion.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Choice {
    /// Position of this candidate.
    #[serde(default)]
    pub index: u32,

    /// The generated message.
    pub message: ChoiceMessage,

    /// Why generation stopped (`stop`, `length`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Response of a `POST chat/completions` request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChatCompletionResponse {
    /// Server-assigned identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// The model that actually served the request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Candidate completions; only the first one is used.
    #[serde(default)]
    pub choices: Vec<Choice>,

    /// Token accounting, when the server reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl ChatCompletionResponse {
    /// Text of the first choice, if there is one.
    pub fn first_text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn request_carries_fixed_parameters() {
        let messages = vec![Message::user("hi"), Message::assistant("hello")];
        let request = ChatCompletionRequest::new(Model::Mistral7BInstructV02, &messages);
        let body = to_value(&request).unwrap();

        assert_eq!(body["model"], "mistralai/Mistral-7B-Instruct-v0.2");
        assert_eq!(body["max_tokens"], 512);
        assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert!((body["top_p"].as_f64().unwrap() - 0.95).abs() < 1e-6);
        assert_eq!(body["stream"], false);
        assert_eq!(
            body["messages"],
            json!([
                {"role": "user", "content": "hi"},
                {"role": "assistant", "content": "hello"}
            ])
        );
    }

    #[test]
    fn response_first_choice() {
        let response: ChatCompletionResponse = serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "model": "mistralai/Mistral-7B-Instruct-v0.2",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "first"}, "finish_reason": "stop"},
                {"index": 1, "message": {"role": "assistant", "content": "second"}}
            ],
            "usage": {"prompt_tokens": 7, "completion_tokens": 1, "total_tokens": 8}
        }))
        .unwrap();

        assert_eq!(response.first_text(), Some("first"));
        assert_eq!(response.usage, Some(Usage::new(7, 1)));
    }

    #[test]
    fn response_without_choices() {
        let response: ChatCompletionResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(response.first_text(), None);

        let response: ChatCompletionResponse = serde_json::from_value(json!({
            "choices": [{"message": {"content": null}}]
        }))
        .unwrap();
        assert_eq!(response.first_text(), None);
    }
}
