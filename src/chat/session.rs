//! Core chat session management.
//!
//! This module provides the `ChatSession` struct which owns the conversation,
//! the selected model and the credential, and runs one inference call per
//! user submission.

use std::path::Path;
use std::time::Duration;

use crate::chat::config::ChatConfig;
use crate::client::Inference;
use crate::conversation::Conversation;
use crate::credential::Credential;
use crate::error::{Error, Result};
use crate::observability::{
    SESSION_CLEARS, SESSION_TURNS, SESSION_TURNS_FAILED, SESSION_TURNS_UNCONFIGURED,
};
use crate::render::Renderer;
use crate::types::{Message, Model, Usage};
use crate::typewriter::typewrite;

/// Assistant turn recorded when no credential is configured.
pub const NOT_CONFIGURED_REPLY: &str = "API token not configured.";

/// Assistant turn recorded when the inference call fails.
pub const FAILURE_REPLY: &str = "Sorry, I couldn't process your request.";

/// Notice shown when a submission is made without a credential.
pub const NOT_CONFIGURED_NOTICE: &str =
    "Cannot generate response. Please configure your Hugging Face API token.";

/// How a submission was answered.
#[derive(Debug, Clone)]
pub enum TurnOutcome {
    /// The model replied; its text was recorded.
    Replied,
    /// No credential; [`NOT_CONFIGURED_REPLY`] was recorded without a call.
    NotConfigured,
    /// The call failed; [`FAILURE_REPLY`] was recorded.
    Failed(Error),
}

impl TurnOutcome {
    /// True when the model actually replied.
    pub fn is_replied(&self) -> bool {
        matches!(self, TurnOutcome::Replied)
    }
}

/// A chat session that manages conversation state and inference calls.
///
/// Every submission leaves exactly one assistant entry after the user entry,
/// whatever happens to the call.
pub struct ChatSession<I: Inference> {
    inference: I,
    conversation: Conversation,
    model: Model,
    credential: Option<Credential>,
    typewriter_delay: Duration,
    usage_totals: Usage,
    request_count: u64,
    failed_count: u64,
}

/// Aggregated stats for a chat session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStats {
    /// The model currently selected.
    pub model: Model,
    /// The number of messages in the conversation.
    pub message_count: usize,
    /// Whether a credential is loaded.
    pub has_credential: bool,
    /// Total number of inference calls made.
    pub total_requests: u64,
    /// Number of inference calls that failed.
    pub failed_requests: u64,
    /// Prompt tokens across all successful requests.
    pub total_prompt_tokens: u64,
    /// Completion tokens across all successful requests.
    pub total_completion_tokens: u64,
}

impl<I: Inference> ChatSession<I> {
    /// Creates a new chat session.
    pub fn new(inference: I, config: &ChatConfig, credential: Option<Credential>) -> Self {
        Self {
            inference,
            conversation: Conversation::new(),
            model: config.model,
            credential,
            typewriter_delay: config.typewriter_delay,
            usage_totals: Usage::default(),
            request_count: 0,
            failed_count: 0,
        }
    }

    /// Records `user_input`, asks the model, and records the answer.
    ///
    /// The reply is replayed through `renderer` word by word; the stored text
    /// is the unwrapped reply. Failures are reported to `renderer` and stored
    /// as placeholders, so the session always remains usable.
    pub async fn submit(
        &mut self,
        user_input: &str,
        renderer: &mut dyn Renderer,
    ) -> TurnOutcome {
        SESSION_TURNS.click();
        self.conversation.append(Message::user(user_input));

        let Some(credential) = &self.credential else {
            SESSION_TURNS_UNCONFIGURED.click();
            tracing::info!("no API token configured; skipping inference");
            renderer.print_error(NOT_CONFIGURED_NOTICE);
            self.conversation
                .append(Message::assistant(NOT_CONFIGURED_REPLY));
            return TurnOutcome::NotConfigured;
        };

        self.request_count = self.request_count.saturating_add(1);
        let result = self
            .inference
            .send(self.model, self.conversation.all(), credential)
            .await;

        match result {
            Ok(completion) => {
                if let Some(usage) = completion.usage() {
                    self.usage_totals = self.usage_totals + usage;
                }
                renderer.start_response();
                typewrite(&completion.display(), self.typewriter_delay, &mut *renderer).await;
                renderer.finish_response();
                self.conversation
                    .append(Message::assistant(completion.text()));
                TurnOutcome::Replied
            }
            Err(err) => {
                SESSION_TURNS_FAILED.click();
                self.failed_count = self.failed_count.saturating_add(1);
                tracing::warn!(model = %self.model, error = %err, "turn failed");
                renderer.print_error(&format!("An error occurred: {err}"));
                self.conversation.append(Message::assistant(FAILURE_REPLY));
                TurnOutcome::Failed(err)
            }
        }
    }

    /// Clears the conversation history.
    pub fn clear(&mut self) {
        SESSION_CLEARS.click();
        self.conversation.clear();
    }

    /// Every stored message, oldest first.
    pub fn messages(&self) -> &[Message] {
        self.conversation.all()
    }

    /// Returns the number of messages in the conversation.
    pub fn message_count(&self) -> usize {
        self.conversation.len()
    }

    /// Changes the model used for subsequent submissions.
    pub fn set_model(&mut self, model: Model) {
        self.model = model;
    }

    /// Returns the current model.
    pub fn model(&self) -> Model {
        self.model
    }

    /// True when submissions will reach the model.
    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    /// The pause between revealed words.
    pub fn typewriter_delay(&self) -> Duration {
        self.typewriter_delay
    }

    /// The transcript as `Role: content` lines.
    pub fn export(&self) -> String {
        self.conversation.export()
    }

    /// Writes the transcript to `path`.
    pub fn export_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.conversation.export_to(path)
    }

    /// Prints every stored turn through `renderer`.
    pub fn replay_history(&self, renderer: &mut dyn Renderer) {
        if self.conversation.is_empty() {
            renderer.print_info("Chat history is empty.");
            return;
        }
        for message in self.conversation.all() {
            renderer.print_message(message);
        }
    }

    /// Returns the current session statistics snapshot.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            model: self.model,
            message_count: self.message_count(),
            has_credential: self.has_credential(),
            total_requests: self.request_count,
            failed_requests: self.failed_count,
            total_prompt_tokens: self.usage_totals.prompt_tokens,
            total_completion_tokens: self.usage_totals.completion_tokens,
        }
    }
}
