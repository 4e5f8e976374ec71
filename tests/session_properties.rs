//! Behavior of a chat session driven by scripted inference backends.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use hfchat::chat::{
    ChatConfig, ChatSession, FAILURE_REPLY, NOT_CONFIGURED_REPLY, Renderer, TurnOutcome,
};
use hfchat::{Completion, Credential, Error, Frame, FrameSink, Inference, Message, Model, Role};

#[derive(Debug, Clone, PartialEq)]
struct Call {
    model: Model,
    messages: Vec<Message>,
    token: String,
}

/// Answers with queued results and remembers every call.
#[derive(Clone, Default)]
struct Scripted {
    calls: Arc<Mutex<Vec<Call>>>,
    fail: bool,
}

impl Scripted {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Inference for Scripted {
    async fn send(
        &self,
        model: Model,
        messages: &[Message],
        credential: &Credential,
    ) -> hfchat::Result<Completion> {
        let mut calls = self.calls.lock().unwrap();
        calls.push(Call {
            model,
            messages: messages.to_vec(),
            token: credential.expose().to_string(),
        });
        if self.fail {
            return Err(Error::connection("connection refused", None));
        }
        Ok(Completion::new(format!("reply {}", calls.len())))
    }
}

#[derive(Default)]
struct Recorder {
    frames: Vec<String>,
    errors: Vec<String>,
    infos: Vec<String>,
    printed: Vec<Message>,
    responses: usize,
}

impl FrameSink for Recorder {
    fn show_frame(&mut self, frame: Frame<'_>) {
        self.frames.push(frame.rendered());
    }
}

impl Renderer for Recorder {
    fn print_message(&mut self, message: &Message) {
        self.printed.push(message.clone());
    }

    fn print_error(&mut self, error: &str) {
        self.errors.push(error.to_string());
    }

    fn print_info(&mut self, info: &str) {
        self.infos.push(info.to_string());
    }

    fn finish_response(&mut self) {
        self.responses += 1;
    }
}

fn config() -> ChatConfig {
    ChatConfig::new().with_typewriter_delay(Duration::ZERO)
}

fn session_with(backend: Scripted, token: Option<&str>) -> ChatSession<Scripted> {
    ChatSession::new(backend, &config(), token.and_then(Credential::new))
}

fn assert_alternating(messages: &[Message]) {
    for (idx, message) in messages.iter().enumerate() {
        let expected = if idx % 2 == 0 {
            Role::User
        } else {
            Role::Assistant
        };
        assert_eq!(message.role(), expected, "message {idx} has the wrong role");
    }
}

#[tokio::test]
async fn n_submissions_make_2n_alternating_messages() {
    let backend = Scripted::default();
    let mut session = session_with(backend.clone(), Some("hf_token"));
    let mut renderer = Recorder::default();

    for n in 1..=5 {
        let outcome = session.submit(&format!("question {n}"), &mut renderer).await;
        assert!(outcome.is_replied());
    }

    let messages = session.messages();
    assert_eq!(messages.len(), 10);
    assert_alternating(messages);
    for n in 1..=5 {
        assert_eq!(messages[2 * (n - 1)].content(), format!("question {n}"));
        assert_eq!(messages[2 * n - 1].content(), format!("reply {n}"));
    }
    assert_eq!(renderer.responses, 5);
    assert!(renderer.errors.is_empty());
}

#[tokio::test]
async fn each_call_sees_the_whole_conversation() {
    let backend = Scripted::default();
    let mut session = session_with(backend.clone(), Some("hf_token"));
    let mut renderer = Recorder::default();

    session.submit("first", &mut renderer).await;
    session.submit("second", &mut renderer).await;

    let calls = backend.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].messages, vec![Message::user("first")]);
    assert_eq!(
        calls[1].messages,
        vec![
            Message::user("first"),
            Message::assistant("reply 1"),
            Message::user("second"),
        ]
    );
    assert!(calls.iter().all(|call| call.token == "hf_token"));
}

#[tokio::test]
async fn clear_restarts_from_index_zero() {
    let backend = Scripted::default();
    let mut session = session_with(backend.clone(), Some("hf_token"));
    let mut renderer = Recorder::default();

    session.submit("one", &mut renderer).await;
    session.submit("two", &mut renderer).await;
    session.clear();
    assert_eq!(session.message_count(), 0);

    session.submit("fresh", &mut renderer).await;
    let messages = session.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0], Message::user("fresh"));
    assert_alternating(messages);
    assert_eq!(
        backend.calls().last().unwrap().messages,
        vec![Message::user("fresh")]
    );
}

#[tokio::test]
async fn missing_credential_skips_the_call() {
    let backend = Scripted::default();
    let mut session = session_with(backend.clone(), None);
    let mut renderer = Recorder::default();

    let outcome = session.submit("hello", &mut renderer).await;

    assert!(matches!(outcome, TurnOutcome::NotConfigured));
    assert_eq!(
        session.messages(),
        &[
            Message::user("hello"),
            Message::assistant(NOT_CONFIGURED_REPLY)
        ]
    );
    assert_eq!(session.messages()[1].content(), "API token not configured.");
    assert!(backend.calls().is_empty());
    assert_eq!(renderer.errors.len(), 1);
    assert!(renderer.frames.is_empty());

    // The session keeps working.
    session.submit("again", &mut renderer).await;
    assert_eq!(session.message_count(), 4);
}

#[tokio::test]
async fn failing_call_records_placeholder() {
    let backend = Scripted::failing();
    let mut session = session_with(backend.clone(), Some("hf_token"));
    let mut renderer = Recorder::default();

    let outcome = session.submit("anything", &mut renderer).await;

    let TurnOutcome::Failed(err) = outcome else {
        panic!("expected a failed turn");
    };
    assert!(err.is_connection());
    assert_eq!(session.message_count(), 2);
    assert_eq!(session.messages()[0].role(), Role::User);
    assert_eq!(session.messages()[1].role(), Role::Assistant);
    assert!(session.messages()[1].content().contains(FAILURE_REPLY));
    assert_eq!(renderer.errors.len(), 1);
    assert!(renderer.errors[0].starts_with("An error occurred: "));
    assert!(renderer.errors[0].contains("connection refused"));
    assert_eq!(session.stats().failed_requests, 1);
}

#[tokio::test]
async fn switching_models_keeps_history() {
    let backend = Scripted::default();
    let mut session = session_with(backend.clone(), Some("hf_token"));
    let mut renderer = Recorder::default();

    session.submit("on v0.2", &mut renderer).await;
    let before = session.messages().to_vec();

    session.set_model(Model::Mistral7BInstructV01);
    assert_eq!(session.messages(), before.as_slice());

    session.submit("on v0.1", &mut renderer).await;

    let calls = backend.calls();
    assert_eq!(calls[0].model, Model::Mistral7BInstructV02);
    assert_eq!(calls[1].model, Model::Mistral7BInstructV01);
    let mut expected = before.clone();
    expected.push(Message::user("on v0.1"));
    assert_eq!(calls[1].messages, expected);
    assert_eq!(session.message_count(), 4);
}

#[tokio::test]
async fn export_after_a_turn() {
    let backend = Scripted::default();
    let mut session = session_with(backend, Some("hf_token"));
    let mut renderer = Recorder::default();

    session.submit("hi", &mut renderer).await;
    assert_eq!(session.export(), "User: hi\nAssistant: reply 1");

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chat_history.txt");
    session.export_to(&path).unwrap();
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "User: hi\nAssistant: reply 1"
    );
}

#[tokio::test]
async fn reply_is_replayed_word_by_word() {
    let backend = Scripted::default();
    let mut session = session_with(backend, Some("hf_token"));
    let mut renderer = Recorder::default();

    session.submit("hi", &mut renderer).await;

    assert_eq!(renderer.frames, vec!["reply▌", "reply 1▌", "reply 1"]);
}

#[tokio::test]
async fn stored_reply_is_not_wrapped() {
    struct Verbose;

    #[async_trait::async_trait]
    impl Inference for Verbose {
        async fn send(
            &self,
            _model: Model,
            _messages: &[Message],
            _credential: &Credential,
        ) -> hfchat::Result<Completion> {
            Ok(Completion::new("lorem ipsum ".repeat(20).trim_end().to_string()))
        }
    }

    let mut session = ChatSession::new(Verbose, &config(), Credential::new("hf_token"));
    let mut renderer = Recorder::default();
    session.submit("talk", &mut renderer).await;

    let stored = session.messages()[1].content();
    assert!(!stored.contains('\n'));
    assert_eq!(stored.len(), "lorem ipsum ".len() * 20 - 1);
    let shown = renderer.frames.last().unwrap();
    assert!(shown.contains('\n'));
    assert!(shown.lines().all(|line| line.len() <= 80));
}

#[tokio::test]
async fn history_replay() {
    let backend = Scripted::default();
    let mut session = session_with(backend, Some("hf_token"));
    let mut renderer = Recorder::default();

    session.replay_history(&mut renderer);
    assert_eq!(renderer.infos, vec!["Chat history is empty.".to_string()]);

    session.submit("hi", &mut renderer).await;
    session.replay_history(&mut renderer);
    assert_eq!(renderer.printed, session.messages().to_vec());
}
