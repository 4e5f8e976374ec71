use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response, header};
use serde_json::Value;

use crate::client_logger::ClientLogger;
use crate::credential::Credential;
use crate::error::{Error, Result};
use crate::observability::{
    CLIENT_EMPTY_RESPONSES, CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS, CLIENT_REQUESTS,
};
use crate::types::{ChatCompletionRequest, ChatCompletionResponse, Message, Model, Usage};
use crate::wrap::{DISPLAY_WIDTH, fill};

const DEFAULT_API_URL: &str = "https://router.huggingface.co/v1/";

/////////////////////////////////////////// Completion ///////////////////////////////////////////

/// The top reply to a chat-completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    text: String,
    model: Option<String>,
    finish_reason: Option<String>,
    usage: Option<Usage>,
}

impl Completion {
    /// A completion holding only `text`.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            model: None,
            finish_reason: None,
            usage: None,
        }
    }

    /// Attaches token accounting.
    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = Some(usage);
        self
    }

    /// The reply exactly as the model produced it.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The reply filled to [`DISPLAY_WIDTH`] columns.
    pub fn display(&self) -> String {
        fill(&self.text, DISPLAY_WIDTH)
    }

    /// The model that served the request, when reported.
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    /// Why generation stopped, when reported.
    pub fn finish_reason(&self) -> Option<&str> {
        self.finish_reason.as_deref()
    }

    /// Token accounting, when reported.
    pub fn usage(&self) -> Option<Usage> {
        self.usage
    }

    /// Turns a decoded response into a completion, using the first choice.
    pub fn from_response(response: ChatCompletionResponse) -> Result<Self> {
        if response.choices.is_empty() {
            return Err(Error::empty_response("response contained no choices"));
        }
        let Some(text) = response.first_text().map(String::from) else {
            return Err(Error::empty_response("first choice has no content"));
        };
        let ChatCompletionResponse {
            model,
            choices,
            usage,
            ..
        } = response;
        Ok(Self {
            text,
            model,
            finish_reason: choices.into_iter().next().and_then(|c| c.finish_reason),
            usage,
        })
    }
}

/////////////////////////////////////////// Inference ////////////////////////////////////////////

/// Something that can answer a conversation.
///
/// Implementations get the complete message list every time and keep no
/// conversation state of their own.
#[async_trait::async_trait]
pub trait Inference: Send + Sync {
    /// Sends `messages` to `model` and returns the top reply.
    async fn send(
        &self,
        model: Model,
        messages: &[Message],
        credential: &Credential,
    ) -> Result<Completion>;
}

//////////////////////////////////////// InferenceClient /////////////////////////////////////////

/// Client for the Hugging Face chat-completion API.
#[derive(Clone)]
pub struct InferenceClient {
    client: ReqwestClient,
    base_url: String,
    timeout: Option<Duration>,
    logger: Option<Arc<dyn ClientLogger>>,
}

impl InferenceClient {
    /// Create a new client against the default endpoint.
    pub fn new() -> Result<Self> {
        Self::with_options(None, None)
    }

    /// Create a new client with custom settings.
    ///
    /// Without a timeout the HTTP library's default applies.
    pub fn with_options(base_url: Option<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = ReqwestClient::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            Error::http_client(
                format!("Failed to build HTTP client: {}", e),
                Some(Box::new(e)),
            )
        })?;

        let mut base_url = base_url.unwrap_or_else(|| DEFAULT_API_URL.to_string());
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(Self {
            client,
            base_url,
            timeout,
            logger: None,
        })
    }

    /// Attaches a logger that sees every request and response.
    pub fn with_logger(mut self, logger: Arc<dyn ClientLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// The endpoint requests are sent to.
    pub fn endpoint(&self) -> String {
        format!("{}chat/completions", self.base_url)
    }

    /// Create and return headers for an authenticated request.
    fn headers(credential: &Credential) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        let mut authorization = HeaderValue::from_str(&format!("Bearer {}", credential.expose()))
            .map_err(|_| {
                Error::authentication("API token contains characters not allowed in a header")
            })?;
        authorization.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, authorization);
        Ok(headers)
    }

    /// Process API response errors and convert to our Error type
    async fn process_error_response(response: Response, model: Model) -> Error {
        let status_code = response.status().as_u16();
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|val| val.to_str().ok())
            .and_then(|val| val.parse::<u64>().ok());

        match response.text().await {
            Ok(body) => error_from_status(status_code, retry_after, &body, model),
            Err(e) => Error::http_client(
                format!("Failed to read error response: {}", e),
                Some(Box::new(e)),
            ),
        }
    }

    async fn post(
        &self,
        request: &ChatCompletionRequest<'_>,
        credential: &Credential,
    ) -> Result<Completion> {
        let headers = Self::headers(credential)?;
        if let Some(logger) = &self.logger {
            logger.log_request(request);
        }

        let response = self
            .client
            .post(self.endpoint())
            .headers(headers)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::timeout(e.to_string(), self.timeout.map(|t| t.as_secs_f64()))
                } else if e.is_connect() {
                    Error::connection(e.to_string(), Some(Box::new(e)))
                } else {
                    Error::http_client(format!("Request failed: {}", e), Some(Box::new(e)))
                }
            })?;

        if !response.status().is_success() {
            return Err(Self::process_error_response(response, request.model).await);
        }

        let body = response.text().await.map_err(|e| {
            Error::http_client(
                format!("Failed to read response: {}", e),
                Some(Box::new(e)),
            )
        })?;
        let decoded: ChatCompletionResponse = serde_json::from_str(&body).map_err(|e| {
            Error::serialization(
                format!("Failed to parse response: {}", e),
                Some(Box::new(e)),
            )
        })?;
        if let Some(logger) = &self.logger {
            logger.log_response(&decoded);
        }
        Completion::from_response(decoded).inspect_err(|_| CLIENT_EMPTY_RESPONSES.click())
    }
}

#[async_trait::async_trait]
impl Inference for InferenceClient {
    async fn send(
        &self,
        model: Model,
        messages: &[Message],
        credential: &Credential,
    ) -> Result<Completion> {
        let request = ChatCompletionRequest::new(model, messages);
        tracing::debug!(%model, messages = messages.len(), "sending chat completion");
        CLIENT_REQUESTS.click();
        let start = Instant::now();
        let result = self.post(&request, credential).await;
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());
        match &result {
            Ok(completion) => {
                tracing::debug!(
                    %model,
                    finish_reason = completion.finish_reason().unwrap_or("unknown"),
                    "chat completion succeeded"
                );
            }
            Err(err) => {
                CLIENT_REQUEST_ERRORS.click();
                tracing::warn!(%model, error = %err, "chat completion failed");
                if let Some(logger) = &self.logger {
                    logger.log_error(err);
                }
            }
        }
        result
    }
}

/// Maps a non-success status and its body to an [`Error`].
///
/// Understands `{"error": "..."}`, `{"error": {"message": "...", "type": "..."}}`
/// and `{"message": "..."}` bodies; anything else is reported verbatim.
pub fn error_from_status(
    status_code: u16,
    retry_after: Option<u64>,
    body: &str,
    model: Model,
) -> Error {
    let parsed = serde_json::from_str::<Value>(body).ok();
    let (message, error_type) = match parsed.as_ref() {
        Some(value) => describe_error_body(value),
        None => (None, None),
    };
    let message = message.unwrap_or_else(|| {
        let body = body.trim();
        if body.is_empty() {
            format!("HTTP {status_code} with empty body")
        } else {
            body.to_string()
        }
    });

    match status_code {
        400 | 422 => Error::bad_request(message),
        401 => Error::authentication(message),
        403 => Error::permission(message),
        404 => Error::not_found(message, Some(model.id().to_string())),
        408 => Error::timeout(message, None),
        429 => Error::rate_limit(message, retry_after),
        500 => Error::internal_server(message),
        502..=504 => Error::service_unavailable(message, retry_after),
        _ => Error::api(status_code, error_type, message),
    }
}

fn describe_error_body(value: &Value) -> (Option<String>, Option<String>) {
    match value.get("error") {
        Some(Value::String(message)) => (
            Some(message.clone()),
            value
                .get("error_type")
                .and_then(Value::as_str)
                .map(String::from),
        ),
        Some(Value::Object(detail)) => (
            detail
                .get("message")
                .and_then(Value::as_str)
                .map(String::from),
            detail.get("type").and_then(Value::as_str).map(String::from),
        ),
        _ => (
            value.get("message").and_then(Value::as_str).map(String::from),
            None,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Choice, ChoiceMessage};

    #[test]
    fn test_client_creation() {
        let client = InferenceClient::new().unwrap();
        assert_eq!(client.base_url, DEFAULT_API_URL);
        assert_eq!(client.timeout, None);
        assert_eq!(
            client.endpoint(),
            "https://router.huggingface.co/v1/chat/completions"
        );

        let client = InferenceClient::with_options(
            Some("http://localhost:8080/v1".to_string()),
            Some(Duration::from_secs(30)),
        )
        .unwrap();
        assert_eq!(client.base_url, "http://localhost:8080/v1/");
        assert_eq!(client.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn headers_carry_bearer_token() {
        let credential = Credential::new("hf_test").unwrap();
        let headers = InferenceClient::headers(&credential).unwrap();
        assert_eq!(headers[header::AUTHORIZATION], "Bearer hf_test");
        assert!(headers[header::AUTHORIZATION].is_sensitive());
    }

    #[test]
    fn headers_reject_control_characters() {
        let credential = Credential::new("hf_\u{7}bad").unwrap();
        let err = InferenceClient::headers(&credential).unwrap_err();
        assert!(err.is_authentication());
    }

    #[test]
    fn completion_uses_first_choice() {
        let response = ChatCompletionResponse {
            model: Some("mistralai/Mistral-7B-Instruct-v0.2".to_string()),
            choices: vec![
                Choice {
                    index: 0,
                    message: ChoiceMessage {
                        role: Some("assistant".to_string()),
                        content: Some("first".to_string()),
                    },
                    finish_reason: Some("stop".to_string()),
                },
                Choice {
                    index: 1,
                    message: ChoiceMessage {
                        role: None,
                        content: Some("second".to_string()),
                    },
                    finish_reason: None,
                },
            ],
            ..ChatCompletionResponse::default()
        };
        let completion = Completion::from_response(response).unwrap();
        assert_eq!(completion.text(), "first");
        assert_eq!(completion.finish_reason(), Some("stop"));
        assert_eq!(completion.model(), Some("mistralai/Mistral-7B-Instruct-v0.2"));
    }

    #[test]
    fn completion_requires_a_choice() {
        let err = Completion::from_response(ChatCompletionResponse::default()).unwrap_err();
        assert!(err.is_empty_response());
        assert!(err.to_string().contains("no choices"));
    }

    #[test]
    fn completion_requires_content() {
        let response = ChatCompletionResponse {
            choices: vec![Choice {
                message: ChoiceMessage {
                    role: Some("assistant".to_string()),
                    content: None,
                },
                finish_reason: Some("length".to_string()),
                ..Choice::default()
            }],
            ..ChatCompletionResponse::default()
        };
        assert_eq!(response.first_text(), None);
        let err = Completion::from_response(response).unwrap_err();
        assert!(err.is_empty_response());
        assert!(err.to_string().contains("no content"));
    }

    #[test]
    fn display_is_wrapped_but_text_is_not() {
        let long = "word ".repeat(40);
        let completion = Completion::new(long.clone());
        assert_eq!(completion.text(), long);
        assert!(completion.display().lines().count() > 1);
        assert!(completion.display().lines().all(|line| line.len() <= 80));
    }

    #[test]
    fn status_mapping() {
        let model = Model::default();
        let body = r#"{"error": "Invalid credentials in Authorization header"}"#;
        let err = error_from_status(401, None, body, model);
        assert!(err.is_authentication());
        assert!(err.to_string().contains("Invalid credentials"));

        let body = r#"{"error": {"message": "model not found", "type": "invalid_request_error"}}"#;
        let err = error_from_status(404, None, body, model);
        assert!(err.is_not_found());
        assert!(err.to_string().contains("mistralai/Mistral-7B-Instruct-v0.2"));

        let err = error_from_status(429, Some(12), r#"{"message": "slow down"}"#, model);
        assert!(matches!(err, Error::RateLimit { retry_after: Some(12), .. }));

        let err = error_from_status(503, None, "upstream unavailable", model);
        assert!(err.is_server_error());
        assert!(err.to_string().contains("upstream unavailable"));

        let body = r#"{"error": "teapot", "error_type": "brewing"}"#;
        let err = error_from_status(418, None, body, model);
        assert_eq!(err.to_string(), "brewing (HTTP 418): teapot");

        let err = error_from_status(500, None, "", model);
        assert_eq!(err.to_string(), "Internal server error: HTTP 500 with empty body");
    }
}
