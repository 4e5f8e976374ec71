//! Logging trait for inference client operations.
//!
//! This module provides the [`ClientLogger`] trait that allows users to capture
//! every request and response passing through the [`InferenceClient`].
//!
//! [`InferenceClient`]: crate::InferenceClient

use crate::{ChatCompletionRequest, ChatCompletionResponse, Error};

/// A trait for logging inference client operations.
///
/// # Example
///
/// ```rust,ignore
/// use hfchat::{ChatCompletionRequest, ChatCompletionResponse, ClientLogger, Error};
/// use std::io::Write;
/// use std::sync::Mutex;
///
/// struct FileLogger {
///     file: Mutex<std::fs::File>,
/// }
///
/// impl ClientLogger for FileLogger {
///     fn log_request(&self, request: &ChatCompletionRequest<'_>) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "Request: {}", serde_json::to_string(request).unwrap()).unwrap();
///     }
///
///     fn log_response(&self, response: &ChatCompletionResponse) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "Response: {}", serde_json::to_string(response).unwrap()).unwrap();
///     }
/// }
/// ```
pub trait ClientLogger: Send + Sync {
    /// Log a request just before it is sent.
    fn log_request(&self, request: &ChatCompletionRequest<'_>);

    /// Log a successfully decoded response.
    fn log_response(&self, response: &ChatCompletionResponse);

    /// Log a failed request. The default does nothing.
    fn log_error(&self, error: &Error) {
        _ = error;
    }
}
