//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for controlling chat behavior.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use arrrg_derive::CommandLine;

use crate::types::Model;
use crate::typewriter::FRAME_DELAY;

/// Command-line arguments for the hfchat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Model to use for chat.
    #[arrrg(
        optional,
        "Model to use (default: mistralai/Mistral-7B-Instruct-v0.2)",
        "MODEL"
    )]
    pub model: Option<String>,

    /// YAML file holding HUGGINGFACEHUB_API_TOKEN.
    #[arrrg(optional, "Secrets file (default: .hfchat/secrets.yaml)", "PATH")]
    pub secrets: Option<String>,

    /// Alternate chat-completion endpoint.
    #[arrrg(optional, "Base URL of the chat-completion API", "URL")]
    pub base_url: Option<String>,

    /// Request timeout in seconds.
    #[arrrg(optional, "Request timeout in seconds (default: none)", "SECONDS")]
    pub timeout_secs: Option<u64>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,

    /// Print replies at once instead of word by word.
    #[arrrg(flag, "Print replies at once instead of word by word")]
    pub no_typewriter: bool,
}

/// Errors turning [`ChatArgs`] into a [`ChatConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatArgsError {
    /// The requested model is not on the allow-list.
    UnknownModel(String),
}

impl fmt::Display for ChatArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatArgsError::UnknownModel(model) => {
                let available = Model::ALL
                    .iter()
                    .map(Model::id)
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "unknown model {model}; choose one of: {available}")
            }
        }
    }
}

impl std::error::Error for ChatArgsError {}

/// Configuration for a chat session.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    /// The model to use for generating responses.
    pub model: Model,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,

    /// Pause between revealed words. Zero prints replies at once.
    pub typewriter_delay: Duration,

    /// Secrets file to read the token from, if not the default.
    pub secrets_path: Option<PathBuf>,

    /// Chat-completion endpoint, if not the default.
    pub base_url: Option<String>,

    /// Request timeout. `None` leaves the HTTP library default in place.
    pub timeout: Option<Duration>,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Model: mistralai/Mistral-7B-Instruct-v0.2
    /// - Color: enabled
    /// - Typewriter delay: 50ms
    pub fn new() -> Self {
        Self {
            model: Model::default(),
            use_color: true,
            typewriter_delay: FRAME_DELAY,
            secrets_path: None,
            base_url: None,
            timeout: None,
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// Sets the pause between revealed words.
    pub fn with_typewriter_delay(mut self, delay: Duration) -> Self {
        self.typewriter_delay = delay;
        self
    }

    /// Sets the secrets file path.
    pub fn with_secrets_path(mut self, path: Option<PathBuf>) -> Self {
        self.secrets_path = path;
        self
    }

    /// Sets the endpoint base URL.
    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        self.base_url = base_url;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<ChatArgs> for ChatConfig {
    type Error = ChatArgsError;

    fn try_from(args: ChatArgs) -> Result<Self, Self::Error> {
        let model = match args.model {
            Some(name) => name
                .parse::<Model>()
                .map_err(|_| ChatArgsError::UnknownModel(name))?,
            None => Model::default(),
        };
        let typewriter_delay = if args.no_typewriter {
            Duration::ZERO
        } else {
            FRAME_DELAY
        };

        Ok(ChatConfig {
            model,
            use_color: !args.no_color,
            typewriter_delay,
            secrets_path: args.secrets.map(PathBuf::from),
            base_url: args.base_url,
            timeout: args.timeout_secs.map(Duration::from_secs),
        })
    }
}
