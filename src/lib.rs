// Public modules
pub mod chat;
pub mod client;
pub mod client_logger;
pub mod conversation;
pub mod credential;
pub mod error;
pub mod observability;
pub mod render;
pub mod types;
pub mod typewriter;
pub mod wrap;

// Re-exports
pub use client::{Completion, Inference, InferenceClient, error_from_status};
pub use client_logger::ClientLogger;
pub use conversation::{Conversation, DEFAULT_EXPORT_FILE};
pub use credential::{Credential, DEFAULT_SECRETS_PATH, TOKEN_VARIABLE};
pub use error::{Error, Result};
pub use observability::register_biometrics;
pub use render::{PlainTextRenderer, Renderer};
pub use types::*;
pub use typewriter::{CURSOR, FRAME_DELAY, Frame, FrameSink, typewrite};
