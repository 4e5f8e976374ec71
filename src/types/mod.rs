// Public modules
pub mod chat_completion;
pub mod message;
pub mod model;
pub mod usage;

// Re-exports
pub use chat_completion::{
    ChatCompletionRequest, ChatCompletionResponse, Choice, ChoiceMessage, MAX_TOKENS, TEMPERATURE,
    TOP_P,
};
pub use message::{Message, Role};
pub use model::Model;
pub use usage::Usage;
