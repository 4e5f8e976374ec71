//! Chat application module for interactive conversations.
//!
//! This module provides a REPL chat interface built on top of the hfchat
//! inference client. It supports:
//!
//! - Word-by-word replay of each reply
//! - Slash commands for session control
//! - A fixed allow-list of models that can be switched at any time
//! - Transcript export
//!
//! # Architecture
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`session`]: Conversation state and inference calls
//! - [`commands`]: Slash command parsing and handling

mod commands;
mod config;
mod session;

pub use crate::render::{PlainTextRenderer, Renderer};
pub use commands::{ChatCommand, help_text, models_text, parse_command};
pub use config::{ChatArgs, ChatArgsError, ChatConfig};
pub use session::{
    ChatSession, FAILURE_REPLY, NOT_CONFIGURED_NOTICE, NOT_CONFIGURED_REPLY, SessionStats,
    TurnOutcome,
};
