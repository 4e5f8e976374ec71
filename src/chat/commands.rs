//! Slash command parsing for the chat application.
//!
//! This module handles parsing of special commands that start with `/`,
//! allowing users to control the chat session without sending messages
//! to the model.

use crate::types::Model;

/// A parsed chat command.
///
/// These commands control the chat session and are never recorded in the
/// conversation.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    /// Clear the conversation history.
    Clear,

    /// Switch to another model from the allow-list.
    Model(Model),

    /// List the allow-listed models.
    ListModels,

    /// Export the transcript, optionally to a specific path.
    Export(Option<String>),

    /// Reprint every turn of the conversation.
    History,

    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Display session statistics (message count, current model, etc.).
    Stats,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a command,
/// or `None` if it should be treated as a regular message.
///
/// Only a slash followed by a bare word (letters, or `?`) is a command, so
/// text such as `/r/rust` or `/usr/bin` is sent as a message.
///
/// # Examples
///
/// ```
/// # use hfchat::chat::parse_command;
/// assert!(parse_command("/quit").is_some());
/// assert!(parse_command("/model 2").is_some());
/// assert!(parse_command("Hello there!").is_none());
/// assert!(parse_command("/r/rust is a good subreddit?").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    let rest = input.strip_prefix('/')?;
    let mut parts = rest.splitn(2, char::is_whitespace);
    let command = parts.next()?.to_lowercase();
    if !is_command_word(&command) {
        return None;
    }
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "clear" => ChatCommand::Clear,
        "model" => match argument {
            Some(arg) => parse_model(arg),
            None => ChatCommand::Invalid("/model requires a model name or number".to_string()),
        },
        "models" => ChatCommand::ListModels,
        "export" | "save" => ChatCommand::Export(argument.map(|s| s.to_string())),
        "history" => ChatCommand::History,
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        "stats" | "status" => ChatCommand::Stats,
        _ => ChatCommand::Invalid(format!("Unknown command: /{}", command)),
    };

    Some(result)
}

fn is_command_word(word: &str) -> bool {
    word == "?" || (!word.is_empty() && word.chars().all(|c| c.is_ascii_alphabetic()))
}

fn parse_model(argument: &str) -> ChatCommand {
    if let Ok(index) = argument.parse::<usize>() {
        return match Model::from_index(index) {
            Some(model) => ChatCommand::Model(model),
            None => ChatCommand::Invalid(format!(
                "/model expects a number between 1 and {}",
                Model::ALL.len()
            )),
        };
    }
    match argument.parse::<Model>() {
        Ok(model) => ChatCommand::Model(model),
        Err(_) => ChatCommand::Invalid(format!(
            "{argument} is not an available model (see /models)"
        )),
    }
}

/// Returns the allow-list formatted for display, marking `current`.
pub fn models_text(current: Model) -> String {
    Model::ALL
        .iter()
        .enumerate()
        .map(|(idx, model)| {
            let marker = if *model == current { "*" } else { " " };
            format!("{marker} {}. {}", idx + 1, model)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /clear                 Clear conversation history
  /models                List the available models
  /model <name|number>   Switch model (history is kept)
  /history               Show the conversation so far
  /export [path]         Save the transcript (default: chat_history.txt)
  /stats                 Show session statistics
  /help                  Show this help message
  /quit                  Exit the chat

Keyboard shortcuts:
  Ctrl+C                 Skip the reply animation (or cancel input)
  Ctrl+D                 Exit"#
}
