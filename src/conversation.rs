//! The in-memory transcript of one chat session.

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::Message;

/// File name used when exporting without an explicit path.
pub const DEFAULT_EXPORT_FILE: &str = "chat_history.txt";

/// An append-only, ordered list of messages.
///
/// There is no size cap and no validation; the only way to remove messages
/// is [`Conversation::clear`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Creates an empty conversation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `message` after every existing message.
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Removes every message.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Every message, oldest first.
    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True when there are no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Renders the transcript as one `Role: content` line per message.
    ///
    /// There is no trailing newline; an empty conversation renders as "".
    pub fn export(&self) -> String {
        self.messages
            .iter()
            .map(Message::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Writes [`Conversation::export`] to `path`.
    pub fn export_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if self.is_empty() {
            return Err(Error::validation("chat history is empty", None));
        }
        let path = path.as_ref();
        fs::write(path, self.export()).map_err(|err| {
            Error::io(
                format!("failed to write transcript to {}", path.display()),
                err,
            )
        })
    }
}

impl Extend<Message> for Conversation {
    fn extend<T: IntoIterator<Item = Message>>(&mut self, iter: T) {
        self.messages.extend(iter);
    }
}

impl FromIterator<Message> for Conversation {
    fn from_iter<T: IntoIterator<Item = Message>>(iter: T) -> Self {
        Self {
            messages: iter.into_iter().collect(),
        }
    }
}
