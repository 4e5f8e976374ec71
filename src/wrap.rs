//! Paragraph filling for terminal display.

use std::collections::VecDeque;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Column width replies are wrapped to before display.
pub const DISPLAY_WIDTH: usize = 80;

/// Reflows `text` into lines of at most `width` columns.
///
/// Every whitespace character becomes a single space; runs of spaces inside a
/// line are kept, while whitespace at a line break is dropped. A word wider
/// than `width` fills whatever room is left on the current line and continues
/// on the next ones.
pub fn fill(text: &str, width: usize) -> String {
    let width = width.max(1);
    let normalized: String = text
        .chars()
        .map(|ch| if ch.is_whitespace() { ' ' } else { ch })
        .collect();
    let mut chunks: VecDeque<&str> = split_chunks(&normalized).into();
    let mut lines: Vec<String> = Vec::new();

    while !chunks.is_empty() {
        let mut line = String::new();
        let mut line_width = 0usize;

        if !lines.is_empty() && chunks.front().is_some_and(|chunk| chunk.starts_with(' ')) {
            chunks.pop_front();
        }
        while let Some(chunk) = chunks.front() {
            let chunk_width = chunk.width();
            if line_width + chunk_width > width {
                break;
            }
            line.push_str(chunk);
            line_width += chunk_width;
            chunks.pop_front();
        }
        if let Some(chunk) = chunks.pop_front() {
            if chunk.width() > width {
                let room = width.saturating_sub(line_width).max(1);
                let (head, tail) = split_at_width(chunk, room, line.is_empty());
                line.push_str(head);
                if !tail.is_empty() {
                    chunks.push_front(tail);
                }
            } else {
                chunks.push_front(chunk);
            }
        }

        let line = line.trim_end_matches(' ');
        if !line.is_empty() {
            lines.push(line.to_string());
        }
    }
    lines.join("\n")
}

/// Splits `text` into alternating runs of spaces and non-spaces.
fn split_chunks(text: &str) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut in_space = None;
    for (idx, ch) in text.char_indices() {
        let is_space = ch == ' ';
        if in_space.is_some_and(|prev| prev != is_space) {
            chunks.push(&text[start..idx]);
            start = idx;
        }
        in_space = Some(is_space);
    }
    if start < text.len() {
        chunks.push(&text[start..]);
    }
    chunks
}

/// The longest prefix of `word` fitting in `columns`, and the rest.
///
/// With `force` at least one character is taken even if it is too wide.
fn split_at_width(word: &str, columns: usize, force: bool) -> (&str, &str) {
    let mut used = 0usize;
    let mut end = 0usize;
    for (idx, ch) in word.char_indices() {
        let ch_width = ch.width().unwrap_or(0);
        if used + ch_width > columns {
            break;
        }
        used += ch_width;
        end = idx + ch.len_utf8();
    }
    if end == 0 && force {
        end = word.chars().next().map_or(0, char::len_utf8);
    }
    word.split_at(end)
}
