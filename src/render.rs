//! Output rendering for the chat front-end.
//!
//! This module provides the renderer trait the chat session talks to and a
//! plain-text implementation for terminals.

use std::io::{self, IsTerminal, Stdout, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::types::{Message, Role};
use crate::typewriter::{CURSOR, Frame, FrameSink};

/// ANSI escape code for dim text (used for notices).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for role labels).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for green text (used for success notices).
const ANSI_GREEN: &str = "\x1b[32m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// Erases the cursor glyph: back up one column, blank it, back up again.
const ERASE_CURSOR: &str = "\x08 \x08";

/// Trait for rendering chat output.
///
/// Replies reach the renderer through [`FrameSink`], one growing prefix at a
/// time. Everything else is a one-shot notice.
pub trait Renderer: FrameSink + Send {
    /// Print a stored turn, for history replay.
    fn print_message(&mut self, message: &Message);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);

    /// Print a success notice. Defaults to [`Renderer::print_info`].
    fn print_success(&mut self, info: &str) {
        self.print_info(info);
    }

    /// Called before the frames of an assistant reply.
    fn start_response(&mut self) {}

    /// Called after the final frame of an assistant reply.
    fn finish_response(&mut self);
}

/// Plain text renderer with optional ANSI styling.
///
/// Frames are drawn incrementally: only the newly revealed part of the reply
/// is written, and the cursor glyph is erased with backspaces before the next
/// frame. The cursor is drawn when stdout is a terminal, so piped output
/// stays free of glyphs and backspaces.
pub struct PlainTextRenderer {
    stdout: Stdout,
    use_color: bool,
    draw_cursor: bool,
    shown: usize,
    cursor_visible: bool,
    interrupted: Option<Arc<AtomicBool>>,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        let stdout = io::stdout();
        let draw_cursor = stdout.is_terminal();
        Self {
            stdout,
            use_color,
            draw_cursor,
            shown: 0,
            cursor_visible: false,
            interrupted: None,
        }
    }

    /// Attaches an interrupt flag; when set, reply animation is cut short.
    pub fn with_interrupt(mut self, interrupted: Arc<AtomicBool>) -> Self {
        self.interrupted = Some(interrupted);
        self
    }

    /// Overrides whether the cursor glyph is drawn between frames.
    pub fn with_cursor(mut self, draw_cursor: bool) -> Self {
        self.draw_cursor = draw_cursor;
        self
    }

    /// Whether ANSI styling is enabled.
    pub fn use_color(&self) -> bool {
        self.use_color
    }

    /// Flushes stdout to ensure immediate display of streamed content.
    fn flush(&mut self) {
        let _ = self.stdout.flush();
    }

    fn label(&self, role: Role) -> String {
        if self.use_color {
            format!("{ANSI_CYAN}{}:{ANSI_RESET}", role.label())
        } else {
            format!("{}:", role.label())
        }
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSink for PlainTextRenderer {
    fn show_frame(&mut self, frame: Frame<'_>) {
        if self.cursor_visible {
            print!("{ERASE_CURSOR}");
            self.cursor_visible = false;
        }
        let fresh = frame.text.get(self.shown..).unwrap_or_default();
        print!("{fresh}");
        self.shown = frame.text.len();
        if frame.cursor && self.draw_cursor {
            print!("{CURSOR}");
            self.cursor_visible = true;
        }
        if !frame.cursor {
            self.shown = 0;
        }
        self.flush();
    }

    fn should_stop(&self) -> bool {
        self.interrupted
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

impl Renderer for PlainTextRenderer {
    fn print_message(&mut self, message: &Message) {
        println!("{}", self.label(message.role()));
        println!("{}", message.content());
        println!();
    }

    fn print_error(&mut self, error: &str) {
        if self.use_color {
            eprintln!("{ANSI_RED}Error: {error}{ANSI_RESET}");
        } else {
            eprintln!("Error: {error}");
        }
    }

    fn print_info(&mut self, info: &str) {
        if self.use_color {
            println!("{ANSI_DIM}{info}{ANSI_RESET}");
        } else {
            println!("{info}");
        }
        self.flush();
    }

    fn print_success(&mut self, info: &str) {
        if self.use_color {
            println!("{ANSI_GREEN}{info}{ANSI_RESET}");
        } else {
            println!("{info}");
        }
        self.flush();
    }

    fn start_response(&mut self) {
        self.shown = 0;
        self.cursor_visible = false;
        println!("{}", self.label(Role::Assistant));
    }

    fn finish_response(&mut self) {
        if self.cursor_visible {
            print!("{ERASE_CURSOR}");
            self.cursor_visible = false;
        }
        self.shown = 0;
        println!();
        self.flush();
    }
}
