//! Pseudo-streaming display of a finished reply.
//!
//! The reply has already arrived in full. It is replayed word by word so the
//! terminal looks like it is receiving tokens. Each intermediate frame is a
//! longer prefix of the text followed by [`CURSOR`]; the last frame is the
//! whole text without it.

use std::time::Duration;

/// Glyph appended to every frame except the last.
pub const CURSOR: char = '▌';

/// Pause before each word is revealed.
pub const FRAME_DELAY: Duration = Duration::from_millis(50);

/// One display step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    /// The prefix of the reply shown in this frame.
    pub text: &'a str,
    /// Whether the cursor glyph follows the text.
    pub cursor: bool,
}

impl Frame<'_> {
    /// The frame as it should appear on screen.
    pub fn rendered(&self) -> String {
        if self.cursor {
            format!("{}{CURSOR}", self.text)
        } else {
            self.text.to_string()
        }
    }
}

/// Receives frames from [`typewrite`].
pub trait FrameSink {
    /// Replace whatever was shown previously with `frame`.
    fn show_frame(&mut self, frame: Frame<'_>);

    /// Returning true skips the remaining delays and jumps to the final frame.
    fn should_stop(&self) -> bool {
        false
    }
}

/// Byte offsets at which each whitespace-delimited fragment of `text` ends.
pub fn fragment_ends(text: &str) -> Vec<usize> {
    let mut ends = Vec::new();
    let mut in_word = false;
    for (idx, ch) in text.char_indices() {
        if ch.is_whitespace() {
            if in_word {
                ends.push(idx);
            }
            in_word = false;
        } else {
            in_word = true;
        }
    }
    if in_word {
        ends.push(text.len());
    }
    ends
}

/// All frames for `text`, in display order.
pub fn frames(text: &str) -> Vec<Frame<'_>> {
    let mut frames: Vec<Frame<'_>> = fragment_ends(text)
        .into_iter()
        .map(|end| Frame {
            text: &text[..end],
            cursor: true,
        })
        .collect();
    frames.push(Frame {
        text,
        cursor: false,
    });
    frames
}

/// Replays `text` into `sink`, sleeping `delay` before each fragment.
///
/// A zero delay shows every frame without yielding.
///
/// ```
/// # use std::time::Duration;
/// # use hfchat::{Frame, FrameSink, typewrite};
/// struct Collect(Vec<String>);
///
/// impl FrameSink for Collect {
///     fn show_frame(&mut self, frame: Frame<'_>) {
///         self.0.push(frame.rendered());
///     }
/// }
///
/// # tokio_test::block_on(async {
/// let mut sink = Collect(Vec::new());
/// typewrite("good morning", Duration::ZERO, &mut sink).await;
/// assert_eq!(sink.0, vec!["good▌", "good morning▌", "good morning"]);
/// # });
/// ```
pub async fn typewrite<S: FrameSink + ?Sized>(text: &str, delay: Duration, sink: &mut S) {
    for frame in frames(text) {
        if frame.cursor {
            if sink.should_stop() {
                continue;
            }
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
        sink.show_frame(frame);
    }
}
