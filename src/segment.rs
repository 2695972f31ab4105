//! Splitting reply text into renderable segments.
//!
//! Model replies may embed fenced code blocks (triple backticks with an
//! optional language tag). The renderer treats prose, language labels, and
//! code differently, and every code segment doubles as the payload for the
//! save-to-file affordance, so the split happens once, here, and both the
//! live-reply path and the transcript re-display path consume it.

use std::collections::VecDeque;
use std::sync::LazyLock;

use regex::Regex;

/// Matches one fenced code block: an opening fence with an optional
/// language tag, a non-greedy multi-line body, and a closing fence at the
/// start of a line.
static FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?P<lang>\w*)\s*\n(?P<code>.*?)\n```").expect("fence pattern compiles")
});

/// One renderable piece of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Prose outside any code fence.
    Text(&'a str),

    /// The language tag of the code block that follows. Only emitted when
    /// the opening fence carried a non-empty tag.
    LangLabel(&'a str),

    /// A code block body, leading and trailing whitespace trimmed. This is
    /// byte-for-byte the text the save affordance writes to disk.
    Code(&'a str),
}

/// Lazy iterator over the segments of a message.
///
/// The iterator borrows the input, so it can be recreated (and the message
/// re-rendered) as often as needed.
#[derive(Debug)]
pub struct Segments<'a> {
    text: &'a str,
    pos: usize,
    pending: VecDeque<Segment<'a>>,
}

/// Split `text` into segments.
///
/// Text before each fence becomes [`Segment::Text`], each fence yields an
/// optional [`Segment::LangLabel`] followed by a [`Segment::Code`], and
/// anything after the last fence is a final [`Segment::Text`]. Input with
/// no well-formed fence yields a single text segment; empty input yields
/// nothing.
pub fn segments(text: &str) -> Segments<'_> {
    Segments {
        text,
        pos: 0,
        pending: VecDeque::new(),
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Segment<'a>> {
        if let Some(segment) = self.pending.pop_front() {
            return Some(segment);
        }
        if self.pos >= self.text.len() {
            return None;
        }
        match FENCE.captures_at(self.text, self.pos) {
            Some(caps) => {
                let whole = caps.get(0).expect("group 0 is the whole match");
                if whole.start() > self.pos {
                    self.pending
                        .push_back(Segment::Text(&self.text[self.pos..whole.start()]));
                }
                let lang = caps.name("lang").map(|m| m.as_str()).unwrap_or("");
                if !lang.is_empty() {
                    self.pending.push_back(Segment::LangLabel(lang));
                }
                let code = caps.name("code").map(|m| m.as_str()).unwrap_or("");
                self.pending.push_back(Segment::Code(code.trim()));
                self.pos = whole.end();
                self.pending.pop_front()
            }
            None => {
                let rest = &self.text[self.pos..];
                self.pos = self.text.len();
                Some(Segment::Text(rest))
            }
        }
    }
}
