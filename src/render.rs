//! Output rendering for the chat application.
//!
//! This module provides a trait-based rendering abstraction so the chat
//! loop can print through ANSI styling, plain text, or a test recorder.
//! Model text always goes through [`render_model_text`], which walks the
//! segmenter once for live replies and re-displayed transcripts alike.

use std::io::{self, Stdout, Write};

use crate::segment::{Segment, segments};
use crate::types::Role;

/// ANSI escape code for blue text (user prefix).
const ANSI_BLUE: &str = "\x1b[34m";

/// ANSI escape code for green text (model prefix).
const ANSI_GREEN: &str = "\x1b[32m";

/// ANSI escape code for red text (errors).
const ANSI_RED: &str = "\x1b[31m";

/// ANSI escape code for dim text (language labels, save hints).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code for bold text.
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// Trait for rendering chat output.
pub trait Renderer: Send {
    /// Print the role prefix that opens a message.
    fn begin_message(&mut self, role: Role);

    /// Print a run of prose.
    fn print_text(&mut self, text: &str);

    /// Print the language label of the code block that follows.
    fn print_lang_label(&mut self, lang: &str);

    /// Print a code block together with its save affordance.
    ///
    /// `index` is the 1-based handle the user passes to `/save`.
    fn print_code(&mut self, index: usize, code: &str);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);

    /// Called when a message is complete.
    fn finish_message(&mut self);
}

/// Render one model message through the segmenter.
///
/// Each code block is appended to `code_blocks` and announced with its
/// 1-based save index; the block text recorded there is exactly what
/// `/save` writes to disk.
pub fn render_model_text(
    renderer: &mut dyn Renderer,
    text: &str,
    code_blocks: &mut Vec<String>,
) {
    for segment in segments(text) {
        match segment {
            Segment::Text(text) => renderer.print_text(text),
            Segment::LangLabel(lang) => renderer.print_lang_label(lang),
            Segment::Code(code) => {
                code_blocks.push(code.to_string());
                renderer.print_code(code_blocks.len(), code);
            }
        }
    }
}

/// Plain text renderer with optional ANSI styling.
pub struct PlainTextRenderer {
    stdout: Stdout,
    use_color: bool,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            use_color: true,
        }
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self {
            stdout: io::stdout(),
            use_color,
        }
    }

    /// Flushes stdout to ensure immediate display.
    fn flush(&mut self) {
        let _ = self.stdout.flush();
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for PlainTextRenderer {
    fn begin_message(&mut self, role: Role) {
        let (color, prefix) = match role {
            Role::User => (ANSI_BLUE, "You: "),
            Role::Model => (ANSI_GREEN, "Gemini: "),
        };
        if self.use_color {
            print!("{ANSI_BOLD}{color}{prefix}{ANSI_RESET}");
        } else {
            print!("{prefix}");
        }
        self.flush();
    }

    fn print_text(&mut self, text: &str) {
        print!("{text}");
        self.flush();
    }

    fn print_lang_label(&mut self, lang: &str) {
        if self.use_color {
            print!("\n{ANSI_DIM}Language: {lang}{ANSI_RESET}\n");
        } else {
            print!("\nLanguage: {lang}\n");
        }
        self.flush();
    }

    fn print_code(&mut self, index: usize, code: &str) {
        println!("{code}");
        if self.use_color {
            print!("{ANSI_DIM}[code block #{index}: /save {index} <file> writes it to disk]{ANSI_RESET}");
        } else {
            print!("[code block #{index}: /save {index} <file> writes it to disk]");
        }
        self.flush();
    }

    fn print_error(&mut self, error: &str) {
        if self.use_color {
            eprintln!("\n{ANSI_RED}Error: {error}{ANSI_RESET}");
        } else {
            eprintln!("\nError: {error}");
        }
    }

    fn print_info(&mut self, info: &str) {
        println!("{info}");
        self.flush();
    }

    fn finish_message(&mut self) {
        println!();
        self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renderer_default_has_color() {
        let renderer = PlainTextRenderer::new();
        assert!(renderer.use_color);
    }

    #[test]
    fn renderer_without_color() {
        let renderer = PlainTextRenderer::with_color(false);
        assert!(!renderer.use_color);
    }

    /// Records every call so tests can assert on the rendered sequence.
    #[derive(Default)]
    struct RecordingRenderer {
        events: Vec<String>,
    }

    impl Renderer for RecordingRenderer {
        fn begin_message(&mut self, role: Role) {
            self.events.push(format!("begin:{role:?}"));
        }

        fn print_text(&mut self, text: &str) {
            self.events.push(format!("text:{text}"));
        }

        fn print_lang_label(&mut self, lang: &str) {
            self.events.push(format!("lang:{lang}"));
        }

        fn print_code(&mut self, index: usize, code: &str) {
            self.events.push(format!("code:{index}:{code}"));
        }

        fn print_error(&mut self, error: &str) {
            self.events.push(format!("error:{error}"));
        }

        fn print_info(&mut self, info: &str) {
            self.events.push(format!("info:{info}"));
        }

        fn finish_message(&mut self) {
            self.events.push("finish".to_string());
        }
    }

    #[test]
    fn model_text_renders_in_segment_order() {
        let mut renderer = RecordingRenderer::default();
        let mut code_blocks = Vec::new();
        render_model_text(
            &mut renderer,
            "Use ```python\nprint(1)\n``` now",
            &mut code_blocks,
        );
        assert_eq!(
            renderer.events,
            vec!["text:Use ", "lang:python", "code:1:print(1)", "text: now"]
        );
        assert_eq!(code_blocks, vec!["print(1)"]);
    }

    #[test]
    fn code_block_indices_accumulate_across_messages() {
        let mut renderer = RecordingRenderer::default();
        let mut code_blocks = Vec::new();
        render_model_text(&mut renderer, "```\na\n```", &mut code_blocks);
        render_model_text(&mut renderer, "```\nb\n```", &mut code_blocks);
        assert_eq!(code_blocks, vec!["a", "b"]);
        assert_eq!(renderer.events, vec!["code:1:a", "code:2:b"]);
    }
}
