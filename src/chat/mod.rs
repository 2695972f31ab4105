//! Chat application module for interactive conversations with Gemini.
//!
//! This module provides a REPL chat interface built on top of the castor
//! client library. It supports:
//!
//! - Multiple in-memory conversations with derived titles
//! - One in-flight request at a time, dispatched off the main loop
//! - Fenced-code-block rendering with save-to-file affordances
//! - Slash commands for conversation control
//!
//! # Architecture
//!
//! The module is organized into several components:
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`session`]: conversation records and the session store
//! - [`turn`]: gateway dispatch and the result channel
//! - [`commands`]: slash command parsing and handling

mod commands;
mod config;
mod session;
mod turn;

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::observability;

pub use crate::render::{PlainTextRenderer, Renderer, render_model_text};
pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ChatArgs, ChatConfig};
pub use session::{Conversation, SessionStore};
pub use turn::dispatch_turn;

/// Write a code block's exact text to `path`.
///
/// A path without an extension gets a `.txt` extension appended. Returns
/// the path actually written. Failures leave conversation state untouched;
/// the caller reports them and carries on.
pub fn save_code_block(code: &str, path: &Path) -> Result<PathBuf> {
    let path = if path.extension().is_none() {
        path.with_extension("txt")
    } else {
        path.to_path_buf()
    };
    std::fs::write(&path, code)
        .map_err(|err| Error::io(format!("failed to write {}", path.display()), err))?;
    observability::CODE_BLOCKS_SAVED.click();
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_writes_exact_payload() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("snippet.py");
        let code = "def main():\n    print(1)";
        let written = save_code_block(code, &target).unwrap();
        assert_eq!(written, target);
        assert_eq!(std::fs::read_to_string(&written).unwrap(), code);
    }

    #[test]
    fn save_defaults_extension_to_txt() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("snippet");
        let written = save_code_block("ls -la", &target).unwrap();
        assert_eq!(written, dir.path().join("snippet.txt"));
        assert_eq!(std::fs::read_to_string(&written).unwrap(), "ls -la");
    }

    #[test]
    fn save_failure_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("missing").join("snippet.txt");
        let err = save_code_block("x", &target).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
