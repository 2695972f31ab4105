//! Slash command parsing for the chat application.
//!
//! This module handles parsing of special commands that start with `/`,
//! letting users manage conversations and save code blocks without sending
//! messages to the API.

/// A parsed chat command.
///
/// These commands control the chat session and are not sent to the API.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    /// Start a new conversation and make it current.
    New,

    /// List every conversation with the current one marked.
    Chats,

    /// Switch to the conversation with the given 1-based number.
    Switch(usize),

    /// Save a code block from the current conversation to a file.
    SaveCode {
        /// 1-based code block number, as announced by the renderer.
        index: usize,
        /// Destination path.
        path: String,
    },

    /// Change the model.
    Model(String),

    /// Display session statistics (conversation count, message count, etc.).
    Stats,

    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a command,
/// or `None` if it should be treated as a regular message.
///
/// # Examples
///
/// ```
/// # use castor::chat::parse_command;
/// assert!(parse_command("/quit").is_some());
/// assert!(parse_command("/switch 2").is_some());
/// assert!(parse_command("Hello, Gemini!").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    if !input.starts_with('/') {
        return None;
    }

    let mut parts = input[1..].splitn(2, ' ');
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "new" => ChatCommand::New,
        "chats" | "list" => ChatCommand::Chats,
        "switch" => match argument.map(parse_chat_number) {
            Some(Ok(number)) => ChatCommand::Switch(number),
            Some(Err(err)) => ChatCommand::Invalid(format!("/switch {err}")),
            None => ChatCommand::Invalid("/switch requires a chat number".to_string()),
        },
        "save" => parse_save_command(argument),
        "model" => match argument {
            Some(model) => ChatCommand::Model(model.to_string()),
            None => ChatCommand::Invalid("/model requires a model name".to_string()),
        },
        "stats" | "status" => ChatCommand::Stats,
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        _ => ChatCommand::Invalid(format!("Unknown command: /{}", command)),
    };

    Some(result)
}

fn parse_save_command(argument: Option<&str>) -> ChatCommand {
    let Some(arg) = argument else {
        return ChatCommand::Invalid("/save requires a code block number and a file path".to_string());
    };

    let mut parts = arg.splitn(2, ' ');
    let number = parts.next().unwrap_or("");
    let path = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    match (parse_chat_number(number), path) {
        (Ok(index), Some(path)) => ChatCommand::SaveCode {
            index,
            path: path.to_string(),
        },
        (Err(err), _) => ChatCommand::Invalid(format!("/save {err}")),
        (Ok(_), None) => ChatCommand::Invalid("/save requires a file path".to_string()),
    }
}

fn parse_chat_number(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(number) if number >= 1 => Ok(number),
        _ => Err("expects a number counting from 1".to_string()),
    }
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /new                   Start a new conversation
  /chats                 List conversations (current one marked)
  /switch <n>            Switch to conversation n
  /save <n> <file>       Save code block n to a file
  /model <name>          Change the model (e.g., /model gemini-2.5-pro)
  /stats                 Show session statistics
  /help                  Show this help message
  /quit                  Exit the chat"#
}
