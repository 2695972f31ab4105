//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for controlling chat behavior.

use arrrg_derive::CommandLine;

/// Default model for new sessions.
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Command-line arguments for the castor-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Model to use for chat.
    #[arrrg(optional, "Model to use (default: gemini-2.5-flash)", "MODEL")]
    pub model: Option<String>,

    /// Override the API endpoint base URL.
    #[arrrg(optional, "API endpoint base URL", "URL")]
    pub endpoint: Option<String>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Configuration for a chat session.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// The model to use for generating responses.
    pub model: String,

    /// Optional API endpoint base URL override.
    pub endpoint: Option<String>,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    pub fn new() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            endpoint: None,
            use_color: true,
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the endpoint base URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ChatConfig {
    fn from(args: ChatArgs) -> Self {
        ChatConfig {
            model: args.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            endpoint: args.endpoint,
            use_color: !args.no_color,
        }
    }
}
