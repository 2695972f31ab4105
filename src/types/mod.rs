// Public modules
pub mod content;
pub mod generate;

// Re-exports
pub use content::{Content, Part, Role};
pub use generate::{GenerateContentRequest, GenerateContentResponse, ModelReply};
