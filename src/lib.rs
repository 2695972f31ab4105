// Public modules
pub mod chat;
pub mod client;
pub mod error;
pub mod observability;
pub mod render;
pub mod segment;
pub mod types;

// Re-exports
pub use client::{Gateway, Gemini};
pub use error::{Error, Result};
pub use render::{PlainTextRenderer, Renderer, render_model_text};
pub use segment::{Segment, Segments, segments};
pub use types::*;
