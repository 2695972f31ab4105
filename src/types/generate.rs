//! Request and response bodies for the `generateContent` endpoint.
//!
//! The response types model every field the extraction path touches as an
//! `Option`, so a missing link anywhere in
//! `candidates[0].content.parts[0].text` surfaces as a
//! [`MalformedResponse`](crate::Error::MalformedResponse) instead of a
//! panic.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::Content;

/// Request body for `generateContent`: the full conversation so far.
///
/// The endpoint keeps no server-side session state, so every call carries
/// the entire transcript up to and including the just-submitted user turn.
#[derive(Debug, Serialize)]
pub struct GenerateContentRequest<'a> {
    /// Alternating user/model messages, oldest first.
    pub contents: &'a [Content],
}

impl<'a> GenerateContentRequest<'a> {
    /// Create a request wrapping the given transcript.
    pub fn new(contents: &'a [Content]) -> Self {
        Self { contents }
    }
}

/// Response body for `generateContent`.
#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    /// Generated candidates; this client only ever reads the first.
    pub candidates: Option<Vec<Candidate>>,
}

/// One generated candidate.
#[derive(Debug, Deserialize)]
pub struct Candidate {
    /// The candidate's content.
    pub content: Option<CandidateContent>,
}

/// Content of a candidate.
#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    /// The candidate's parts.
    pub parts: Option<Vec<CandidatePart>>,
}

/// One part of a candidate's content.
#[derive(Debug, Deserialize)]
pub struct CandidatePart {
    /// The text of this part, when present.
    pub text: Option<String>,
}

/// A successful reply extracted from a response.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelReply {
    /// The reply text.
    pub text: String,
}

impl GenerateContentResponse {
    /// Extract the reply text at `candidates[0].content.parts[0].text`.
    pub fn into_reply(self) -> Result<ModelReply> {
        let candidate = self
            .candidates
            .and_then(|mut candidates| {
                if candidates.is_empty() {
                    None
                } else {
                    Some(candidates.remove(0))
                }
            })
            .ok_or_else(|| Error::malformed_response("response has no candidates"))?;
        let content = candidate
            .content
            .ok_or_else(|| Error::malformed_response("candidate has no content"))?;
        let part = content
            .parts
            .and_then(|mut parts| {
                if parts.is_empty() {
                    None
                } else {
                    Some(parts.remove(0))
                }
            })
            .ok_or_else(|| Error::malformed_response("candidate content has no parts"))?;
        let text = part
            .text
            .ok_or_else(|| Error::malformed_response("candidate part has no text"))?;
        Ok(ModelReply { text })
    }
}
