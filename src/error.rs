//! Error types for the Castor SDK.
//!
//! This module defines the error type system for everything that can go
//! wrong when talking to the Gemini API or operating on chat sessions.

use std::error;
use std::fmt;
use std::io;
use std::sync::Arc;

/// The main error type for the Castor SDK.
#[derive(Clone, Debug)]
pub enum Error {
    /// Missing or unusable API credential.
    ///
    /// Raised at client construction time; the chat binary treats this as
    /// fatal before any prompt is shown.
    Authentication {
        /// Human-readable error message.
        message: String,
    },

    /// Transport failure, timeout, or non-2xx HTTP status.
    Network {
        /// Human-readable error message.
        message: String,
        /// HTTP status code, when the server answered at all.
        status_code: Option<u16>,
    },

    /// The response body did not have the expected shape.
    MalformedResponse {
        /// Human-readable error message naming the missing field path.
        message: String,
    },

    /// A conversation index outside the session store's range.
    OutOfRange {
        /// The index that was requested.
        index: usize,
        /// The number of conversations in the store.
        len: usize,
    },

    /// I/O error, e.g. while saving a code block to disk.
    Io {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Arc<io::Error>,
    },

    /// HTTP client construction or internal failure.
    HttpClient {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },
}

impl Error {
    /// Creates a new authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Error::Authentication {
            message: message.into(),
        }
    }

    /// Creates a new network error without a status code.
    pub fn network(message: impl Into<String>) -> Self {
        Error::Network {
            message: message.into(),
            status_code: None,
        }
    }

    /// Creates a new network error carrying the HTTP status code.
    pub fn network_with_status(message: impl Into<String>, status_code: u16) -> Self {
        Error::Network {
            message: message.into(),
            status_code: Some(status_code),
        }
    }

    /// Creates a new malformed-response error.
    pub fn malformed_response(message: impl Into<String>) -> Self {
        Error::MalformedResponse {
            message: message.into(),
        }
    }

    /// Creates a new out-of-range error.
    pub fn out_of_range(index: usize, len: usize) -> Self {
        Error::OutOfRange { index, len }
    }

    /// Creates a new I/O error.
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Error::Io {
            message: message.into(),
            source: Arc::new(source),
        }
    }

    /// Creates a new HTTP client error.
    pub fn http_client(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::HttpClient {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Returns true if this error is related to authentication.
    pub fn is_authentication(&self) -> bool {
        matches!(self, Error::Authentication { .. })
    }

    /// Returns true if this error is a network-layer failure.
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Network { .. })
    }

    /// Returns true if this error is a malformed response.
    pub fn is_malformed_response(&self) -> bool {
        matches!(self, Error::MalformedResponse { .. })
    }

    /// Returns true if this error came from the gateway and should roll
    /// back the just-submitted user turn.
    pub fn rolls_back_turn(&self) -> bool {
        self.is_network() || self.is_malformed_response()
    }

    /// Returns the status code associated with this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Network { status_code, .. } => *status_code,
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Authentication { message } => {
                write!(f, "Authentication error: {message}")
            }
            Error::Network {
                message,
                status_code,
            } => {
                if let Some(status_code) = status_code {
                    write!(f, "Network error (HTTP {status_code}): {message}")
                } else {
                    write!(f, "Network error: {message}")
                }
            }
            Error::MalformedResponse { message } => {
                write!(f, "Malformed response: {message}")
            }
            Error::OutOfRange { index, len } => {
                write!(f, "Conversation index {index} out of range (have {len})")
            }
            Error::Io { message, .. } => {
                write!(f, "I/O error: {message}")
            }
            Error::HttpClient { message, .. } => {
                write!(f, "HTTP client error: {message}")
            }
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Io { source, .. } => Some(source),
            Error::HttpClient { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::io(err.to_string(), err)
    }
}

/// A specialized Result type for Castor operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_status_preserved() {
        let err = Error::network_with_status("quota exceeded", 429);
        assert!(err.is_network());
        assert_eq!(err.status_code(), Some(429));
        assert_eq!(err.to_string(), "Network error (HTTP 429): quota exceeded");
    }

    #[test]
    fn transport_errors_have_no_status() {
        let err = Error::network("connection refused");
        assert!(err.is_network());
        assert_eq!(err.status_code(), None);
    }

    #[test]
    fn gateway_errors_roll_back() {
        assert!(Error::network("timed out").rolls_back_turn());
        assert!(Error::malformed_response("no candidates").rolls_back_turn());
        assert!(!Error::authentication("no key").rolls_back_turn());
        assert!(!Error::out_of_range(3, 1).rolls_back_turn());
    }

    #[test]
    fn out_of_range_display() {
        let err = Error::out_of_range(5, 2);
        assert_eq!(err.to_string(), "Conversation index 5 out of range (have 2)");
    }
}
