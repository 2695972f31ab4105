use std::env;
use std::time::Duration;

use reqwest::{Client as ReqwestClient, Response};
use serde::Deserialize;
use url::Url;

use crate::error::{Error, Result};
use crate::observability;
use crate::types::{Content, GenerateContentRequest, ModelReply};

const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(75);

/// The seam between the chat front end and the text-generation service.
///
/// The REPL dispatches turns through this trait so that tests can substitute
/// a scripted back end for the live API.
#[async_trait::async_trait]
pub trait Gateway: Send + Sync {
    /// Send one turn against the service.
    ///
    /// `transcript` is the full ordered message sequence up to and including
    /// the just-submitted user message; the endpoint keeps no server-side
    /// session state. The gateway never mutates caller state: the caller
    /// appends the reply or rolls back the user turn based on the result.
    async fn send_turn(&self, transcript: &[Content]) -> Result<ModelReply>;
}

/// Client for the Gemini API.
#[derive(Debug, Clone)]
pub struct Gemini {
    api_key: String,
    client: ReqwestClient,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl Gemini {
    /// Create a new Gemini client.
    ///
    /// The API key can be provided directly or read from the GEMINI_API_KEY
    /// environment variable. A missing key is an authentication error; the
    /// chat binary treats it as fatal at startup.
    pub fn new(api_key: Option<String>) -> Result<Self> {
        Self::with_options(api_key, None, None, None)
    }

    /// Create a new client with custom settings.
    pub fn with_options(
        api_key: Option<String>,
        base_url: Option<String>,
        model: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let api_key = match api_key {
            Some(key) => key,
            None => env::var("GEMINI_API_KEY").map_err(|_| {
                Error::authentication(
                    "API key not provided and GEMINI_API_KEY environment variable not set",
                )
            })?,
        };

        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {}", e),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            api_key,
            client,
            base_url: base_url.unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            timeout,
        })
    }

    /// Returns the model this client requests.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Changes the model for subsequent requests.
    pub fn set_model(&mut self, model: impl Into<String>) {
        self.model = model.into();
    }

    /// Build the request URL with the credential as a query parameter.
    fn request_url(&self) -> Result<Url> {
        let mut url = Url::parse(&format!(
            "{}/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        ))
        .map_err(|e| {
            Error::http_client(format!("Invalid endpoint URL: {}", e), Some(Box::new(e)))
        })?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    /// Process a non-2xx response into our Error type.
    ///
    /// The status code is preserved on the error; the message is taken from
    /// the Gemini error body when it parses, otherwise the raw body.
    async fn process_error_response(response: Response) -> Error {
        let status_code = response.status().as_u16();

        #[derive(Deserialize)]
        struct ErrorResponse {
            error: Option<ErrorDetail>,
        }

        #[derive(Deserialize)]
        struct ErrorDetail {
            message: Option<String>,
            status: Option<String>,
        }

        let error_body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Error::network_with_status(
                    format!("Failed to read error response: {}", e),
                    status_code,
                );
            }
        };

        let parsed_error = serde_json::from_str::<ErrorResponse>(&error_body).ok();
        let detail = parsed_error.and_then(|e| e.error);
        let message = match detail {
            Some(ErrorDetail {
                message: Some(message),
                status: Some(status),
            }) if !status.is_empty() => format!("{status}: {message}"),
            Some(ErrorDetail {
                message: Some(message),
                ..
            }) => message,
            _ => error_body,
        };

        Error::network_with_status(message, status_code)
    }

    /// Send the full transcript to the API and return the extracted reply.
    pub async fn generate(&self, transcript: &[Content]) -> Result<ModelReply> {
        observability::GATEWAY_REQUESTS.click();
        let start = std::time::Instant::now();
        let result = self.generate_inner(transcript).await;
        observability::GATEWAY_REQUEST_DURATION.add(start.elapsed().as_secs_f64());
        if result.is_err() {
            observability::GATEWAY_REQUEST_ERRORS.click();
        }
        result
    }

    async fn generate_inner(&self, transcript: &[Content]) -> Result<ModelReply> {
        let url = self.request_url()?;
        let request = GenerateContentRequest::new(transcript);

        let response = self
            .client
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::network(format!(
                        "Request timed out after {} seconds: {}",
                        self.timeout.as_secs(),
                        e
                    ))
                } else if e.is_connect() {
                    Error::network(format!("Connection error: {}", e))
                } else {
                    Error::network(format!("Request failed: {}", e))
                }
            })?;

        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }

        let body = response
            .json::<crate::types::GenerateContentResponse>()
            .await
            .map_err(|e| Error::malformed_response(format!("Failed to parse response: {}", e)))?;
        body.into_reply()
    }
}

#[async_trait::async_trait]
impl Gateway for Gemini {
    async fn send_turn(&self, transcript: &[Content]) -> Result<ModelReply> {
        self.generate(transcript).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation() {
        let client = Gemini::new(Some("test-key".to_string())).unwrap();
        assert_eq!(client.api_key, "test-key");
        assert_eq!(client.base_url, DEFAULT_API_URL);
        assert_eq!(client.model, DEFAULT_MODEL);
        assert_eq!(client.timeout, DEFAULT_TIMEOUT);

        let client = Gemini::with_options(
            Some("test-key".to_string()),
            Some("https://custom-api.example.com/models".to_string()),
            Some("gemini-2.5-pro".to_string()),
            Some(Duration::from_secs(30)),
        )
        .unwrap();
        assert_eq!(client.base_url, "https://custom-api.example.com/models");
        assert_eq!(client.model, "gemini-2.5-pro");
        assert_eq!(client.timeout, Duration::from_secs(30));
    }

    #[test]
    fn request_url_embeds_model_and_key() {
        let client = Gemini::new(Some("secret".to_string())).unwrap();
        let url = client.request_url().unwrap();
        assert!(
            url.path().ends_with("/gemini-2.5-flash:generateContent"),
            "unexpected path: {}",
            url.path()
        );
        assert_eq!(url.query(), Some("key=secret"));
    }

    #[test]
    fn request_url_tolerates_trailing_slash() {
        let client = Gemini::with_options(
            Some("k".to_string()),
            Some("https://example.com/v1beta/models/".to_string()),
            None,
            None,
        )
        .unwrap();
        let url = client.request_url().unwrap();
        assert_eq!(
            url.path(),
            "/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn set_model() {
        let mut client = Gemini::new(Some("k".to_string())).unwrap();
        client.set_model("gemini-2.5-pro");
        assert_eq!(client.model(), "gemini-2.5-pro");
    }
}
