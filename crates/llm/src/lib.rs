//! Clients for the remote model services the quiz pipeline delegates to.
//!
//! - [`ChatClient`]: OpenAI-compatible chat completions, used by
//!   [`ChatQuestionGenerator`] to turn slide summaries into quiz questions.
//! - [`HuggingFaceSummarizer`]: Hugging Face inference API summarization.
//!
//! All clients are blocking and apply a request timeout.

pub mod chat;
pub mod error;
pub mod summarize;

pub use chat::{ChatClient, ChatQuestionGenerator, ChatRequest, Message};
pub use error::{LlmError, Result};
pub use summarize::HuggingFaceSummarizer;

use std::time::Duration;

/// Default timeout for a single HTTP request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Build the blocking HTTP client shared by all backends.
pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| LlmError::Config(format!("Failed to build HTTP client: {}", e)))
}

/// Read a response body, turning non-2xx statuses into [`LlmError::Api`].
pub(crate) fn response_text(response: reqwest::blocking::Response, service: &str) -> Result<String> {
    let status = response.status();
    let body = response
        .text()
        .map_err(|e| LlmError::Network(format!("Failed to read {} response: {}", service, e)))?;

    if !status.is_success() {
        log::warn!("{} API error: status={} body={}", service, status, body);
        return Err(LlmError::Api(format!("{} API error ({}): {}", service, status, body)));
    }

    Ok(body)
}
