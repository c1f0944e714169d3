//! Hosted summarization through the Hugging Face inference API.

use crate::error::{LlmError, Result};
use quiz_core::{Summarizer, SummaryLength};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co";

/// Default summarization model.
pub const DEFAULT_MODEL: &str = "facebook/bart-large-cnn";

#[derive(Debug, Serialize)]
struct SummarizationRequest<'a> {
    inputs: &'a str,
    parameters: SummarizationParameters,
}

#[derive(Debug, Serialize)]
struct SummarizationParameters {
    min_length: u32,
    max_length: u32,
    do_sample: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SummarizationResponse {
    Summaries(Vec<SummaryItem>),
    Failure { error: String },
}

#[derive(Debug, Deserialize)]
struct SummaryItem {
    summary_text: String,
}

/// Take the first summary out of a response body.
pub fn parse_summary_response(body: &str) -> Result<String> {
    let response: SummarizationResponse = serde_json::from_str(body)
        .map_err(|e| LlmError::Parse(format!("Invalid summarization response: {}", e)))?;

    match response {
        SummarizationResponse::Summaries(items) => items
            .into_iter()
            .next()
            .map(|item| item.summary_text)
            .ok_or_else(|| LlmError::Api("Empty summarization response".into())),
        SummarizationResponse::Failure { error } => Err(LlmError::Api(error)),
    }
}

/// Summarizer backed by a hosted Hugging Face model.
pub struct HuggingFaceSummarizer {
    http_client: Client,
    token: String,
    base_url: String,
    model: String,
}

impl HuggingFaceSummarizer {
    /// Create a summarizer with the given API token and the default timeout.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::with_timeout(token, crate::DEFAULT_TIMEOUT)
    }

    /// Create a summarizer whose requests give up after `timeout`.
    pub fn with_timeout(token: impl Into<String>, timeout: Duration) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(LlmError::Config("summarization API token is empty".into()));
        }

        Ok(Self {
            http_client: crate::http_client(timeout)?,
            token,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}", self.base_url, self.model)
    }

    fn request_summary(&self, text: &str, length: SummaryLength) -> Result<String> {
        let request = SummarizationRequest {
            inputs: text,
            parameters: SummarizationParameters {
                min_length: length.min,
                max_length: length.max,
                do_sample: false,
            },
        };

        let response = self
            .http_client
            .post(self.endpoint())
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .map_err(|e| {
                log::warn!("Summarization request failed: {}", e);
                LlmError::Network(e.to_string())
            })?;

        let body = crate::response_text(response, "Summarization")?;
        parse_summary_response(&body)
    }
}

impl Summarizer for HuggingFaceSummarizer {
    fn summarize(&self, text: &str, length: SummaryLength) -> quiz_core::Result<String> {
        self.request_summary(text, length)
            .map_err(|e| quiz_core::Error::Summarization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_endpoint() {
        let summarizer = HuggingFaceSummarizer::new("hf_test")
            .unwrap()
            .with_base_url("http://localhost:8080/")
            .with_model("t5-small");
        assert_eq!(summarizer.endpoint(), "http://localhost:8080/models/t5-small");
    }

    #[test]
    fn test_default_endpoint() {
        let summarizer = HuggingFaceSummarizer::new("hf_test").unwrap();
        assert_eq!(
            summarizer.endpoint(),
            "https://api-inference.huggingface.co/models/facebook/bart-large-cnn"
        );
    }

    #[test]
    fn test_empty_token_rejected() {
        assert!(matches!(HuggingFaceSummarizer::new(""), Err(LlmError::Config(_))));
    }

    #[test]
    fn test_request_payload() {
        let request = SummarizationRequest {
            inputs: "Slide text",
            parameters: SummarizationParameters {
                min_length: 30,
                max_length: 40,
                do_sample: false,
            },
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "inputs": "Slide text",
                "parameters": {"min_length": 30, "max_length": 40, "do_sample": false}
            })
        );
    }

    #[test]
    fn test_parse_summary_response() {
        let body = r#"[{"summary_text":"A short summary."}]"#;
        assert_eq!(parse_summary_response(body).unwrap(), "A short summary.");
    }

    #[test]
    fn test_parse_summary_error_payload() {
        let body = r#"{"error":"Model facebook/bart-large-cnn is currently loading","estimated_time":20.0}"#;
        match parse_summary_response(body).unwrap_err() {
            LlmError::Api(msg) => assert!(msg.contains("currently loading")),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_parse_summary_empty_list() {
        assert!(matches!(parse_summary_response("[]"), Err(LlmError::Api(_))));
    }

    #[test]
    fn test_parse_summary_malformed() {
        assert!(matches!(parse_summary_response("{\"foo\": 1}"), Err(LlmError::Parse(_))));
    }

    #[test]
    fn test_unreachable_service_is_summarization_error() {
        let summarizer = HuggingFaceSummarizer::with_timeout("hf_test", Duration::from_secs(5))
            .unwrap()
            .with_base_url("http://127.0.0.1:9");

        let err = summarizer.summarize("text", SummaryLength::default()).unwrap_err();

        assert!(matches!(err, quiz_core::Error::Summarization(_)));
    }
}
