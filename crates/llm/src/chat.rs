//! OpenAI-compatible chat completions and the quiz question generator.

use crate::error::{LlmError, Result};
use quiz_core::{build_quiz_prompt, split_questions, BlankLinePolicy, QuestionGenerator, SYSTEM_INSTRUCTION};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model for question generation.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Chat completion request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Model to use (e.g., "gpt-3.5-turbo")
    pub model: String,

    /// Conversation messages
    pub messages: Vec<Message>,

    /// Sampling temperature (0.0 to 2.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Maximum tokens in completion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    /// Create a new chat request with the given model.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            temperature: None,
            max_tokens: None,
        }
    }

    /// Add a message to the conversation.
    pub fn message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }
}

/// Chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Role: "system", "user", "assistant"
    pub role: String,

    /// Message content
    pub content: String,
}

impl Message {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponseRaw {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

/// Take the first choice's message content out of a response body.
pub fn parse_chat_response(body: &str) -> Result<String> {
    let response: ChatResponseRaw =
        serde_json::from_str(body).map_err(|e| LlmError::Parse(format!("Invalid chat response: {}", e)))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| LlmError::Api("No content in chat response".into()))
}

/// Blocking OpenAI-compatible chat-completion client.
#[derive(Clone)]
pub struct ChatClient {
    http_client: Client,
    api_key: String,
    base_url: String,
}

impl ChatClient {
    /// Create a client with the given API key and the default timeout.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_timeout(api_key, crate::DEFAULT_TIMEOUT)
    }

    /// Create a client whose requests give up after `timeout`.
    pub fn with_timeout(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::Config("chat API key is empty".into()));
        }

        Ok(Self {
            http_client: crate::http_client(timeout)?,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Set a custom base URL (for Azure, proxies, local servers).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a chat completion and return the first choice's content.
    pub fn chat_completion(&self, request: &ChatRequest) -> Result<String> {
        let start = Instant::now();

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .map_err(|e| {
                log::warn!("Chat completion request failed: {}", e);
                LlmError::Network(e.to_string())
            })?;

        let body = crate::response_text(response, "Chat completion")?;
        let content = parse_chat_response(&body)?;

        log::debug!(
            "Chat completion with {} took {} ms",
            request.model,
            start.elapsed().as_millis()
        );

        Ok(content)
    }
}

/// Generates quiz questions from summaries with a chat-completion model.
pub struct ChatQuestionGenerator {
    client: ChatClient,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    blank_lines: BlankLinePolicy,
}

impl ChatQuestionGenerator {
    /// Create a generator using [`DEFAULT_MODEL`].
    pub fn new(client: ChatClient) -> Self {
        Self {
            client,
            model: DEFAULT_MODEL.to_string(),
            temperature: None,
            max_tokens: None,
            blank_lines: BlankLinePolicy::default(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_blank_lines(mut self, policy: BlankLinePolicy) -> Self {
        self.blank_lines = policy;
        self
    }

    /// The two-message request sent for the given summaries.
    pub fn build_request(&self, summaries: &[String]) -> ChatRequest {
        let mut request = ChatRequest::new(&self.model)
            .message(Message::system(SYSTEM_INSTRUCTION))
            .message(Message::user(build_quiz_prompt(summaries)));
        request.temperature = self.temperature;
        request.max_tokens = self.max_tokens;
        request
    }
}

impl QuestionGenerator for ChatQuestionGenerator {
    fn generate_questions(&self, summaries: &[String]) -> quiz_core::Result<Vec<String>> {
        let request = self.build_request(summaries);
        let content = self
            .client
            .chat_completion(&request)
            .map_err(|e| quiz_core::Error::QuestionGeneration(e.to_string()))?;

        Ok(split_questions(&content, self.blank_lines))
    }
}
