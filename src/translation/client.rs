use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Sampling temperature for every translation request.
pub const TEMPERATURE: f32 = 0.3;

/// One chat-completion round trip: a system prompt and a user prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub system: String,
    pub user: String,
    /// Ask the endpoint for a JSON object response.
    pub json: bool,
}

/// Anything that can answer a [`ChatRequest`] with the assistant's text.
#[allow(async_fn_in_trait)]
pub trait ChatBackend {
    async fn complete(&self, request: &ChatRequest) -> Result<String>;
}

// Use Cow to avoid cloning strings that are only borrowed for serialization
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: Cow<'a, str>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Non-streaming client for OpenAI-compatible chat-completion endpoints.
pub struct ChatClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
}

impl ChatClient {
    pub fn new(endpoint: String, api_key: Option<String>, model: String) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            api_key,
            model,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.endpoint.trim_end_matches('/')
        )
    }
}

impl ChatBackend for ChatClient {
    async fn complete(&self, request: &ChatRequest) -> Result<String> {
        let url = self.url();

        let chat_request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: Cow::Borrowed(&request.system),
                },
                Message {
                    role: "user",
                    content: Cow::Borrowed(&request.user),
                },
            ],
            temperature: TEMPERATURE,
            stream: false,
            response_format: request.json.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        let mut http_request = self.client.post(&url).json(&chat_request);

        // Add Authorization header if API key is present
        if let Some(api_key) = &self.api_key {
            http_request = http_request.header("Authorization", format!("Bearer {api_key}"));
        }

        let response = http_request
            .send()
            .await
            .with_context(|| format!("Failed to connect to API endpoint: {url}"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("API request failed with status {status}: {body}");
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .context("Failed to decode chat completion response")?;

        extract_content(body)
    }
}

fn extract_content(response: ChatCompletionResponse) -> Result<String> {
    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .context("API response contained no message content")?;

    Ok(content.trim().to_string())
}
