//! OpenAI-compatible chat-completions client for field insights.

use clap::Args;
use fieldscan_algorithms::insight::{InsightError, InsightProvider};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gemma2-9b-it";

/// Insight endpoint settings, shared by the commands that can ask for advice.
#[derive(Args, Debug, Clone)]
pub struct InsightArgs {
    /// Chat-completions endpoint
    #[arg(long, env = "FIELDSCAN_INSIGHT_URL", default_value = DEFAULT_URL)]
    pub insight_url: String,

    /// Model name sent with each request
    #[arg(long, env = "FIELDSCAN_INSIGHT_MODEL", default_value = DEFAULT_MODEL)]
    pub insight_model: String,

    /// API key for the endpoint
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Sampling temperature
    #[arg(long, default_value = "0.7")]
    pub temperature: f32,

    /// Upper bound on generated tokens
    #[arg(long, default_value = "1000")]
    pub max_tokens: u32,

    /// Request timeout in seconds
    #[arg(long, default_value = "60")]
    pub timeout: u64,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Blocking client for a single chat-completions endpoint.
pub struct ChatCompletionClient {
    client: Client,
    args: InsightArgs,
}

impl ChatCompletionClient {
    pub fn new(args: InsightArgs) -> Result<Self, InsightError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(args.timeout))
            .build()
            .map_err(|e| InsightError::Request(e.to_string()))?;
        Ok(Self { client, args })
    }

    fn request_body<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.args.insight_model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.args.temperature,
            max_tokens: self.args.max_tokens,
        }
    }
}

impl InsightProvider for ChatCompletionClient {
    fn name(&self) -> &str {
        &self.args.insight_model
    }

    fn generate(&self, prompt: &str) -> Result<String, InsightError> {
        let api_key = self
            .args
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| InsightError::NotConfigured("GROQ_API_KEY is not set".into()))?;

        debug!("POST {} ({} prompt bytes)", self.args.insight_url, prompt.len());
        let resp = self
            .client
            .post(&self.args.insight_url)
            .bearer_auth(api_key)
            .json(&self.request_body(prompt))
            .send()
            .map_err(|e| InsightError::Request(e.to_string()))?
            .error_for_status()
            .map_err(|e| InsightError::Request(e.to_string()))?;

        let body: ChatResponse = resp
            .json()
            .map_err(|e| InsightError::Response(e.to_string()))?;
        first_reply(body)
    }
}

fn first_reply(body: ChatResponse) -> Result<String, InsightError> {
    body.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| InsightError::Response("no completion choices".into()))
}
