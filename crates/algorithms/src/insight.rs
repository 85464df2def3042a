//! Natural-language insight boundary
//!
//! The summary report can be handed to a text-generation service for plain
//! language advice. That call is best-effort: [`request_insights`] never
//! fails, and the summary stays valid whatever the provider does.

use thiserror::Error;
use tracing::warn;

/// Errors produced by an insight provider.
#[derive(Error, Debug)]
pub enum InsightError {
    #[error("insight provider is not configured: {0}")]
    NotConfigured(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("unexpected response: {0}")]
    Response(String),
}

/// Something that turns a summary report into advice text.
pub trait InsightProvider {
    /// Short label for log messages
    fn name(&self) -> &str;

    fn generate(&self, prompt: &str) -> Result<String, InsightError>;
}

/// Outcome of a best-effort insight request.
#[derive(Debug, Clone, PartialEq)]
pub enum Insight {
    Generated(String),
    /// No advice; carries the reason to show the user.
    Unavailable(String),
}

impl Insight {
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Generated(text) => Some(text),
            Self::Unavailable(_) => None,
        }
    }
}

/// Prompt sent to the provider for a given summary report.
pub fn insight_prompt(summary: &str) -> String {
    format!(
        "You are an agricultural expert helping farmers understand their field conditions \
based on satellite data.
Please analyze this data and provide practical advice in simple, non-technical language. \
Additionally, give a detailed technical analysis.

{summary}
Please format your response as follows:
1. Simple Summary
2. Key Actions
3. Timing
4. Warnings
"
    )
}

/// Ask `provider` for advice on `summary`, absorbing any failure.
pub fn request_insights(provider: &dyn InsightProvider, summary: &str) -> Insight {
    match provider.generate(&insight_prompt(summary)) {
        Ok(text) if !text.trim().is_empty() => Insight::Generated(text),
        Ok(_) => {
            warn!("{} returned an empty response", provider.name());
            Insight::Unavailable("empty response".to_string())
        }
        Err(e) => {
            warn!("{} failed: {}", provider.name(), e);
            Insight::Unavailable(e.to_string())
        }
    }
}
