
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;


const TRANSIENT_STATUS_CODES: [u16; 3] = [429, 503, 504];

const TRANSIENT_MARKERS: [&str; 9] = [
    "overloaded",
    "unavailable",
    "quota",
    "resource_exhausted",
    "resource exhausted",
    "rate limit",
    "timeout",
    "timed out",
    "deadline",
];


#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OracleErrorKind {
    Transient,
    Permanent,
}


#[derive(Error, Debug)]
pub enum LlmProviderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Provider returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Response does not match schema: {0}")]
    Schema(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl LlmProviderError {
    /// Overload, quota exhaustion and timeouts are retryable; everything else is not.
    pub fn kind(&self) -> OracleErrorKind {
        match self {
            Self::Http(e) => {
                if e.is_timeout() {
                    return OracleErrorKind::Transient;
                }
                if let Some(status) = e.status() {
                    if TRANSIENT_STATUS_CODES.contains(&status.as_u16()) {
                        return OracleErrorKind::Transient;
                    }
                }
                classify_message(&e.to_string())
            }
            Self::Status { status, message } => {
                if TRANSIENT_STATUS_CODES.contains(status) {
                    OracleErrorKind::Transient
                } else {
                    classify_message(message)
                }
            }
            Self::Provider(message) => classify_message(message),
            Self::Json(_) | Self::Schema(_) | Self::Internal(_) => OracleErrorKind::Permanent,
        }
    }

    pub fn is_transient(&self) -> bool {
        self.kind() == OracleErrorKind::Transient
    }
}

fn classify_message(message: &str) -> OracleErrorKind {
    let lower = message.to_lowercase();
    if TRANSIENT_MARKERS.iter().any(|marker| lower.contains(marker)) {
        OracleErrorKind::Transient
    } else {
        OracleErrorKind::Permanent
    }
}


#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LlmMetadata {
    pub provider: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens_prompt: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens_completion: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens_total: Option<u32>,
}


#[derive(Debug, Clone)]
pub struct StructuredRequest {
    pub system_prompt: String,
    pub payload: String,
    pub schema_name: &'static str,
    pub schema: Value,
    pub temperature: f64,
    pub max_output_tokens: u32,
}


#[async_trait]
pub trait LlmProvider: Send + Sync {
    
    async fn generate_structured(
        &self,
        request: &StructuredRequest,
    ) -> Result<(Value, LlmMetadata), LlmProviderError>;

    
    fn provider_name(&self) -> &str;

    
    fn model_name(&self) -> &str;
}


#[async_trait]
impl LlmProvider for Arc<dyn LlmProvider> {
    async fn generate_structured(
        &self,
        request: &StructuredRequest,
    ) -> Result<(Value, LlmMetadata), LlmProviderError> {
        (**self).generate_structured(request).await
    }

    fn provider_name(&self) -> &str {
        (**self).provider_name()
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}


/// Parses the text a chat model returned into JSON, tolerating markdown code fences.
pub(crate) fn parse_json_content(content: &str) -> Result<Value, LlmProviderError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(LlmProviderError::Provider("Empty response content".to_string()));
    }

    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed);

    Ok(serde_json::from_str(unfenced)?)
}
