
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

use super::base::{parse_json_content, LlmMetadata, LlmProvider, LlmProviderError, StructuredRequest};

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaMessage>,
    stream: bool,
    options: OllamaOptions,
    format: &'a Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct OllamaMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f64,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    message: OllamaMessage,
    #[serde(default)]
    prompt_eval_count: u32,
    #[serde(default)]
    eval_count: u32,
}


pub struct OllamaProvider {
    base_url: String,
    model: String,
    client: Client,
}

impl OllamaProvider {
    
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into();
        let model = model.into();
        info!("Ollama provider initialized (model={}, url={})", model, base_url);
        Self {
            base_url,
            model,
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    
    pub fn localhost(model: impl Into<String>) -> Self {
        Self::new(DEFAULT_OLLAMA_URL, model, Duration::from_secs(600))
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    async fn generate_structured(
        &self,
        request: &StructuredRequest,
    ) -> Result<(Value, LlmMetadata), LlmProviderError> {
        let messages = vec![
            OllamaMessage {
                role: "system".to_string(),
                content: request.system_prompt.clone(),
            },
            OllamaMessage {
                role: "user".to_string(),
                content: request.payload.clone(),
            },
        ];

        let body = OllamaRequest {
            model: &self.model,
            messages,
            stream: false,
            options: OllamaOptions {
                temperature: request.temperature,
                num_predict: request.max_output_tokens,
            },
            format: &request.schema,
        };

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LlmProviderError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let response = response.json::<OllamaResponse>().await?;
        debug!(
            "Ollama returned {} chars for {}",
            response.message.content.len(),
            request.schema_name
        );
        let value = parse_json_content(&response.message.content)?;

        let metadata = LlmMetadata {
            provider: "ollama".to_string(),
            model: self.model.clone(),
            base_url: Some(self.base_url.clone()),
            tokens_prompt: Some(response.prompt_eval_count),
            tokens_completion: Some(response.eval_count),
            tokens_total: Some(response.prompt_eval_count + response.eval_count),
        };

        Ok((value, metadata))
    }

    fn provider_name(&self) -> &str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
