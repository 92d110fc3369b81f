
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

use super::base::{parse_json_content, LlmMetadata, LlmProvider, LlmProviderError, StructuredRequest};

const DEFAULT_CEREBRAS_URL: &str = "https://api.cerebras.ai/v1";

#[derive(Debug, Serialize)]
struct CerebrasRequest<'a> {
    model: &'a str,
    messages: Vec<CerebrasMessage>,
    temperature: f64,
    max_completion_tokens: u32,
    response_format: ResponseFormat<'a>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CerebrasMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat<'a> {
    r#type: &'static str,
    json_schema: JsonSchemaFormat<'a>,
}

#[derive(Debug, Serialize)]
struct JsonSchemaFormat<'a> {
    name: &'a str,
    schema: &'a Value,
    strict: bool,
}

#[derive(Debug, Deserialize)]
struct CerebrasResponse {
    choices: Vec<CerebrasChoice>,
    usage: Option<CerebrasUsage>,
}

#[derive(Debug, Deserialize)]
struct CerebrasChoice {
    message: CerebrasMessage,
}

#[derive(Debug, Deserialize)]
struct CerebrasUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}


pub struct CerebrasProvider {
    api_key: String,
    model: String,
    base_url: String,
    client: Client,
}

impl CerebrasProvider {
    
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: Option<String>,
        timeout: Duration,
    ) -> Self {
        let model = model.into();
        let base_url = base_url.unwrap_or_else(|| DEFAULT_CEREBRAS_URL.to_string());
        info!("Cerebras provider initialized (model={}, url={})", model, base_url);
        Self {
            api_key: api_key.into(),
            model,
            base_url,
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }
}

#[async_trait]
impl LlmProvider for CerebrasProvider {
    async fn generate_structured(
        &self,
        request: &StructuredRequest,
    ) -> Result<(Value, LlmMetadata), LlmProviderError> {
        let messages = vec![
            CerebrasMessage {
                role: "system".to_string(),
                content: Some(request.system_prompt.clone()),
            },
            CerebrasMessage {
                role: "user".to_string(),
                content: Some(request.payload.clone()),
            },
        ];

        let body = CerebrasRequest {
            model: &self.model,
            messages,
            temperature: request.temperature,
            max_completion_tokens: request.max_output_tokens,
            response_format: ResponseFormat {
                r#type: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: request.schema_name,
                    schema: &request.schema,
                    strict: false,
                },
            },
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
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

        let response = response.json::<CerebrasResponse>().await?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| LlmProviderError::Provider("No choices in response".to_string()))?;

        debug!("Cerebras returned {} chars for {}", content.len(), request.schema_name);
        let value = parse_json_content(&content)?;

        let mut metadata = LlmMetadata {
            provider: "cerebras".to_string(),
            model: self.model.clone(),
            base_url: Some(self.base_url.clone()),
            ..Default::default()
        };

        if let Some(usage) = response.usage {
            metadata.tokens_prompt = Some(usage.prompt_tokens);
            metadata.tokens_completion = Some(usage.completion_tokens);
            metadata.tokens_total = Some(usage.total_tokens);
        }

        Ok((value, metadata))
    }

    fn provider_name(&self) -> &str {
        "cerebras"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
