
use std::sync::Arc;
use tracing::info;

use super::providers::base::LlmProvider;
use super::providers::cerebras::CerebrasProvider;
use super::providers::ollama::{OllamaProvider, DEFAULT_OLLAMA_URL};
use crate::core::config::NotesConfig;
use crate::core::error::{NotesError, Result};


pub struct LlmProviderFactory;

impl LlmProviderFactory {
    
    pub fn create(config: &NotesConfig) -> Result<Arc<dyn LlmProvider>> {
        let timeout = config.timeout_duration();
        let provider: Arc<dyn LlmProvider> = match config.llm_provider.trim().to_lowercase().as_str() {
            "cerebras" => {
                let api_key = config
                    .llm_api_key
                    .as_deref()
                    .filter(|k| !k.trim().is_empty())
                    .ok_or_else(|| {
                        NotesError::Config("cerebras provider requires llm_api_key".to_string())
                    })?;
                Arc::new(CerebrasProvider::new(
                    api_key,
                    config.llm_model.clone(),
                    config.llm_base_url.clone(),
                    timeout,
                ))
            }
            "ollama" => Arc::new(OllamaProvider::new(
                config.llm_base_url.as_deref().unwrap_or(DEFAULT_OLLAMA_URL),
                config.llm_model.clone(),
                timeout,
            )),
            other => {
                return Err(NotesError::Config(format!(
                    "Unknown provider: {other}. Supported: cerebras, ollama"
                )));
            }
        };

        info!(
            "LLM provider ready: {}/{}",
            provider.provider_name(),
            provider.model_name()
        );
        Ok(provider)
    }
}
