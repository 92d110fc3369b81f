use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use super::error::{NotesError, Result};
use crate::llm::client::RetryPolicy;


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotesConfig {

    pub llm_provider: String,
    pub llm_model: String,
    #[serde(skip_serializing)]
    pub llm_api_key: Option<String>,
    pub llm_base_url: Option<String>,
    pub llm_temperature: f64,
    pub llm_max_output_tokens: u32,
    pub timeout: u64,


    /// Total oracle calls per request, the first one included.
    pub max_attempts: u32,
    pub retry_base_delay_ms: u64,
    pub retry_max_delay_ms: u64,
    pub retry_jitter_ms: u64,


    pub expansion_enabled: bool,
    pub min_expansion_query_chars: usize,
    pub expansion_max_attempts: u32,


    pub segmentation_min_chars: usize,
}

impl NotesConfig {

    pub fn new(llm_provider: &str, llm_model: &str) -> Self {
        Self {
            llm_provider: llm_provider.to_string(),
            llm_model: llm_model.to_string(),
            llm_api_key: None,
            llm_base_url: None,
            llm_temperature: 0.3,
            llm_max_output_tokens: 2048,
            timeout: 30,

            max_attempts: 3,
            retry_base_delay_ms: 1_000,
            retry_max_delay_ms: 10_000,
            retry_jitter_ms: 500,

            expansion_enabled: true,
            min_expansion_query_chars: 2,
            expansion_max_attempts: 1,

            segmentation_min_chars: 200,
        }
    }


    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(provider) = std::env::var("NOTES_LLM_PROVIDER") {
            config.llm_provider = provider;
        }
        if let Ok(model) = std::env::var("NOTES_LLM_MODEL") {
            config.llm_model = model;
        }
        if let Ok(key) = std::env::var("NOTES_LLM_API_KEY") {
            config.llm_api_key = Some(key);
        }
        if let Ok(url) = std::env::var("NOTES_LLM_BASE_URL") {
            config.llm_base_url = Some(url);
        }
        if let Some(temperature) = env_parse("NOTES_LLM_TEMPERATURE") {
            config.llm_temperature = temperature;
        }
        if let Some(timeout) = env_parse("NOTES_TIMEOUT") {
            config.timeout = timeout;
        }
        if let Some(attempts) = env_parse("NOTES_MAX_ATTEMPTS") {
            config.max_attempts = attempts;
        }
        if let Some(enabled) = env_parse("NOTES_EXPANSION_ENABLED") {
            config.expansion_enabled = enabled;
        }
        if let Some(min_chars) = env_parse("NOTES_SEGMENTATION_MIN_CHARS") {
            config.segmentation_min_chars = min_chars;
        }

        config
    }

    /// Defaults, then the optional file (format from its extension), then `NOTES__*` variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = path {
            if !path.exists() {
                tracing::warn!(
                    "Config file {} not found, using defaults and environment",
                    path.display()
                );
            }
            builder = builder.add_source(::config::File::from(path).required(false));
        }
        builder = builder.add_source(::config::Environment::with_prefix("NOTES").separator("__"));

        let loaded: Self = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| NotesError::Config(e.to_string()))?;
        loaded.validate()?;
        Ok(loaded)
    }

    pub fn validate(&self) -> Result<()> {
        if self.llm_provider.trim().is_empty() {
            return Err(NotesError::Config("llm_provider must not be empty".to_string()));
        }
        if self.llm_model.trim().is_empty() {
            return Err(NotesError::Config("llm_model must not be empty".to_string()));
        }
        if self.max_attempts == 0 || self.expansion_max_attempts == 0 {
            return Err(NotesError::Config(
                "retry attempts must be at least 1".to_string(),
            ));
        }
        if self.retry_max_delay_ms < self.retry_base_delay_ms {
            return Err(NotesError::Config(format!(
                "retry_max_delay_ms ({}) is below retry_base_delay_ms ({})",
                self.retry_max_delay_ms, self.retry_base_delay_ms
            )));
        }
        if !(0.0..=2.0).contains(&self.llm_temperature) {
            return Err(NotesError::Config(format!(
                "llm_temperature {} is outside [0, 2]",
                self.llm_temperature
            )));
        }
        Ok(())
    }

    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.retry_base_delay_ms),
            Duration::from_millis(self.retry_max_delay_ms),
            Duration::from_millis(self.retry_jitter_ms),
        )
    }

    /// Same delays as `retry_policy`, with the expansion attempt budget.
    pub fn expansion_retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.expansion_max_attempts,
            ..self.retry_policy()
        }
    }
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self::new("cerebras", "llama-3.3-70b")
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tokio_test::{assert_err, assert_ok};
    use uuid::Uuid;

    #[test]
    fn test_defaults() {
        let config = NotesConfig::default();
        assert_eq!(config.llm_provider, "cerebras");
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.min_expansion_query_chars, 2);
        assert_eq!(config.segmentation_min_chars, 200);
        assert_ok!(config.validate());
    }

    #[test]
    fn test_retry_policies() {
        let config = NotesConfig::default();
        let policy = config.retry_policy();
        assert_eq!(policy, RetryPolicy::default());

        let expansion = config.expansion_retry_policy();
        assert_eq!(expansion.max_attempts, 1);
        assert_eq!(expansion.base_delay, policy.base_delay);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = NotesConfig::default();
        config.llm_model = " ".to_string();
        assert!(matches!(config.validate(), Err(NotesError::Config(_))));

        let mut config = NotesConfig::default();
        config.max_attempts = 0;
        assert_err!(config.validate());

        let mut config = NotesConfig::default();
        config.retry_max_delay_ms = 10;
        assert!(config.validate().is_err());

        let mut config = NotesConfig::default();
        config.llm_temperature = 2.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_file_overrides_defaults() {
        let path = std::env::temp_dir().join(format!("smartnotes-{}.toml", Uuid::new_v4()));
        fs::write(
            &path,
            "llm_provider = \"ollama\"\nllm_model = \"llama3.2\"\nsegmentation_min_chars = 120\n",
        )
        .unwrap();

        let config = NotesConfig::load(Some(path.as_path())).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(config.llm_provider, "ollama");
        assert_eq!(config.llm_model, "llama3.2");
        assert_eq!(config.segmentation_min_chars, 120);
        assert_eq!(config.max_attempts, 3);
    }

    #[test]
    fn test_load_invalid_file_is_config_error() {
        let path = std::env::temp_dir().join(format!("smartnotes-{}.toml", Uuid::new_v4()));
        fs::write(&path, "max_attempts = 0\n").unwrap();

        let result = NotesConfig::load(Some(path.as_path()));
        fs::remove_file(&path).ok();
        assert!(matches!(result, Err(NotesError::Config(_))));
    }

    #[test]
    fn test_max_attempts_is_total_call_budget() {
        let mut config = NotesConfig::default();
        config.max_attempts = 1;
        assert_ok!(config.validate());
        assert_eq!(config.retry_policy().max_attempts, 1);

        let path = std::env::temp_dir().join(format!("smartnotes-{}.toml", Uuid::new_v4()));
        fs::write(&path, "max_attempts = 5\n").unwrap();
        let loaded = NotesConfig::load(Some(path.as_path()));
        fs::remove_file(&path).ok();
        assert_eq!(assert_ok!(loaded).retry_policy().max_attempts, 5);
    }

    #[test]
    fn test_api_key_is_not_serialized() {
        let mut config = NotesConfig::default();
        config.llm_api_key = Some("secret".to_string());
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
    }
}
