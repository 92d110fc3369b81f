
pub mod base;
pub mod cerebras;
pub mod ollama;

#[cfg(test)]
pub(crate) mod scripted;

pub use base::{LlmMetadata, LlmProvider, LlmProviderError, OracleErrorKind, StructuredRequest};
pub use cerebras::CerebrasProvider;
pub use ollama::OllamaProvider;
