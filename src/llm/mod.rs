

pub mod client;
pub mod factory;
pub mod providers;

pub use client::{OracleClient, RetryPolicy};
pub use factory::LlmProviderFactory;
pub use providers::{LlmMetadata, LlmProvider, LlmProviderError, OracleErrorKind, StructuredRequest};
