
use thiserror::Error;

use crate::llm::providers::base::{LlmProviderError, OracleErrorKind};
use crate::toolkit::note_toolbox::entry::store::StoreError;


#[derive(Error, Debug)]
pub enum NotesError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Transient oracle error: {0}")]
    TransientOracle(String),

    #[error("Permanent oracle error: {0}")]
    PermanentOracle(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Entry not found: {0}")]
    NotFound(String),

    #[error("Classification and persistence both failed: {0}")]
    CriticalFailure(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl NotesError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::TransientOracle(_))
    }
}

impl From<LlmProviderError> for NotesError {
    fn from(err: LlmProviderError) -> Self {
        match err.kind() {
            OracleErrorKind::Transient => Self::TransientOracle(err.to_string()),
            OracleErrorKind::Permanent => Self::PermanentOracle(err.to_string()),
        }
    }
}


pub type Result<T> = std::result::Result<T, NotesError>;
