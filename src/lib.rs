

pub mod core;
pub mod llm;
pub mod mcp;
pub mod toolkit;
pub mod utils;

pub use utils::preview;


pub use core::config::NotesConfig;
pub use core::error::{NotesError, Result};
pub use llm::client::{OracleClient, RetryPolicy};
pub use llm::factory::LlmProviderFactory;
pub use llm::providers::{LlmProvider, LlmProviderError, OracleErrorKind};


pub use toolkit::note_toolbox::{
    local_search, BulkClassifier, BulkImportReport, Category, Classification,
    ClassificationOutcome, ClassifiedItem, Entry, EntryClassifier, EntryFilter, InMemoryNoteStore,
    ListQuery, NoteService, NoteStore, QueryExpander, SearchOutcome, SearchPath, SmartSearch,
};
