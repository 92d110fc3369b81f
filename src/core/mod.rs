

pub mod config;
pub mod error;

pub use config::NotesConfig;
pub use error::{NotesError, Result};
