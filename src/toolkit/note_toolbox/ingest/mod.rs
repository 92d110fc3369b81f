
pub mod models;
pub mod service;

pub use models::BulkImportReport;
pub use service::NoteService;
