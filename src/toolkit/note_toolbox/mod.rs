
pub mod classifier;
pub mod entry;
pub mod ingest;
pub mod search;

#[cfg(test)]
pub(crate) mod testing;


pub use classifier::{BulkClassifier, EntryClassifier};
pub use entry::{
    Category, Classification, ClassificationOutcome, ClassifiedItem, Entry, EntryFilter,
    EntryOrdering, EntryPatch, InMemoryNoteStore, ListQuery, NewEntry, NoteStore, StoreError,
};
pub use ingest::{BulkImportReport, NoteService};
pub use search::{local_search, QueryExpander, SearchIntent, SearchOutcome, SearchPath, SmartSearch};
