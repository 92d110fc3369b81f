

pub mod note_toolbox;


pub use note_toolbox::{
    local_search, BulkImportReport, Category, Entry, InMemoryNoteStore, NoteService, NoteStore,
    SearchOutcome, SmartSearch,
};
