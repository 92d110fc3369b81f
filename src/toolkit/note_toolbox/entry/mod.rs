
pub mod models;
pub mod store;

pub use models::{
    Category, Classification, ClassificationOutcome, ClassifiedItem, CodeKind, Entry, Language,
    NewEntry, Priority, SlangTerm,
};
pub use store::{
    ChangeCallback, EntryFilter, EntryOrdering, EntryPatch, InMemoryNoteStore, ListQuery,
    NoteStore, StoreError, Subscription,
};
