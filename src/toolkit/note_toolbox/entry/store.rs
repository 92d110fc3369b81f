
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::models::{Category, Entry, NewEntry};


#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Entry not found: {0}")]
    NotFound(String),

    #[error("Store backend error: {0}")]
    Backend(String),
}


#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl EntryFilter {
    pub fn matches(&self, entry: &Entry) -> bool {
        self.category.is_none_or(|c| entry.category == c)
            && self.completed.is_none_or(|c| entry.is_completed == c)
    }
}


#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryOrdering {
    #[default]
    NewestFirst,
    OldestFirst,
}


#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub filter: EntryFilter,
    #[serde(default)]
    pub ordering: EntryOrdering,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl ListQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Stable: entries created at the same instant keep insertion order.
    pub fn apply(&self, entries: &[Entry]) -> Vec<Entry> {
        let mut selected: Vec<Entry> = entries
            .iter()
            .filter(|e| self.filter.matches(e))
            .cloned()
            .collect();

        match self.ordering {
            EntryOrdering::NewestFirst => selected.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            EntryOrdering::OldestFirst => selected.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        }

        if let Some(limit) = self.limit {
            selected.truncate(limit);
        }
        selected
    }
}


#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
}

impl EntryPatch {
    pub fn completion(is_completed: bool) -> Self {
        Self {
            is_completed: Some(is_completed),
        }
    }
}


pub type ChangeCallback = Box<dyn Fn(Vec<Entry>) + Send + Sync>;


/// Live handle for a store subscription. Dropping it unsubscribes.
pub struct Subscription {
    id: u64,
    cancel: Option<Box<dyn FnOnce(u64) + Send + Sync>>,
}

impl Subscription {
    pub fn new(id: u64, cancel: impl FnOnce(u64) + Send + Sync + 'static) -> Self {
        Self {
            id,
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel(self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}


/// Document store for entries. Implementations are assumed consistent; callers do not retry.
#[async_trait]
pub trait NoteStore: Send + Sync {
    async fn create(&self, draft: NewEntry) -> Result<Entry, StoreError>;

    async fn get(&self, id: &str) -> Result<Option<Entry>, StoreError>;

    async fn list(&self, query: &ListQuery) -> Result<Vec<Entry>, StoreError>;

    async fn update(&self, id: &str, patch: EntryPatch) -> Result<(), StoreError>;

    async fn delete(&self, id: &str) -> Result<(), StoreError>;

    async fn delete_all(&self, filter: &EntryFilter) -> Result<usize, StoreError>;

    fn subscribe(&self, query: ListQuery, on_change: ChangeCallback) -> Subscription;
}


struct Subscriber {
    query: ListQuery,
    on_change: Arc<dyn Fn(Vec<Entry>) + Send + Sync>,
}

#[derive(Default)]
struct Subscribers {
    next_id: AtomicU64,
    active: Mutex<HashMap<u64, Subscriber>>,
}


#[derive(Default)]
pub struct InMemoryNoteStore {
    entries: RwLock<Vec<Entry>>,
    subscribers: Arc<Subscribers>,
}

impl InMemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Inserts a fully formed entry as-is, keeping its id and timestamps.
    pub fn insert(&self, entry: Entry) {
        self.entries.write().push(entry);
        self.notify();
    }

    /// Callbacks run with no store lock held, so they may read, write or unsubscribe.
    fn notify(&self) {
        let snapshot = self.entries.read().clone();
        let targets: Vec<_> = self
            .subscribers
            .active
            .lock()
            .iter()
            .map(|(id, s)| (*id, s.query.clone(), Arc::clone(&s.on_change)))
            .collect();

        for (id, query, on_change) in targets {
            if !self.subscribers.active.lock().contains_key(&id) {
                continue;
            }
            on_change(query.apply(&snapshot));
        }
    }
}

#[async_trait]
impl NoteStore for InMemoryNoteStore {
    async fn create(&self, draft: NewEntry) -> Result<Entry, StoreError> {
        let entry = Entry::from_new(Uuid::new_v4().to_string(), draft, Utc::now());
        debug!("Creating entry {} ({})", entry.id, entry.category);
        self.entries.write().push(entry.clone());
        self.notify();
        Ok(entry)
    }

    async fn get(&self, id: &str) -> Result<Option<Entry>, StoreError> {
        Ok(self.entries.read().iter().find(|e| e.id == id).cloned())
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<Entry>, StoreError> {
        Ok(query.apply(&self.entries.read()))
    }

    async fn update(&self, id: &str, patch: EntryPatch) -> Result<(), StoreError> {
        {
            let mut entries = self.entries.write();
            let entry = entries
                .iter_mut()
                .find(|e| e.id == id)
                .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

            if let Some(is_completed) = patch.is_completed {
                entry.is_completed = is_completed;
            }
            entry.updated_at = Utc::now().max(entry.updated_at);
        }
        self.notify();
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let removed = {
            let mut entries = self.entries.write();
            let before = entries.len();
            entries.retain(|e| e.id != id);
            before != entries.len()
        };
        if !removed {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.notify();
        Ok(())
    }

    async fn delete_all(&self, filter: &EntryFilter) -> Result<usize, StoreError> {
        let removed = {
            let mut entries = self.entries.write();
            let before = entries.len();
            entries.retain(|e| !filter.matches(e));
            before - entries.len()
        };
        info!("Deleted {} entries", removed);
        self.notify();
        Ok(removed)
    }

    fn subscribe(&self, query: ListQuery, on_change: ChangeCallback) -> Subscription {
        let id = self.subscribers.next_id.fetch_add(1, Ordering::SeqCst);
        let initial = query.apply(&self.entries.read());
        on_change(initial);
        self.subscribers.active.lock().insert(
            id,
            Subscriber {
                query,
                on_change: Arc::from(on_change),
            },
        );

        let registry: Weak<Subscribers> = Arc::downgrade(&self.subscribers);
        Subscription::new(id, move |id| match registry.upgrade() {
            Some(subscribers) => {
                subscribers.active.lock().remove(&id);
                debug!("Subscription {} removed", id);
            }
            None => warn!("Subscription {} outlived its store", id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolkit::note_toolbox::testing::classification;
    use std::sync::atomic::AtomicUsize;

    fn draft(content: &str, category: Category) -> NewEntry {
        NewEntry::new(content, classification(category, &[]))
    }

    #[tokio::test]
    async fn test_create_get_and_list() {
        let store = InMemoryNoteStore::new();
        let first = store.create(draft("first", Category::Task)).await.unwrap();
        let second = store.create(draft("second", Category::Idea)).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(store.get(&first.id).await.unwrap().unwrap().content, "first");
        assert!(store.get("missing").await.unwrap().is_none());

        let tasks = store
            .list(&ListQuery {
                filter: EntryFilter {
                    category: Some(Category::Task),
                    completed: None,
                },
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, first.id);

        let limited = store.list(&ListQuery::all().with_limit(1)).await.unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[tokio::test]
    async fn test_update_completion_keeps_updated_at_monotonic() {
        let store = InMemoryNoteStore::new();
        let entry = store.create(draft("todo", Category::Task)).await.unwrap();

        store.update(&entry.id, EntryPatch::completion(true)).await.unwrap();
        let updated = store.get(&entry.id).await.unwrap().unwrap();
        assert!(updated.is_completed);
        assert!(updated.updated_at >= entry.updated_at);

        let err = store.update("nope", EntryPatch::completion(true)).await.unwrap_err();
        assert_eq!(err, StoreError::NotFound("nope".to_string()));
    }

    #[tokio::test]
    async fn test_delete_and_delete_all() {
        let store = InMemoryNoteStore::new();
        let a = store.create(draft("a", Category::Task)).await.unwrap();
        store.create(draft("b", Category::Task)).await.unwrap();
        store.create(draft("c", Category::Idea)).await.unwrap();

        store.delete(&a.id).await.unwrap();
        assert!(store.delete(&a.id).await.is_err());

        let removed = store
            .delete_all(&EntryFilter {
                category: Some(Category::Task),
                completed: None,
            })
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_subscribe_receives_snapshots_until_unsubscribed() {
        let store = InMemoryNoteStore::new();
        let seen = Arc::new(AtomicUsize::new(0));
        let last_len = Arc::new(AtomicUsize::new(usize::MAX));

        let subscription = {
            let seen = seen.clone();
            let last_len = last_len.clone();
            store.subscribe(
                ListQuery::all(),
                Box::new(move |entries| {
                    seen.fetch_add(1, Ordering::SeqCst);
                    last_len.store(entries.len(), Ordering::SeqCst);
                }),
            )
        };
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert_eq!(last_len.load(Ordering::SeqCst), 0);

        store.create(draft("x", Category::General)).await.unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 2);
        assert_eq!(last_len.load(Ordering::SeqCst), 1);

        subscription.unsubscribe();
        store.create(draft("y", Category::General)).await.unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_callback_may_touch_store_and_drop_its_subscription() {
        let store = Arc::new(InMemoryNoteStore::new());
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
        let seen = Arc::new(AtomicUsize::new(0));

        let subscription = {
            let slot = slot.clone();
            let seen = seen.clone();
            let weak = Arc::downgrade(&store);
            store.subscribe(
                ListQuery::all(),
                Box::new(move |entries| {
                    seen.fetch_add(1, Ordering::SeqCst);
                    if let Some(store) = weak.upgrade() {
                        assert_eq!(store.len(), entries.len());
                    }
                    if !entries.is_empty() {
                        let own = slot.lock().take();
                        drop(own);
                    }
                }),
            )
        };
        *slot.lock() = Some(subscription);

        store.create(draft("x", Category::General)).await.unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 2);
        assert!(slot.lock().is_none());

        store.create(draft("y", Category::General)).await.unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }
}
