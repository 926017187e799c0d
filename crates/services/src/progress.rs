use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use fiche_core::model::{ProgressRecord, TopicKey};
use storage::KeyValueStore;

/// Storage key for the read/favorite record.
pub const PROGRESS_KEY: &str = "certification-progress";

/// Read, favorite, and last-visited tracking with write-through persistence.
///
/// The record loads once at construction; a missing or unreadable value
/// starts fresh. Persistence failures are logged and swallowed so study flows
/// keep working on the in-memory state.
pub struct ProgressService {
    store: Arc<dyn KeyValueStore>,
    record: Mutex<ProgressRecord>,
}

impl ProgressService {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let record = load_record(store.as_ref());
        Self {
            store,
            record: Mutex::new(record),
        }
    }

    /// Flip a topic's read state. Returns the new state.
    pub fn toggle_completed(&self, key: TopicKey) -> bool {
        let mut record = self.lock();
        let completed = record.toggle_completed(key);
        self.persist(&record);
        completed
    }

    /// Flip a topic's favorite state. Returns the new state.
    pub fn toggle_favorite(&self, key: TopicKey) -> bool {
        let mut record = self.lock();
        let favorite = record.toggle_favorite(key);
        self.persist(&record);
        favorite
    }

    /// Remember the most recently opened topic.
    pub fn set_last_visited(&self, key: TopicKey) {
        let mut record = self.lock();
        record.set_last_visited(key);
        self.persist(&record);
    }

    #[must_use]
    pub fn is_completed(&self, key: &TopicKey) -> bool {
        self.lock().is_completed(key)
    }

    #[must_use]
    pub fn is_favorite(&self, key: &TopicKey) -> bool {
        self.lock().is_favorite(key)
    }

    #[must_use]
    pub fn last_visited(&self) -> Option<TopicKey> {
        self.lock().last_visited().cloned()
    }

    #[must_use]
    pub fn favorites(&self) -> Vec<TopicKey> {
        self.lock().favorites().cloned().collect()
    }

    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.lock().completed_count()
    }

    /// Topics read across one whole certification.
    #[must_use]
    pub fn certification_progress(&self, certification_id: &str) -> usize {
        self.lock()
            .completed_with_prefix(&TopicKey::certification_prefix(certification_id))
    }

    /// Topics read within one category of a certification.
    #[must_use]
    pub fn category_progress(&self, certification_id: &str, category_id: &str) -> usize {
        self.lock()
            .completed_with_prefix(&TopicKey::category_prefix(certification_id, category_id))
    }

    /// A copy of the current record, for display.
    #[must_use]
    pub fn snapshot(&self) -> ProgressRecord {
        self.lock().clone()
    }

    /// Drop all read marks, favorites, and the last-visited topic.
    pub fn reset(&self) {
        let mut record = self.lock();
        record.clear();
        self.persist(&record);
    }

    fn lock(&self) -> MutexGuard<'_, ProgressRecord> {
        // a poisoned lock still holds a usable record
        self.record.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, record: &ProgressRecord) {
        let json = match serde_json::to_string(record) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("could not encode progress record: {e}");
                return;
            }
        };
        if let Err(e) = self.store.set(PROGRESS_KEY, &json) {
            tracing::warn!("could not persist progress record: {e}");
        }
    }
}

fn load_record(store: &dyn KeyValueStore) -> ProgressRecord {
    let stored = match store.get(PROGRESS_KEY) {
        Ok(stored) => stored,
        Err(e) => {
            tracing::warn!("could not read progress record, starting fresh: {e}");
            return ProgressRecord::default();
        }
    };
    match stored {
        Some(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
            tracing::warn!("corrupt progress record, starting fresh: {e}");
            ProgressRecord::default()
        }),
        None => ProgressRecord::default(),
    }
}
