use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use fiche_core::model::ExamResult;
use storage::KeyValueStore;

/// Storage key for the exam history log.
pub const EXAM_HISTORY_KEY: &str = "certification-exam-history";

/// Most recent results kept in the log.
pub const EXAM_HISTORY_LIMIT: usize = 50;

/// Persisted wrapper around the result list.
#[derive(Debug, Default, Serialize, Deserialize)]
struct HistoryDoc {
    results: Vec<ExamResult>,
}

/// Persisted log of finished exams, newest first.
///
/// Loaded once at construction; a missing or unreadable value starts empty.
/// Persistence failures are logged and swallowed, like the other record
/// services.
pub struct ExamHistoryService {
    store: Arc<dyn KeyValueStore>,
    results: Mutex<Vec<ExamResult>>,
}

impl ExamHistoryService {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let results = load_results(store.as_ref());
        Self {
            store,
            results: Mutex::new(results),
        }
    }

    /// Prepend a finished exam, dropping the oldest past the limit.
    pub fn record(&self, result: ExamResult) {
        let mut results = self.lock();
        results.insert(0, result);
        results.truncate(EXAM_HISTORY_LIMIT);
        self.persist(&results);
    }

    /// Every stored result, newest first.
    #[must_use]
    pub fn all(&self) -> Vec<ExamResult> {
        self.lock().clone()
    }

    /// Results for one certification, newest first.
    #[must_use]
    pub fn for_certification(&self, certification_id: &str) -> Vec<ExamResult> {
        self.lock()
            .iter()
            .filter(|r| r.certification_id() == certification_id)
            .cloned()
            .collect()
    }

    /// Mean score over the kept results, optionally scoped to one
    /// certification. An empty selection averages to zero.
    #[must_use]
    pub fn average_score(&self, certification_id: Option<&str>) -> f64 {
        let results = self.lock();
        let scores: Vec<u32> = results
            .iter()
            .filter(|r| certification_id.is_none_or(|id| r.certification_id() == id))
            .map(ExamResult::score)
            .collect();

        if scores.is_empty() {
            return 0.0;
        }
        let sum: u32 = scores.iter().sum();
        let count = u32::try_from(scores.len()).unwrap_or(u32::MAX);
        f64::from(sum) / f64::from(count)
    }

    /// Highest score over the kept results, optionally scoped to one
    /// certification.
    #[must_use]
    pub fn best_score(&self, certification_id: Option<&str>) -> u32 {
        self.lock()
            .iter()
            .filter(|r| certification_id.is_none_or(|id| r.certification_id() == id))
            .map(ExamResult::score)
            .max()
            .unwrap_or(0)
    }

    /// Drop every stored result.
    pub fn clear(&self) {
        let mut results = self.lock();
        results.clear();
        self.persist(&results);
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ExamResult>> {
        // a poisoned lock still holds a usable list
        self.results.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, results: &[ExamResult]) {
        let doc = HistoryDoc {
            results: results.to_vec(),
        };
        let json = match serde_json::to_string(&doc) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("could not encode exam history: {e}");
                return;
            }
        };
        if let Err(e) = self.store.set(EXAM_HISTORY_KEY, &json) {
            tracing::warn!("could not persist exam history: {e}");
        }
    }
}

fn load_results(store: &dyn KeyValueStore) -> Vec<ExamResult> {
    let stored = match store.get(EXAM_HISTORY_KEY) {
        Ok(stored) => stored,
        Err(e) => {
            tracing::warn!("could not read exam history, starting fresh: {e}");
            return Vec::new();
        }
    };
    match stored {
        Some(json) => match serde_json::from_str::<HistoryDoc>(&json) {
            Ok(doc) => doc.results,
            Err(e) => {
                tracing::warn!("corrupt exam history, starting fresh: {e}");
                Vec::new()
            }
        },
        None => Vec::new(),
    }
}
