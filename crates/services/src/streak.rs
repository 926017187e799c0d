use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;

use fiche_core::Clock;
use fiche_core::model::StreakRecord;
use storage::KeyValueStore;

/// Storage key for the streak record.
pub const STREAKS_KEY: &str = "certification-streaks";

/// Day-streak tracking with write-through persistence.
///
/// Construction reconciles the stored record against the clock's calendar
/// date, so a streak broken while the app was closed is reset (or spared by
/// an unspent weekly freeze) before anything reads it. Persistence failures
/// are logged and swallowed, like `ProgressService`.
pub struct StreakService {
    store: Arc<dyn KeyValueStore>,
    clock: Clock,
    record: Mutex<StreakRecord>,
}

impl StreakService {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Clock) -> Self {
        let mut record = load_record(store.as_ref());
        let was_reset = record.reconcile(clock.today());

        let service = Self {
            store,
            clock,
            record: Mutex::new(record),
        };
        if was_reset {
            tracing::info!("streak broken while away, counter reset");
            let record = service.lock();
            service.persist(&record);
        }
        service
    }

    /// Record study activity for today. Returns false when today was already
    /// recorded.
    pub fn record_activity(&self) -> bool {
        let mut record = self.lock();
        let recorded = record.record_activity(self.clock.today());
        if recorded {
            self.persist(&record);
        }
        recorded
    }

    /// Spend this week's freeze. Returns false when it was already spent.
    pub fn use_freeze(&self) -> bool {
        let mut record = self.lock();
        let used = record.use_freeze(self.clock.today());
        if used {
            self.persist(&record);
        }
        used
    }

    #[must_use]
    pub fn can_use_freeze(&self) -> bool {
        self.lock().can_use_freeze(self.clock.today())
    }

    #[must_use]
    pub fn current_streak(&self) -> u32 {
        self.lock().current_streak()
    }

    #[must_use]
    pub fn best_streak(&self) -> u32 {
        self.lock().best_streak()
    }

    #[must_use]
    pub fn freezes_used(&self) -> u32 {
        self.lock().freezes_used()
    }

    #[must_use]
    pub fn is_active_today(&self) -> bool {
        self.lock().is_active_on(self.clock.today())
    }

    #[must_use]
    pub fn activity_history(&self) -> Vec<NaiveDate> {
        self.lock().activity_history().to_vec()
    }

    /// Activity dates within the given month (1-based), for calendar views.
    #[must_use]
    pub fn activity_for_month(&self, year: i32, month: u32) -> Vec<NaiveDate> {
        self.lock().activity_for_month(year, month)
    }

    /// A copy of the current record, for display.
    #[must_use]
    pub fn snapshot(&self) -> StreakRecord {
        self.lock().clone()
    }

    /// Drop all streak state.
    pub fn reset(&self) {
        let mut record = self.lock();
        record.clear();
        self.persist(&record);
    }

    fn lock(&self) -> MutexGuard<'_, StreakRecord> {
        // a poisoned lock still holds a usable record
        self.record.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, record: &StreakRecord) {
        let json = match serde_json::to_string(record) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("could not encode streak record: {e}");
                return;
            }
        };
        if let Err(e) = self.store.set(STREAKS_KEY, &json) {
            tracing::warn!("could not persist streak record: {e}");
        }
    }
}

fn load_record(store: &dyn KeyValueStore) -> StreakRecord {
    let stored = match store.get(STREAKS_KEY) {
        Ok(stored) => stored,
        Err(e) => {
            tracing::warn!("could not read streak record, starting fresh: {e}");
            return StreakRecord::default();
        }
    };
    match stored {
        Some(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
            tracing::warn!("corrupt streak record, starting fresh: {e}");
            StreakRecord::default()
        }),
        None => StreakRecord::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::{FailingStore, MemoryStore};

    fn day(year: i32, month: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, d).unwrap()
    }

    fn clock_at(date: NaiveDate) -> Clock {
        Clock::fixed(date.and_hms_opt(12, 0, 0).unwrap().and_utc())
    }

    fn shared_store() -> Arc<dyn KeyValueStore> {
        Arc::new(MemoryStore::new())
    }

    #[test]
    fn first_activity_starts_a_streak() {
        let service = StreakService::new(shared_store(), clock_at(day(2024, 3, 4)));

        assert!(service.record_activity());
        assert_eq!(service.current_streak(), 1);
        assert!(service.is_active_today());
        assert!(!service.record_activity());
    }

    #[test]
    fn consecutive_days_extend_across_restarts() {
        let store = shared_store();

        StreakService::new(Arc::clone(&store), clock_at(day(2024, 3, 4))).record_activity();
        let next_day = StreakService::new(Arc::clone(&store), clock_at(day(2024, 3, 5)));
        next_day.record_activity();

        assert_eq!(next_day.current_streak(), 2);
        assert_eq!(next_day.best_streak(), 2);
    }

    #[test]
    fn startup_spares_broken_streak_while_freeze_is_unspent() {
        let store = shared_store();
        StreakService::new(Arc::clone(&store), clock_at(day(2024, 3, 4))).record_activity();

        let later = StreakService::new(Arc::clone(&store), clock_at(day(2024, 3, 7)));
        assert_eq!(later.current_streak(), 1);
        assert!(later.can_use_freeze());
    }

    #[test]
    fn startup_resets_broken_streak_once_freeze_is_spent() {
        let store = shared_store();
        StreakService::new(Arc::clone(&store), clock_at(day(2024, 3, 4))).record_activity();
        StreakService::new(Arc::clone(&store), clock_at(day(2024, 3, 5))).record_activity();

        let thursday = StreakService::new(Arc::clone(&store), clock_at(day(2024, 3, 7)));
        assert!(thursday.use_freeze());

        let reopened = StreakService::new(Arc::clone(&store), clock_at(day(2024, 3, 7)));
        assert_eq!(reopened.current_streak(), 0);
        assert_eq!(reopened.best_streak(), 2);
    }

    #[test]
    fn freeze_is_metered_per_week() {
        let store = shared_store();

        let monday = StreakService::new(Arc::clone(&store), clock_at(day(2024, 3, 4)));
        assert!(monday.can_use_freeze());
        assert!(monday.use_freeze());
        assert!(!monday.use_freeze());
        assert_eq!(monday.freezes_used(), 1);

        // Saturday still sits in the same week, Sunday starts the next.
        let saturday = StreakService::new(Arc::clone(&store), clock_at(day(2024, 3, 9)));
        assert!(!saturday.can_use_freeze());

        let sunday = StreakService::new(Arc::clone(&store), clock_at(day(2024, 3, 10)));
        assert!(sunday.can_use_freeze());
        assert!(sunday.use_freeze());
        assert_eq!(sunday.freezes_used(), 2);
    }

    #[test]
    fn history_feeds_the_month_calendar() {
        let store = shared_store();
        StreakService::new(Arc::clone(&store), clock_at(day(2024, 2, 29))).record_activity();
        StreakService::new(Arc::clone(&store), clock_at(day(2024, 3, 1))).record_activity();
        let service = StreakService::new(store, clock_at(day(2024, 3, 2)));
        service.record_activity();

        assert_eq!(service.activity_for_month(2024, 3), vec![day(2024, 3, 1), day(2024, 3, 2)]);
        assert_eq!(service.activity_for_month(2024, 2), vec![day(2024, 2, 29)]);
        assert_eq!(service.activity_history().len(), 3);
        assert_eq!(service.current_streak(), 3);
    }

    #[test]
    fn corrupt_record_starts_fresh() {
        let store = shared_store();
        store.set(STREAKS_KEY, "{]").unwrap();

        let service = StreakService::new(store, clock_at(day(2024, 3, 4)));
        assert_eq!(service.current_streak(), 0);
        assert_eq!(service.best_streak(), 0);
    }

    #[test]
    fn failing_store_still_counts_in_memory() {
        let service = StreakService::new(Arc::new(FailingStore), clock_at(day(2024, 3, 4)));
        assert!(service.record_activity());
        assert_eq!(service.current_streak(), 1);
    }

    #[test]
    fn reset_clears_streak_state() {
        let store = shared_store();
        let service = StreakService::new(Arc::clone(&store), clock_at(day(2024, 3, 4)));
        service.record_activity();
        service.use_freeze();

        service.reset();
        assert_eq!(service.current_streak(), 0);
        assert_eq!(service.freezes_used(), 0);

        let reloaded = StreakService::new(store, clock_at(day(2024, 3, 4)));
        assert_eq!(reloaded.best_streak(), 0);
        assert!(reloaded.activity_history().is_empty());
    }
}
