use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Activity history keeps at most this many distinct days.
pub const ACTIVITY_HISTORY_LIMIT: usize = 90;

/// Day-streak bookkeeping over local calendar dates.
///
/// Every method takes `today` explicitly; callers derive it from the clock so
/// tests can walk through simulated days. "Yesterday" is always pure calendar
/// subtraction, never 24-hour instant arithmetic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StreakRecord {
    current_streak: u32,
    best_streak: u32,
    last_activity_date: Option<NaiveDate>,
    freezes_used: u32,
    last_freeze_week: Option<String>,
    activity_history: Vec<NaiveDate>,
}

impl StreakRecord {
    #[must_use]
    pub fn current_streak(&self) -> u32 {
        self.current_streak
    }

    #[must_use]
    pub fn best_streak(&self) -> u32 {
        self.best_streak
    }

    #[must_use]
    pub fn last_activity_date(&self) -> Option<NaiveDate> {
        self.last_activity_date
    }

    #[must_use]
    pub fn freezes_used(&self) -> u32 {
        self.freezes_used
    }

    #[must_use]
    pub fn last_freeze_week(&self) -> Option<&str> {
        self.last_freeze_week.as_deref()
    }

    /// Recorded activity dates, oldest first, capped at
    /// `ACTIVITY_HISTORY_LIMIT`.
    #[must_use]
    pub fn activity_history(&self) -> &[NaiveDate] {
        &self.activity_history
    }

    /// Applies the day-boundary check that runs once per service start.
    ///
    /// A streak whose last activity is neither today nor yesterday is broken;
    /// the counter resets to 0 unless this week's freeze is still available.
    /// Best streak and history are never touched here, and the freeze is not
    /// consumed by merely protecting.
    ///
    /// Returns true if the streak was reset.
    pub fn reconcile(&mut self, today: NaiveDate) -> bool {
        let Some(last) = self.last_activity_date else {
            return false;
        };
        if last == today || Some(last) == today.pred_opt() {
            return false;
        }
        if self.current_streak == 0 {
            return false;
        }
        if self.can_use_freeze(today) {
            return false;
        }

        self.current_streak = 0;
        true
    }

    /// Records study activity for `today`.
    ///
    /// Idempotent per day. A consecutive day extends the streak, any other
    /// gap restarts it at 1. History keeps the most recent
    /// `ACTIVITY_HISTORY_LIMIT` days.
    ///
    /// Returns false if today was already recorded.
    pub fn record_activity(&mut self, today: NaiveDate) -> bool {
        if self.last_activity_date == Some(today) {
            return false;
        }

        let yesterday = today.pred_opt();
        self.current_streak = match (self.last_activity_date, yesterday) {
            (Some(last), Some(y)) if last == y => self.current_streak + 1,
            _ => 1,
        };
        self.best_streak = self.best_streak.max(self.current_streak);
        self.last_activity_date = Some(today);

        if !self.activity_history.contains(&today) {
            self.activity_history.push(today);
        }
        if self.activity_history.len() > ACTIVITY_HISTORY_LIMIT {
            let excess = self.activity_history.len() - ACTIVITY_HISTORY_LIMIT;
            self.activity_history.drain(..excess);
        }
        true
    }

    /// Consumes the weekly freeze for `today`'s week.
    ///
    /// Returns false (and changes nothing) if this week's freeze was already
    /// spent. Consuming a freeze never retroactively repairs a streak count
    /// that was reset earlier.
    pub fn use_freeze(&mut self, today: NaiveDate) -> bool {
        let week = week_tag(today);
        if self.last_freeze_week.as_deref() == Some(week.as_str()) {
            return false;
        }

        self.freezes_used += 1;
        self.last_freeze_week = Some(week);
        true
    }

    /// True while this week's freeze has not been spent.
    #[must_use]
    pub fn can_use_freeze(&self, today: NaiveDate) -> bool {
        self.last_freeze_week.as_deref() != Some(week_tag(today).as_str())
    }

    /// True if activity was recorded on the given day.
    #[must_use]
    pub fn is_active_on(&self, today: NaiveDate) -> bool {
        self.last_activity_date == Some(today)
    }

    /// Recorded activity dates within the given month (1-based).
    #[must_use]
    pub fn activity_for_month(&self, year: i32, month: u32) -> Vec<NaiveDate> {
        self.activity_history
            .iter()
            .copied()
            .filter(|date| date.year() == year && date.month() == month)
            .collect()
    }

    /// Restores the empty record.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Week label `"{year}-W{week}"` used to meter freezes.
///
/// Weeks are counted from January 1st with Sunday starts, so the first
/// (possibly partial) week of a year is week 1.
fn week_tag(date: NaiveDate) -> String {
    let jan1_weekday = (i64::from(date.weekday().num_days_from_sunday())
        - i64::from(date.ordinal() - 1))
    .rem_euclid(7);
    let week = ((i64::from(date.ordinal()) + jan1_weekday) as u64).div_ceil(7);
    format!("{}-W{week}", date.year())
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn day(year: i32, month: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, d).unwrap()
    }

    #[test]
    fn consecutive_days_extend_the_streak() {
        let mut record = StreakRecord::default();
        let start = day(2024, 3, 4);

        assert!(record.record_activity(start));
        assert!(record.record_activity(start.succ_opt().unwrap()));
        assert!(record.record_activity(day(2024, 3, 6)));

        assert_eq!(record.current_streak(), 3);
        assert_eq!(record.best_streak(), 3);
        assert_eq!(record.last_activity_date(), Some(day(2024, 3, 6)));
    }

    #[test]
    fn recording_twice_on_one_day_is_idempotent() {
        let mut record = StreakRecord::default();
        let today = day(2024, 3, 4);

        assert!(record.record_activity(today));
        assert!(!record.record_activity(today));

        assert_eq!(record.current_streak(), 1);
        assert_eq!(record.activity_history().len(), 1);
    }

    #[test]
    fn gap_restarts_streak_at_one() {
        let mut record = StreakRecord::default();
        record.record_activity(day(2024, 3, 4));
        record.record_activity(day(2024, 3, 5));

        record.record_activity(day(2024, 3, 8));

        assert_eq!(record.current_streak(), 1);
        assert_eq!(record.best_streak(), 2);
    }

    #[test]
    fn best_streak_never_decreases() {
        let mut record = StreakRecord::default();
        let days = [
            day(2024, 3, 4),
            day(2024, 3, 5),
            day(2024, 3, 6),
            day(2024, 3, 10),
            day(2024, 3, 11),
        ];

        let mut previous_best = 0;
        for d in days {
            record.record_activity(d);
            assert!(record.best_streak() >= previous_best);
            assert!(record.best_streak() >= record.current_streak());
            previous_best = record.best_streak();
        }
        assert_eq!(record.best_streak(), 3);
        assert_eq!(record.current_streak(), 2);
    }

    #[test]
    fn history_keeps_the_ninety_most_recent_days() {
        let mut record = StreakRecord::default();
        let start = day(2024, 1, 1);

        let mut current = start;
        for _ in 0..100 {
            record.record_activity(current);
            current = current.succ_opt().unwrap();
        }

        assert_eq!(record.activity_history().len(), ACTIVITY_HISTORY_LIMIT);
        assert_eq!(record.activity_history()[0], day(2024, 1, 11));
        assert_eq!(record.activity_history()[89], day(2024, 4, 9));
        assert_eq!(record.current_streak(), 100);
    }

    #[test]
    fn reconcile_keeps_streak_for_today_and_yesterday() {
        let mut record = StreakRecord::default();
        record.record_activity(day(2024, 3, 4));

        assert!(!record.reconcile(day(2024, 3, 4)));
        assert!(!record.reconcile(day(2024, 3, 5)));
        assert_eq!(record.current_streak(), 1);
    }

    #[test]
    fn reconcile_spares_broken_streak_while_freeze_is_available() {
        let mut record = StreakRecord::default();
        record.record_activity(day(2024, 3, 4));

        assert!(!record.reconcile(day(2024, 3, 8)));
        assert_eq!(record.current_streak(), 1);
        assert_eq!(record.freezes_used(), 0);
    }

    #[test]
    fn reconcile_resets_broken_streak_once_freeze_is_spent() {
        let mut record = StreakRecord::default();
        record.record_activity(day(2024, 3, 4));
        record.record_activity(day(2024, 3, 5));

        assert!(record.use_freeze(day(2024, 3, 8)));
        assert!(record.reconcile(day(2024, 3, 8)));

        assert_eq!(record.current_streak(), 0);
        assert_eq!(record.best_streak(), 2);
        assert_eq!(record.activity_history().len(), 2);
    }

    #[test]
    fn reconcile_without_history_is_a_noop() {
        let mut record = StreakRecord::default();
        assert!(!record.reconcile(day(2024, 3, 4)));
        assert_eq!(record, StreakRecord::default());
    }

    #[test]
    fn freeze_is_limited_to_once_per_week() {
        let mut record = StreakRecord::default();

        // 2024-01-07 is a Sunday, 2024-01-08 the following Monday.
        assert!(record.can_use_freeze(day(2024, 1, 7)));
        assert!(record.use_freeze(day(2024, 1, 7)));
        assert!(!record.can_use_freeze(day(2024, 1, 8)));
        assert!(!record.use_freeze(day(2024, 1, 8)));
        assert_eq!(record.freezes_used(), 1);

        // Next Sunday starts a new week.
        assert!(record.can_use_freeze(day(2024, 1, 14)));
        assert!(record.use_freeze(day(2024, 1, 14)));
        assert_eq!(record.freezes_used(), 2);
    }

    #[test]
    fn weeks_split_between_saturday_and_sunday() {
        let mut record = StreakRecord::default();
        record.use_freeze(day(2024, 1, 6));

        // Saturday and the next Sunday fall in different weeks.
        assert!(record.can_use_freeze(day(2024, 1, 7)));
        assert_eq!(record.last_freeze_week(), Some("2024-W1"));
    }

    #[test]
    fn activity_for_month_filters_by_year_and_month() {
        let mut record = StreakRecord::default();
        record.record_activity(day(2024, 1, 30));
        record.record_activity(day(2024, 1, 31));
        record.record_activity(day(2024, 2, 1));

        let january = record.activity_for_month(2024, 1);
        assert_eq!(january, vec![day(2024, 1, 30), day(2024, 1, 31)]);
        assert_eq!(record.activity_for_month(2024, 3), Vec::<NaiveDate>::new());
        assert_eq!(record.activity_for_month(2023, 1), Vec::<NaiveDate>::new());
    }

    #[test]
    fn is_active_on_tracks_last_activity() {
        let mut record = StreakRecord::default();
        assert!(!record.is_active_on(day(2024, 3, 4)));

        record.record_activity(day(2024, 3, 4));
        assert!(record.is_active_on(day(2024, 3, 4)));
        assert!(!record.is_active_on(day(2024, 3, 5)));
    }

    #[test]
    fn clear_restores_empty_record() {
        let mut record = StreakRecord::default();
        record.record_activity(day(2024, 3, 4));
        record.use_freeze(day(2024, 3, 4));

        record.clear();
        assert_eq!(record, StreakRecord::default());
    }

    #[test]
    fn empty_json_parses_to_default() {
        let record: StreakRecord = serde_json::from_str("{}").unwrap();
        assert_eq!(record, StreakRecord::default());
    }

    #[test]
    fn round_trips_dates_as_plain_strings() {
        let mut record = StreakRecord::default();
        record.record_activity(day(2024, 3, 4));
        record.use_freeze(day(2024, 3, 4));

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"2024-03-04\""));
        assert!(json.contains("lastActivityDate"));

        let back: StreakRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
