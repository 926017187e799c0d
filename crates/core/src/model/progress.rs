use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::model::ids::TopicKey;

/// Per-user study progress: completed and favorite topic sets plus the last
/// visited topic.
///
/// Stored as one JSON record. Missing fields fall back to empty so older or
/// hand-edited records still load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgressRecord {
    completed: BTreeSet<TopicKey>,
    favorites: BTreeSet<TopicKey>,
    last_visited: Option<TopicKey>,
}

impl ProgressRecord {
    /// Flips completion for a topic, returning the new membership.
    pub fn toggle_completed(&mut self, key: TopicKey) -> bool {
        if self.completed.remove(&key) {
            false
        } else {
            self.completed.insert(key);
            true
        }
    }

    /// Flips favorite status for a topic, returning the new membership.
    pub fn toggle_favorite(&mut self, key: TopicKey) -> bool {
        if self.favorites.remove(&key) {
            false
        } else {
            self.favorites.insert(key);
            true
        }
    }

    /// Unconditionally overwrites the last visited topic.
    pub fn set_last_visited(&mut self, key: TopicKey) {
        self.last_visited = Some(key);
    }

    #[must_use]
    pub fn is_completed(&self, key: &TopicKey) -> bool {
        self.completed.contains(key)
    }

    #[must_use]
    pub fn is_favorite(&self, key: &TopicKey) -> bool {
        self.favorites.contains(key)
    }

    #[must_use]
    pub fn last_visited(&self) -> Option<&TopicKey> {
        self.last_visited.as_ref()
    }

    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    pub fn favorites(&self) -> impl Iterator<Item = &TopicKey> {
        self.favorites.iter()
    }

    /// Counts completed topics whose key begins with the given prefix.
    ///
    /// Works because topic keys embed certification and category ids in
    /// order; see `TopicKey::certification_prefix`.
    #[must_use]
    pub fn completed_with_prefix(&self, prefix: &str) -> usize {
        self.completed
            .iter()
            .filter(|key| key.as_str().starts_with(prefix))
            .count()
    }

    /// Drops every recorded completion, favorite, and visit.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn key(raw: &str) -> TopicKey {
        TopicKey::new(raw)
    }

    #[test]
    fn toggling_completed_twice_restores_membership() {
        let mut record = ProgressRecord::default();
        let k = key("symfony-basics-routing");

        assert!(record.toggle_completed(k.clone()));
        assert!(record.is_completed(&k));

        assert!(!record.toggle_completed(k.clone()));
        assert!(!record.is_completed(&k));
        assert_eq!(record.completed_count(), 0);
    }

    #[test]
    fn toggling_favorite_twice_restores_membership() {
        let mut record = ProgressRecord::default();
        let k = key("symfony-basics-routing");

        assert!(record.toggle_favorite(k.clone()));
        assert!(!record.toggle_favorite(k.clone()));
        assert!(!record.is_favorite(&k));
    }

    #[test]
    fn completed_and_favorites_are_independent_sets() {
        let mut record = ProgressRecord::default();
        let k = key("symfony-basics-routing");

        record.toggle_completed(k.clone());
        assert!(!record.is_favorite(&k));

        record.toggle_favorite(k.clone());
        record.toggle_completed(k.clone());
        assert!(record.is_favorite(&k));
        assert!(!record.is_completed(&k));
    }

    #[test]
    fn prefix_counting_scopes_by_certification_and_category() {
        let mut record = ProgressRecord::default();
        record.toggle_completed(key("symfony-basics-routing"));
        record.toggle_completed(key("symfony-basics-config"));
        record.toggle_completed(key("symfony-forms-types"));
        record.toggle_completed(key("php-basics-arrays"));

        assert_eq!(record.completed_with_prefix(&TopicKey::certification_prefix("symfony")), 3);
        assert_eq!(
            record.completed_with_prefix(&TopicKey::category_prefix("symfony", "basics")),
            2
        );
        assert_eq!(record.completed_with_prefix(&TopicKey::certification_prefix("php")), 1);
        assert_eq!(record.completed_with_prefix(&TopicKey::certification_prefix("aws")), 0);
    }

    #[test]
    fn last_visited_overwrites_unconditionally() {
        let mut record = ProgressRecord::default();
        assert_eq!(record.last_visited(), None);

        record.set_last_visited(key("a-b-c"));
        record.set_last_visited(key("a-b-d"));
        assert_eq!(record.last_visited(), Some(&key("a-b-d")));
    }

    #[test]
    fn clear_restores_empty_record() {
        let mut record = ProgressRecord::default();
        record.toggle_completed(key("a-b-c"));
        record.set_last_visited(key("a-b-c"));

        record.clear();
        assert_eq!(record, ProgressRecord::default());
    }

    #[test]
    fn empty_json_parses_to_default() {
        let record: ProgressRecord = serde_json::from_str("{}").unwrap();
        assert_eq!(record, ProgressRecord::default());
    }

    #[test]
    fn round_trips_through_json() {
        let mut record = ProgressRecord::default();
        record.toggle_completed(key("symfony-basics-routing"));
        record.toggle_favorite(key("symfony-forms-types"));
        record.set_last_visited(key("symfony-basics-routing"));

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("lastVisited"));

        let back: ProgressRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
