use serde::{Deserialize, Serialize};
use std::fmt;

/// Composite key addressing one topic: `"{certification}-{category}-{topic}"`.
///
/// This string form is the primary key for progress and favorite tracking.
/// Source ids must not themselves contain `-` or composed keys can collide.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicKey(String);

impl TopicKey {
    /// Wraps an already-composed key string.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Composes a key from its three parts.
    #[must_use]
    pub fn compose(certification_id: &str, category_id: &str, topic_id: &str) -> Self {
        Self(format!("{certification_id}-{category_id}-{topic_id}"))
    }

    /// Prefix matching every key under a certification.
    #[must_use]
    pub fn certification_prefix(certification_id: &str) -> String {
        format!("{certification_id}-")
    }

    /// Prefix matching every key under a category.
    #[must_use]
    pub fn category_prefix(certification_id: &str, category_id: &str) -> String {
        format!("{certification_id}-{category_id}-")
    }

    /// Returns the composed string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TopicKey {
    fn from(raw: &str) -> Self {
        Self(raw.to_owned())
    }
}

impl From<String> for TopicKey {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

/// Globally-unique exam question id: `"{category}-{topic}-{question}"`.
///
/// Composing keeps question ids from different topics apart once they are
/// pooled into one exam. Same `-` caveat as `TopicKey`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExamQuestionId(String);

impl ExamQuestionId {
    /// Composes an id from a question's origin and its file-local id.
    #[must_use]
    pub fn compose(category_id: &str, topic_id: &str, question_id: u32) -> Self {
        Self(format!("{category_id}-{topic_id}-{question_id}"))
    }

    /// Returns the composed string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for TopicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TopicKey({})", self.0)
    }
}

impl fmt::Debug for ExamQuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExamQuestionId({})", self.0)
    }
}

//
// ─── DISPLAY ───────────────────────────────────────────────────────────────────
//

impl fmt::Display for TopicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ExamQuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
