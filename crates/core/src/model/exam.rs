use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::model::ids::ExamQuestionId;
use crate::model::quiz::QuizQuestion;

/// Bounds and defaults for exam configuration.
pub const MIN_QUESTION_COUNT: u32 = 10;
pub const MAX_QUESTION_COUNT: u32 = 75;
pub const DEFAULT_QUESTION_COUNT: u32 = 20;
pub const MIN_TIME_LIMIT_MIN: u32 = 10;
pub const MAX_TIME_LIMIT_MIN: u32 = 90;
pub const DEFAULT_TIME_LIMIT_MIN: u32 = 30;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExamConfigError {
    #[error("question count must be between 10 and 75")]
    InvalidQuestionCount,

    #[error("time limit must be between 10 and 90 minutes")]
    InvalidTimeLimit,

    #[error("at least one category must be selected")]
    NoCategories,
}

//
// ─── CONFIGURATION ─────────────────────────────────────────────────────────────
//

/// Exam parameters chosen before assembly. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamConfig {
    question_count: u32,
    time_limit_min: u32,
    categories: Vec<String>,
}

impl ExamConfig {
    /// Creates a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns `ExamConfigError` if a bound is violated or no category is
    /// selected.
    pub fn new(
        question_count: u32,
        time_limit_min: u32,
        categories: Vec<String>,
    ) -> Result<Self, ExamConfigError> {
        if !(MIN_QUESTION_COUNT..=MAX_QUESTION_COUNT).contains(&question_count) {
            return Err(ExamConfigError::InvalidQuestionCount);
        }
        if !(MIN_TIME_LIMIT_MIN..=MAX_TIME_LIMIT_MIN).contains(&time_limit_min) {
            return Err(ExamConfigError::InvalidTimeLimit);
        }
        if categories.is_empty() {
            return Err(ExamConfigError::NoCategories);
        }

        Ok(Self {
            question_count,
            time_limit_min,
            categories,
        })
    }

    /// Default question count and time limit over the given categories.
    ///
    /// # Errors
    ///
    /// Returns `ExamConfigError::NoCategories` if `categories` is empty.
    pub fn with_defaults(categories: Vec<String>) -> Result<Self, ExamConfigError> {
        Self::new(DEFAULT_QUESTION_COUNT, DEFAULT_TIME_LIMIT_MIN, categories)
    }

    #[must_use]
    pub fn question_count(&self) -> u32 {
        self.question_count
    }

    #[must_use]
    pub fn time_limit_min(&self) -> u32 {
        self.time_limit_min
    }

    /// Countdown start value for a run of this exam.
    #[must_use]
    pub fn time_limit_secs(&self) -> u32 {
        self.time_limit_min * 60
    }

    #[must_use]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }
}

//
// ─── POOLED QUESTION ───────────────────────────────────────────────────────────
//

/// A quiz question tagged with its origin, as pooled into an exam.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamQuestion {
    id: ExamQuestionId,
    topic_id: String,
    topic_title: String,
    category_title: String,
    question: QuizQuestion,
}

impl ExamQuestion {
    #[must_use]
    pub fn new(
        id: ExamQuestionId,
        topic_id: impl Into<String>,
        topic_title: impl Into<String>,
        category_title: impl Into<String>,
        question: QuizQuestion,
    ) -> Self {
        Self {
            id,
            topic_id: topic_id.into(),
            topic_title: topic_title.into(),
            category_title: category_title.into(),
            question,
        }
    }

    #[must_use]
    pub fn id(&self) -> &ExamQuestionId {
        &self.id
    }

    #[must_use]
    pub fn topic_id(&self) -> &str {
        &self.topic_id
    }

    #[must_use]
    pub fn topic_title(&self) -> &str {
        &self.topic_title
    }

    #[must_use]
    pub fn category_title(&self) -> &str {
        &self.category_title
    }

    #[must_use]
    pub fn question(&self) -> &QuizQuestion {
        &self.question
    }
}

//
// ─── RESULT ────────────────────────────────────────────────────────────────────
//

/// Outcome of one finished exam, as stored in the history log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamResult {
    id: Uuid,
    date: DateTime<Utc>,
    certification_id: String,
    categories: Vec<String>,
    questions_count: u32,
    time_limit: u32,
    time_used: u32,
    correct_answers: u32,
    total_questions: u32,
    score: u32,
}

impl ExamResult {
    /// Builds a result from a finished session's numbers.
    ///
    /// `total_questions` is the actual session size, which can run below the
    /// configured count when the pool was small; it is also the score
    /// divisor. `score` is the rounded integer percentage.
    #[must_use]
    pub fn new(
        certification_id: impl Into<String>,
        config: &ExamConfig,
        time_used: u32,
        correct_answers: u32,
        total_questions: u32,
        date: DateTime<Utc>,
    ) -> Self {
        let score = if total_questions == 0 {
            0
        } else {
            (correct_answers * 100 + total_questions / 2) / total_questions
        };

        Self {
            id: Uuid::new_v4(),
            date,
            certification_id: certification_id.into(),
            categories: config.categories().to_vec(),
            questions_count: config.question_count(),
            time_limit: config.time_limit_min(),
            time_used,
            correct_answers,
            total_questions,
            score,
        }
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    #[must_use]
    pub fn certification_id(&self) -> &str {
        &self.certification_id
    }

    #[must_use]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Question count the user asked for.
    #[must_use]
    pub fn questions_count(&self) -> u32 {
        self.questions_count
    }

    /// Time limit in minutes.
    #[must_use]
    pub fn time_limit(&self) -> u32 {
        self.time_limit
    }

    /// Seconds elapsed between start and submission.
    #[must_use]
    pub fn time_used(&self) -> u32 {
        self.time_used
    }

    #[must_use]
    pub fn correct_answers(&self) -> u32 {
        self.correct_answers
    }

    /// Questions actually present in the session.
    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    /// Rounded integer percentage of correct answers.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
