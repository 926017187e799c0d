mod catalog;
mod exam;
mod ids;
mod progress;
mod quiz;
mod streak;

pub use catalog::{Catalog, CatalogError, Category, Certification, FlatTopic, Topic};
pub use ids::{ExamQuestionId, TopicKey};

pub use exam::{
    DEFAULT_QUESTION_COUNT, DEFAULT_TIME_LIMIT_MIN, ExamConfig, ExamConfigError, ExamQuestion,
    ExamResult, MAX_QUESTION_COUNT, MAX_TIME_LIMIT_MIN, MIN_QUESTION_COUNT, MIN_TIME_LIMIT_MIN,
};
pub use progress::ProgressRecord;
pub use quiz::{QuestionKind, QuizDoc, QuizQuestion};
pub use streak::{ACTIVITY_HISTORY_LIMIT, StreakRecord};
