#![forbid(unsafe_code)]

//! Application services for the certification study companion: content
//! fetching, quiz and exam sessions, and the persisted progress, streak,
//! and exam history records.

pub mod app_services;
pub mod content;
pub mod error;
pub mod exam;
pub mod progress;
pub mod quiz;
pub mod streak;

pub use fiche_core::Clock;

pub use app_services::AppServices;
pub use content::{ContentFetcher, ContentService, HttpContentFetcher};
pub use error::{AppServicesError, ContentError, ExamError, QuizError};
pub use exam::{
    AssemblyProgress, EXAM_HISTORY_KEY, EXAM_HISTORY_LIMIT, ExamAssembler, ExamContext,
    ExamHistoryService, ExamPhase, ExamSession, SubmitSummary,
};
pub use progress::{PROGRESS_KEY, ProgressService};
pub use quiz::{AnsweredQuestion, QuizItem, QuizOutcome, QuizSession, QuizStep};
pub use streak::{STREAKS_KEY, StreakService};
