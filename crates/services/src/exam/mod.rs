mod assembler;
mod history;
mod session;

// Public API of the exam subsystem.
pub use crate::error::ExamError;
pub use assembler::{AssemblyProgress, ExamAssembler};
pub use history::{EXAM_HISTORY_KEY, EXAM_HISTORY_LIMIT, ExamHistoryService};
pub use session::{ExamContext, ExamPhase, ExamSession, SubmitSummary};
