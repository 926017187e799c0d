use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use fiche_core::model::{ExamConfig, ExamQuestion, ExamQuestionId, ExamResult, QuestionKind};

use crate::error::ExamError;

//
// ─── CONTEXT ───────────────────────────────────────────────────────────────────
//

/// What an exam run was configured against.
#[derive(Debug, Clone)]
pub struct ExamContext {
    certification_id: String,
    config: ExamConfig,
}

impl ExamContext {
    #[must_use]
    pub fn new(certification_id: impl Into<String>, config: ExamConfig) -> Self {
        Self {
            certification_id: certification_id.into(),
            config,
        }
    }

    #[must_use]
    pub fn certification_id(&self) -> &str {
        &self.certification_id
    }

    #[must_use]
    pub fn config(&self) -> &ExamConfig {
        &self.config
    }
}

/// Lifecycle of an exam run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExamPhase {
    InProgress,
    Submitted,
}

/// Counts shown before confirming submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitSummary {
    pub unanswered: usize,
    pub flagged: usize,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// A timed exam run over an assembled question set.
///
/// Navigation is free and nothing is graded per question; the whole answer
/// map is scored once at submission. The caller advances the countdown
/// through `tick`, once per elapsed second, and the session auto-submits
/// when it hits zero.
#[derive(Debug)]
pub struct ExamSession {
    context: ExamContext,
    questions: Vec<ExamQuestion>,
    current: usize,
    answers: HashMap<ExamQuestionId, Vec<String>>,
    flagged: HashSet<ExamQuestionId>,
    time_limit_secs: u32,
    remaining_secs: u32,
    phase: ExamPhase,
}

impl ExamSession {
    /// Create a session over a drawn question set.
    ///
    /// # Errors
    ///
    /// Returns `ExamError::EmptyPool` if no questions are provided.
    pub fn new(context: ExamContext, questions: Vec<ExamQuestion>) -> Result<Self, ExamError> {
        if questions.is_empty() {
            return Err(ExamError::EmptyPool);
        }

        let time_limit_secs = context.config().time_limit_secs();
        Ok(Self {
            context,
            questions,
            current: 0,
            answers: HashMap::new(),
            flagged: HashSet::new(),
            time_limit_secs,
            remaining_secs: time_limit_secs,
            phase: ExamPhase::InProgress,
        })
    }

    #[must_use]
    pub fn context(&self) -> &ExamContext {
        &self.context
    }

    #[must_use]
    pub fn questions(&self) -> &[ExamQuestion] {
        &self.questions
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> &ExamQuestion {
        &self.questions[self.current]
    }

    #[must_use]
    pub fn phase(&self) -> ExamPhase {
        self.phase
    }

    #[must_use]
    pub fn time_limit_secs(&self) -> u32 {
        self.time_limit_secs
    }

    #[must_use]
    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    /// Questions with at least one selected option.
    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.values().filter(|a| !a.is_empty()).count()
    }

    /// The selection recorded for a question, empty if untouched.
    #[must_use]
    pub fn selected_answers(&self, id: &ExamQuestionId) -> &[String] {
        self.answers.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    #[must_use]
    pub fn is_flagged(&self, id: &ExamQuestionId) -> bool {
        self.flagged.contains(id)
    }

    #[must_use]
    pub fn flagged_count(&self) -> usize {
        self.flagged.len()
    }

    /// Move to the next question, stopping at the last one.
    pub fn next(&mut self) {
        if self.current + 1 < self.questions.len() {
            self.current += 1;
        }
    }

    /// Move to the previous question, stopping at the first one.
    pub fn prev(&mut self) {
        self.current = self.current.saturating_sub(1);
    }

    /// Jump to a question by index.
    ///
    /// # Errors
    ///
    /// Returns `ExamError::OutOfRange` for an index past the question set.
    pub fn goto(&mut self, index: usize) -> Result<(), ExamError> {
        if index >= self.questions.len() {
            return Err(ExamError::OutOfRange(index));
        }
        self.current = index;
        Ok(())
    }

    /// Select or toggle an option on the current question.
    ///
    /// Single-choice questions replace the selection, multiple-choice
    /// questions toggle membership. Ignored after submission.
    pub fn record_answer(&mut self, option: &str) {
        if self.phase == ExamPhase::Submitted {
            return;
        }

        let question = &self.questions[self.current];
        let entry = self.answers.entry(question.id().clone()).or_default();
        match question.question().kind() {
            QuestionKind::SingleChoice => {
                *entry = vec![option.to_owned()];
            }
            QuestionKind::MultipleChoice => {
                if let Some(pos) = entry.iter().position(|o| o == option) {
                    entry.remove(pos);
                } else {
                    entry.push(option.to_owned());
                }
            }
        }
    }

    /// Flip the review flag on the current question. Returns the new state.
    pub fn toggle_flag(&mut self) -> bool {
        let id = self.questions[self.current].id().clone();
        if self.phase == ExamPhase::Submitted {
            return self.flagged.contains(&id);
        }

        if self.flagged.remove(&id) {
            false
        } else {
            self.flagged.insert(id);
            true
        }
    }

    /// Unanswered and flagged counts shown before confirming submission.
    ///
    /// A selection toggled back down to nothing counts as unanswered.
    #[must_use]
    pub fn submit_summary(&self) -> SubmitSummary {
        SubmitSummary {
            unanswered: self
                .questions
                .iter()
                .filter(|q| self.selected_answers(q.id()).is_empty())
                .count(),
            flagged: self.flagged.len(),
        }
    }

    /// Advance the countdown by one second.
    ///
    /// Returns the result when time runs out, which auto-submits with the
    /// full limit recorded as time used. Does nothing after submission.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<ExamResult> {
        if self.phase == ExamPhase::Submitted || self.remaining_secs == 0 {
            return None;
        }

        self.remaining_secs -= 1;
        if self.remaining_secs == 0 {
            return self.submit(now).ok();
        }
        None
    }

    /// Grade the whole answer map and close the session.
    ///
    /// # Errors
    ///
    /// Returns `ExamError::AlreadySubmitted` on a second call.
    pub fn submit(&mut self, now: DateTime<Utc>) -> Result<ExamResult, ExamError> {
        if self.phase == ExamPhase::Submitted {
            return Err(ExamError::AlreadySubmitted);
        }
        self.phase = ExamPhase::Submitted;

        let correct = self
            .questions
            .iter()
            .filter(|q| q.question().matches(self.selected_answers(q.id())))
            .count();
        let time_used = self.time_limit_secs - self.remaining_secs;

        Ok(ExamResult::new(
            self.context.certification_id(),
            self.context.config(),
            time_used,
            u32::try_from(correct).unwrap_or(u32::MAX),
            u32::try_from(self.questions.len()).unwrap_or(u32::MAX),
            now,
        ))
    }
}
