use rand::Rng;
use rand::rng;
use rand::seq::SliceRandom;
use std::collections::HashMap;

use fiche_core::model::{QuestionKind, QuizDoc, QuizQuestion};

use crate::error::QuizError;

//
// ─── SHUFFLED QUESTION ─────────────────────────────────────────────────────────
//

/// A question paired with its per-session option order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizItem {
    question: QuizQuestion,
    options: Vec<String>,
}

impl QuizItem {
    #[must_use]
    pub fn question(&self) -> &QuizQuestion {
        &self.question
    }

    /// Options in the order this session presents them.
    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }
}

/// A graded answer to one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnsweredQuestion {
    selected: Vec<String>,
    correct: bool,
}

impl AnsweredQuestion {
    #[must_use]
    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.correct
    }
}

/// Final tally of a finished quiz run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizOutcome {
    correct: u32,
    total: u32,
}

impl QuizOutcome {
    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    /// Rounded integer percentage of correct answers.
    #[must_use]
    pub fn score_percent(&self) -> u32 {
        if self.total == 0 {
            0
        } else {
            (self.correct * 100 + self.total / 2) / self.total
        }
    }
}

/// What happened after moving past a graded answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizStep {
    Next,
    Finished(QuizOutcome),
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-memory run of one topic quiz.
///
/// Steps through the questions one at a time: select, submit for grading,
/// advance. Question order and each question's option order are shuffled once
/// at build time; `reset` replays that same order.
pub struct QuizSession {
    title: String,
    items: Vec<QuizItem>,
    current: usize,
    selected: Vec<String>,
    submitted: bool,
    answered: HashMap<usize, AnsweredQuestion>,
    outcome: Option<QuizOutcome>,
}

impl QuizSession {
    /// Build a session from a quiz document. Returns `None` for a quiz with
    /// no questions.
    #[must_use]
    pub fn build(doc: QuizDoc) -> Option<Self> {
        let mut rng = rng();
        Self::build_with_rng(doc, &mut rng)
    }

    /// Build with a caller-provided rng, for deterministic shuffles in tests.
    #[must_use]
    pub fn build_with_rng<R: Rng + ?Sized>(doc: QuizDoc, rng: &mut R) -> Option<Self> {
        let title = doc.title().to_owned();
        let mut questions = doc.into_questions();
        if questions.is_empty() {
            return None;
        }

        questions.shuffle(rng);
        let items = questions
            .into_iter()
            .map(|question| {
                let mut options = question.options().to_vec();
                options.shuffle(rng);
                QuizItem { question, options }
            })
            .collect();

        Some(Self {
            title,
            items,
            current: 0,
            selected: Vec::new(),
            submitted: false,
            answered: HashMap::new(),
            outcome: None,
        })
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_item(&self) -> &QuizItem {
        &self.items[self.current]
    }

    #[must_use]
    pub fn is_last_question(&self) -> bool {
        self.current + 1 == self.items.len()
    }

    /// Options picked for the current question so far.
    #[must_use]
    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    #[must_use]
    pub fn has_submitted(&self) -> bool {
        self.submitted
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answered.len()
    }

    /// The graded answer for a question index, if it was submitted.
    #[must_use]
    pub fn answer_for(&self, index: usize) -> Option<&AnsweredQuestion> {
        self.answered.get(&index)
    }

    /// Set once the last answer has been advanced past.
    #[must_use]
    pub fn outcome(&self) -> Option<QuizOutcome> {
        self.outcome
    }

    /// Select or toggle an option for the current question.
    ///
    /// Single-choice questions replace the selection, multiple-choice
    /// questions toggle membership. Ignored once the answer is submitted.
    pub fn select_option(&mut self, option: &str) {
        if self.submitted {
            return;
        }

        match self.items[self.current].question.kind() {
            QuestionKind::SingleChoice => {
                self.selected = vec![option.to_owned()];
            }
            QuestionKind::MultipleChoice => {
                if let Some(pos) = self.selected.iter().position(|o| o == option) {
                    self.selected.remove(pos);
                } else {
                    self.selected.push(option.to_owned());
                }
            }
        }
    }

    /// Grade the current selection and lock it in.
    ///
    /// Returns whether the selection was correct.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NothingSelected` when nothing is picked and
    /// `QuizError::AlreadySubmitted` when the answer was already graded.
    pub fn submit(&mut self) -> Result<bool, QuizError> {
        if self.submitted {
            return Err(QuizError::AlreadySubmitted);
        }
        if self.selected.is_empty() {
            return Err(QuizError::NothingSelected);
        }

        let correct = self.items[self.current].question.matches(&self.selected);
        self.answered.insert(
            self.current,
            AnsweredQuestion {
                selected: self.selected.clone(),
                correct,
            },
        );
        self.submitted = true;
        Ok(correct)
    }

    /// Move past a graded answer: to the next question, or to the final
    /// outcome after the last one.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotSubmitted` if the current answer has not been
    /// graded yet.
    pub fn advance(&mut self) -> Result<QuizStep, QuizError> {
        if let Some(outcome) = self.outcome {
            return Ok(QuizStep::Finished(outcome));
        }
        if !self.submitted {
            return Err(QuizError::NotSubmitted);
        }

        if self.current + 1 < self.items.len() {
            self.current += 1;
            self.selected.clear();
            self.submitted = false;
            return Ok(QuizStep::Next);
        }

        let correct = self.answered.values().filter(|a| a.correct).count();
        let outcome = QuizOutcome {
            correct: u32::try_from(correct).unwrap_or(u32::MAX),
            total: u32::try_from(self.items.len()).unwrap_or(u32::MAX),
        };
        self.outcome = Some(outcome);
        Ok(QuizStep::Finished(outcome))
    }

    /// Restart from the first question, keeping the shuffled order.
    pub fn reset(&mut self) {
        self.current = 0;
        self.selected.clear();
        self.submitted = false;
        self.answered.clear();
        self.outcome = None;
    }
}
