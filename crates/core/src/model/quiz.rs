use serde::{Deserialize, Serialize};

/// How a question expects its answer: exactly one option or several.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    SingleChoice,
    MultipleChoice,
}

/// One question from a topic's quiz file.
///
/// `correct_answers` holds option strings, not indices, so a shuffled option
/// order never affects scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    id: u32,
    question: String,
    #[serde(rename = "type")]
    kind: QuestionKind,
    options: Vec<String>,
    correct_answers: Vec<String>,
    explanation: String,
}

impl QuizQuestion {
    #[must_use]
    pub fn new(
        id: u32,
        question: impl Into<String>,
        kind: QuestionKind,
        options: Vec<String>,
        correct_answers: Vec<String>,
        explanation: impl Into<String>,
    ) -> Self {
        Self {
            id,
            question: question.into(),
            kind,
            options,
            correct_answers,
            explanation: explanation.into(),
        }
    }

    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[must_use]
    pub fn question(&self) -> &str {
        &self.question
    }

    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        self.kind
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_answers(&self) -> &[String] {
        &self.correct_answers
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    /// Exact set-equality between a selection and the correct answers.
    ///
    /// Order is irrelevant and there is no partial credit; an empty
    /// selection never matches.
    #[must_use]
    pub fn matches(&self, selection: &[String]) -> bool {
        selection.len() == self.correct_answers.len()
            && self
                .correct_answers
                .iter()
                .all(|answer| selection.contains(answer))
    }
}

/// A topic's quiz file: the wire shape published next to the markdown fiche.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizDoc {
    source_file: String,
    title: String,
    questions: Vec<QuizQuestion>,
}

impl QuizDoc {
    #[must_use]
    pub fn new(
        source_file: impl Into<String>,
        title: impl Into<String>,
        questions: Vec<QuizQuestion>,
    ) -> Self {
        Self {
            source_file: source_file.into(),
            title: title.into(),
            questions,
        }
    }

    #[must_use]
    pub fn source_file(&self) -> &str {
        &self.source_file
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    #[must_use]
    pub fn into_questions(self) -> Vec<QuizQuestion> {
        self.questions
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
