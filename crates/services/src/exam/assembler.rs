use std::sync::Arc;

use rand::Rng;
use rand::rng;
use rand::seq::SliceRandom;

use fiche_core::model::{Certification, ExamConfig, ExamQuestion, ExamQuestionId};

use super::session::{ExamContext, ExamSession};
use crate::content::ContentService;
use crate::error::ExamError;

/// Progress snapshot emitted after each topic scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssemblyProgress {
    pub topics_scanned: usize,
    pub topics_total: usize,
    pub questions_found: usize,
}

/// Builds exam pools by scanning every topic quiz in the selected categories.
///
/// Topics without a quiz file contribute nothing; the scan is sequential so
/// the caller gets a steady progress feed.
pub struct ExamAssembler {
    content: Arc<ContentService>,
}

impl ExamAssembler {
    #[must_use]
    pub fn new(content: Arc<ContentService>) -> Self {
        Self { content }
    }

    /// Collect the full question pool for the configured categories, tagged
    /// with topic context, in catalog order.
    ///
    /// # Errors
    ///
    /// Returns `ExamError::Catalog` for unknown category ids and
    /// `ExamError::EmptyPool` when no topic contributed a question.
    pub async fn collect_pool(
        &self,
        certification: &Certification,
        config: &ExamConfig,
        mut on_progress: impl FnMut(AssemblyProgress),
    ) -> Result<Vec<ExamQuestion>, ExamError> {
        let topics = certification.flatten_categories(config.categories())?;
        let topics_total = topics.len();

        let mut pool = Vec::new();
        for (index, topic) in topics.iter().enumerate() {
            if let Some(doc) = self.content.load_quiz(topic).await {
                for question in doc.into_questions() {
                    let id = ExamQuestionId::compose(
                        topic.category_id(),
                        topic.topic_id(),
                        question.id(),
                    );
                    pool.push(ExamQuestion::new(
                        id,
                        topic.topic_id(),
                        topic.topic_title(),
                        topic.category_title(),
                        question,
                    ));
                }
            }
            on_progress(AssemblyProgress {
                topics_scanned: index + 1,
                topics_total,
                questions_found: pool.len(),
            });
        }

        if pool.is_empty() {
            return Err(ExamError::EmptyPool);
        }
        Ok(pool)
    }

    /// Assemble a ready exam session: collect, shuffle, draw, arm the
    /// countdown.
    ///
    /// # Errors
    ///
    /// Returns `ExamError` as `collect_pool` does.
    pub async fn assemble(
        &self,
        certification: &Certification,
        config: &ExamConfig,
        on_progress: impl FnMut(AssemblyProgress),
    ) -> Result<ExamSession, ExamError> {
        let pool = self.collect_pool(certification, config, on_progress).await?;
        let mut rng = rng();
        draw_session(certification, config, pool, &mut rng)
    }

    /// Assemble with a caller-provided rng, for deterministic draws in tests.
    ///
    /// # Errors
    ///
    /// Returns `ExamError` as `collect_pool` does.
    pub async fn assemble_with_rng<R: Rng + ?Sized>(
        &self,
        certification: &Certification,
        config: &ExamConfig,
        on_progress: impl FnMut(AssemblyProgress),
        rng: &mut R,
    ) -> Result<ExamSession, ExamError> {
        let pool = self.collect_pool(certification, config, on_progress).await?;
        draw_session(certification, config, pool, rng)
    }
}

/// Shuffle the pool and keep a draw of at most the configured count. Option
/// order within each question is left as published.
fn draw_session<R: Rng + ?Sized>(
    certification: &Certification,
    config: &ExamConfig,
    mut pool: Vec<ExamQuestion>,
    rng: &mut R,
) -> Result<ExamSession, ExamError> {
    pool.shuffle(rng);
    pool.truncate(usize::try_from(config.question_count()).unwrap_or(usize::MAX));

    let context = ExamContext::new(certification.id(), config.clone());
    ExamSession::new(context, pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use reqwest::StatusCode;
    use std::collections::HashMap;

    use fiche_core::model::{Catalog, QuestionKind, QuizDoc, QuizQuestion};

    use crate::content::ContentFetcher;
    use crate::error::ContentError;

    struct MapFetcher(HashMap<String, String>);

    #[async_trait]
    impl ContentFetcher for MapFetcher {
        async fn fetch_text(&self, url: &str) -> Result<String, ContentError> {
            self.0
                .get(url)
                .cloned()
                .ok_or(ContentError::HttpStatus(StatusCode::NOT_FOUND))
        }
    }

    fn catalog() -> Catalog {
        serde_json::from_str(
            r#"{
              "certifications": [
                {
                  "id": "symfony",
                  "title": "Symfony 7",
                  "baseUrl": "https://fiches.example.com/",
                  "categories": [
                    {
                      "id": "basics",
                      "title": "Basics",
                      "folder": "01-basics",
                      "topics": [
                        { "id": "routing", "title": "Routing", "path": "routing.md" },
                        { "id": "config", "title": "Configuration", "path": "config.md" }
                      ]
                    },
                    {
                      "id": "forms",
                      "title": "Forms",
                      "folder": "02-forms",
                      "topics": [
                        { "id": "types", "title": "Form Types", "path": "types.md" }
                      ]
                    }
                  ]
                }
              ]
            }"#,
        )
        .unwrap()
    }

    fn quiz_json(title: &str, question_ids: &[u32]) -> String {
        let questions = question_ids
            .iter()
            .map(|id| {
                QuizQuestion::new(
                    *id,
                    format!("Q{id}"),
                    QuestionKind::SingleChoice,
                    vec!["A".into(), "B".into(), "C".into()],
                    vec!["A".into()],
                    "explanation",
                )
            })
            .collect();
        serde_json::to_string(&QuizDoc::new("source.md", title, questions)).unwrap()
    }

    fn assembler(quizzes: HashMap<String, String>) -> ExamAssembler {
        ExamAssembler::new(Arc::new(ContentService::new(Arc::new(MapFetcher(quizzes)))))
    }

    fn config(categories: &[&str]) -> ExamConfig {
        ExamConfig::new(10, 10, categories.iter().map(|s| (*s).to_owned()).collect()).unwrap()
    }

    #[tokio::test]
    async fn pool_tags_questions_with_their_origin() {
        let mut quizzes = HashMap::new();
        quizzes.insert(
            "https://fiches.example.com/01-basics/routing.md.json".to_owned(),
            quiz_json("Routing", &[1, 2]),
        );
        quizzes.insert(
            "https://fiches.example.com/02-forms/types.md.json".to_owned(),
            quiz_json("Form Types", &[1]),
        );

        let catalog = catalog();
        let certification = catalog.certification("symfony").unwrap();
        let mut seen = Vec::new();

        let pool = assembler(quizzes)
            .collect_pool(certification, &config(&["basics", "forms"]), |p| {
                seen.push(p);
            })
            .await
            .unwrap();

        let ids: Vec<&str> = pool.iter().map(|q| q.id().as_str()).collect();
        assert_eq!(ids, vec!["basics-routing-1", "basics-routing-2", "forms-types-1"]);
        assert_eq!(pool[0].category_title(), "Basics");
        assert_eq!(pool[2].topic_title(), "Form Types");

        assert_eq!(seen.len(), 3);
        assert_eq!(
            seen[2],
            AssemblyProgress {
                topics_scanned: 3,
                topics_total: 3,
                questions_found: 3
            }
        );
    }

    #[tokio::test]
    async fn topics_without_quizzes_contribute_nothing() {
        let mut quizzes = HashMap::new();
        quizzes.insert(
            "https://fiches.example.com/02-forms/types.md.json".to_owned(),
            quiz_json("Form Types", &[7]),
        );

        let catalog = catalog();
        let certification = catalog.certification("symfony").unwrap();

        let pool = assembler(quizzes)
            .collect_pool(certification, &config(&["basics", "forms"]), |_| {})
            .await
            .unwrap();

        assert_eq!(pool.len(), 1);
        assert_eq!(pool[0].id().as_str(), "forms-types-7");
    }

    #[tokio::test]
    async fn empty_pool_is_an_error() {
        let catalog = catalog();
        let certification = catalog.certification("symfony").unwrap();

        let err = assembler(HashMap::new())
            .collect_pool(certification, &config(&["basics"]), |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, ExamError::EmptyPool));
    }

    #[tokio::test]
    async fn unknown_category_is_rejected_before_any_fetch() {
        let catalog = catalog();
        let certification = catalog.certification("symfony").unwrap();

        let err = assembler(HashMap::new())
            .collect_pool(certification, &config(&["nope"]), |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, ExamError::Catalog(_)));
    }

    #[tokio::test]
    async fn draw_keeps_the_whole_pool_when_it_runs_short() {
        let mut quizzes = HashMap::new();
        quizzes.insert(
            "https://fiches.example.com/01-basics/routing.md.json".to_owned(),
            quiz_json("Routing", &[1, 2, 3]),
        );

        let catalog = catalog();
        let certification = catalog.certification("symfony").unwrap();
        let mut rng = StdRng::seed_from_u64(11);

        let session = assembler(quizzes)
            .assemble_with_rng(certification, &config(&["basics"]), |_| {}, &mut rng)
            .await
            .unwrap();

        // configured for 10 questions, only 3 exist
        assert_eq!(session.total_questions(), 3);
        assert_eq!(session.context().certification_id(), "symfony");
        assert_eq!(session.remaining_secs(), 600);
    }

    #[tokio::test]
    async fn draw_caps_at_the_configured_count() {
        let mut quizzes = HashMap::new();
        quizzes.insert(
            "https://fiches.example.com/01-basics/routing.md.json".to_owned(),
            quiz_json("Routing", &(1..=8).collect::<Vec<_>>()),
        );
        quizzes.insert(
            "https://fiches.example.com/01-basics/config.md.json".to_owned(),
            quiz_json("Configuration", &(1..=8).collect::<Vec<_>>()),
        );

        let catalog = catalog();
        let certification = catalog.certification("symfony").unwrap();
        let mut rng = StdRng::seed_from_u64(11);

        let session = assembler(quizzes)
            .assemble_with_rng(certification, &config(&["basics"]), |_| {}, &mut rng)
            .await
            .unwrap();

        assert_eq!(session.total_questions(), 10);
    }

    #[tokio::test]
    async fn draw_is_deterministic_for_one_seed() {
        let quizzes = || {
            let mut quizzes = HashMap::new();
            quizzes.insert(
                "https://fiches.example.com/01-basics/routing.md.json".to_owned(),
                quiz_json("Routing", &(1..=20).collect::<Vec<_>>()),
            );
            quizzes
        };

        let catalog = catalog();
        let certification = catalog.certification("symfony").unwrap();

        let mut ids = Vec::new();
        for _ in 0..2 {
            let mut rng = StdRng::seed_from_u64(42);
            let session = assembler(quizzes())
                .assemble_with_rng(certification, &config(&["basics"]), |_| {}, &mut rng)
                .await
                .unwrap();
            ids.push(
                session
                    .questions()
                    .iter()
                    .map(|q| q.id().as_str().to_owned())
                    .collect::<Vec<_>>(),
            );
        }
        assert_eq!(ids[0], ids[1]);
    }

    #[tokio::test]
    async fn option_order_is_left_as_published() {
        let mut quizzes = HashMap::new();
        quizzes.insert(
            "https://fiches.example.com/01-basics/routing.md.json".to_owned(),
            quiz_json("Routing", &(1..=12).collect::<Vec<_>>()),
        );

        let catalog = catalog();
        let certification = catalog.certification("symfony").unwrap();
        let mut rng = StdRng::seed_from_u64(3);

        let session = assembler(quizzes)
            .assemble_with_rng(certification, &config(&["basics"]), |_| {}, &mut rng)
            .await
            .unwrap();

        for question in session.questions() {
            assert_eq!(question.question().options(), ["A", "B", "C"]);
        }
    }
}
