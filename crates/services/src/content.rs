use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;

use fiche_core::model::{FlatTopic, QuizDoc};

use crate::error::ContentError;

/// Fetches remote text documents. Implemented over HTTP in production and by
/// fixed fixtures in tests.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Fetch the document at `url` as text.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::HttpStatus` for a non-success response and
    /// `ContentError::Http` for transport failures.
    async fn fetch_text(&self, url: &str) -> Result<String, ContentError>;
}

/// `ContentFetcher` backed by a shared `reqwest` client.
#[derive(Clone, Default)]
pub struct HttpContentFetcher {
    client: Client,
}

impl HttpContentFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

#[async_trait]
impl ContentFetcher for HttpContentFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, ContentError> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(ContentError::HttpStatus(response.status()));
        }
        Ok(response.text().await?)
    }
}

/// Loads markdown fiches and quiz files for catalog topics.
pub struct ContentService {
    fetcher: Arc<dyn ContentFetcher>,
}

impl ContentService {
    #[must_use]
    pub fn new(fetcher: Arc<dyn ContentFetcher>) -> Self {
        Self { fetcher }
    }

    /// Load the markdown fiche behind a topic.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` if the document cannot be fetched.
    pub async fn load_markdown(&self, topic: &FlatTopic) -> Result<String, ContentError> {
        self.fetcher.fetch_text(topic.markdown_url()).await
    }

    /// Load a topic's quiz, if one is published.
    ///
    /// Most topics ship without a quiz file, so any fetch or parse failure
    /// just reports "no quiz" instead of surfacing an error.
    pub async fn load_quiz(&self, topic: &FlatTopic) -> Option<QuizDoc> {
        let body = match self.fetcher.fetch_text(topic.quiz_url()).await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!("no quiz at {}: {e}", topic.quiz_url());
                return None;
            }
        };
        match serde_json::from_str(&body) {
            Ok(doc) => Some(doc),
            Err(e) => {
                tracing::debug!("invalid quiz file at {}: {e}", topic.quiz_url());
                None
            }
        }
    }
}
