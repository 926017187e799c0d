use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::model::ids::TopicKey;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("unknown certification `{0}`")]
    UnknownCertification(String),

    #[error("unknown category `{0}`")]
    UnknownCategory(String),

    #[error("unknown topic `{0}`")]
    UnknownTopic(String),

    #[error("certification `{certification}` has an invalid base url `{base_url}`")]
    InvalidBaseUrl {
        certification: String,
        base_url: String,
    },
}

//
// ─── CATALOG TREE ──────────────────────────────────────────────────────────────
//

/// One study card: a markdown fiche addressed relative to its category folder.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Topic {
    id: String,
    title: String,
    path: String,
}

impl Topic {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Ordered group of topics sharing one content folder.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Category {
    id: String,
    title: String,
    folder: String,
    topics: Vec<Topic>,
}

impl Category {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn folder(&self) -> &str {
        &self.folder
    }

    #[must_use]
    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    /// Finds a topic by id.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::UnknownTopic` if no topic has that id.
    pub fn topic(&self, id: &str) -> Result<&Topic, CatalogError> {
        self.topics
            .iter()
            .find(|topic| topic.id == id)
            .ok_or_else(|| CatalogError::UnknownTopic(id.to_owned()))
    }
}

/// A certification track: categories of topics served from one base url.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certification {
    id: String,
    title: String,
    base_url: String,
    categories: Vec<Category>,
}

impl Certification {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Finds a category by id.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::UnknownCategory` if no category has that id.
    pub fn category(&self, id: &str) -> Result<&Category, CatalogError> {
        self.categories
            .iter()
            .find(|category| category.id == id)
            .ok_or_else(|| CatalogError::UnknownCategory(id.to_owned()))
    }

    /// Total number of topics across all categories.
    #[must_use]
    pub fn topic_count(&self) -> usize {
        self.categories.iter().map(|c| c.topics.len()).sum()
    }

    /// Markdown source for a topic inside one of this certification's categories.
    #[must_use]
    pub fn markdown_url(&self, category: &Category, topic: &Topic) -> String {
        format!("{}{}/{}", self.base_url, category.folder, topic.path)
    }

    /// The quiz definition sits next to the markdown with a `.json` suffix.
    #[must_use]
    pub fn quiz_url(&self, category: &Category, topic: &Topic) -> String {
        format!("{}.json", self.markdown_url(category, topic))
    }

    /// Flattens every category's topics into one ordered navigation list.
    #[must_use]
    pub fn flatten(&self) -> Vec<FlatTopic> {
        self.categories
            .iter()
            .flat_map(|category| {
                category
                    .topics
                    .iter()
                    .map(|topic| FlatTopic::new(self, category, topic))
            })
            .collect()
    }

    /// Flattens only the selected categories, keeping catalog order.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::UnknownCategory` if any id is not in this
    /// certification.
    pub fn flatten_categories(
        &self,
        category_ids: &[String],
    ) -> Result<Vec<FlatTopic>, CatalogError> {
        for id in category_ids {
            self.category(id)?;
        }
        Ok(self
            .categories
            .iter()
            .filter(|category| category_ids.iter().any(|id| id == &category.id))
            .flat_map(|category| {
                category
                    .topics
                    .iter()
                    .map(|topic| FlatTopic::new(self, category, topic))
            })
            .collect())
    }

    /// Position of a topic key in the flattened navigation order.
    #[must_use]
    pub fn position(&self, key: &TopicKey) -> Option<usize> {
        self.flatten().iter().position(|flat| flat.key() == key)
    }

    /// Checks that the base url parses as an absolute URL.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidBaseUrl` if it does not.
    pub fn validate_base_url(&self) -> Result<(), CatalogError> {
        if Url::parse(&self.base_url).is_err() {
            return Err(CatalogError::InvalidBaseUrl {
                certification: self.id.clone(),
                base_url: self.base_url.clone(),
            });
        }
        Ok(())
    }
}

/// A topic joined with its certification and category context, ready for
/// navigation, fetching, and exam pooling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatTopic {
    key: TopicKey,
    certification_id: String,
    category_id: String,
    topic_id: String,
    category_title: String,
    topic_title: String,
    markdown_url: String,
    quiz_url: String,
}

impl FlatTopic {
    fn new(certification: &Certification, category: &Category, topic: &Topic) -> Self {
        let markdown_url = certification.markdown_url(category, topic);
        Self {
            key: TopicKey::compose(&certification.id, &category.id, &topic.id),
            certification_id: certification.id.clone(),
            category_id: category.id.clone(),
            topic_id: topic.id.clone(),
            category_title: category.title.clone(),
            topic_title: topic.title.clone(),
            quiz_url: format!("{markdown_url}.json"),
            markdown_url,
        }
    }

    #[must_use]
    pub fn key(&self) -> &TopicKey {
        &self.key
    }

    #[must_use]
    pub fn certification_id(&self) -> &str {
        &self.certification_id
    }

    #[must_use]
    pub fn category_id(&self) -> &str {
        &self.category_id
    }

    #[must_use]
    pub fn topic_id(&self) -> &str {
        &self.topic_id
    }

    #[must_use]
    pub fn category_title(&self) -> &str {
        &self.category_title
    }

    #[must_use]
    pub fn topic_title(&self) -> &str {
        &self.topic_title
    }

    #[must_use]
    pub fn markdown_url(&self) -> &str {
        &self.markdown_url
    }

    #[must_use]
    pub fn quiz_url(&self) -> &str {
        &self.quiz_url
    }
}

/// Read-only tree of certifications, loaded from a JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Catalog {
    certifications: Vec<Certification>,
}

impl Catalog {
    #[must_use]
    pub fn certifications(&self) -> &[Certification] {
        &self.certifications
    }

    /// Finds a certification by id.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::UnknownCertification` if no certification has
    /// that id.
    pub fn certification(&self, id: &str) -> Result<&Certification, CatalogError> {
        self.certifications
            .iter()
            .find(|certification| certification.id == id)
            .ok_or_else(|| CatalogError::UnknownCertification(id.to_owned()))
    }

    /// Validates every certification's base url.
    ///
    /// # Errors
    ///
    /// Returns the first `CatalogError::InvalidBaseUrl` found.
    pub fn validate(&self) -> Result<(), CatalogError> {
        for certification in &self.certifications {
            certification.validate_base_url()?;
        }
        Ok(())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
