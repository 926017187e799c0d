//! Shared error types for the services crate.

use thiserror::Error;

use fiche_core::model::CatalogError;

/// Errors emitted by `ContentService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContentError {
    #[error("content request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by `QuizSession`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("no option selected")]
    NothingSelected,
    #[error("answer already submitted")]
    AlreadySubmitted,
    #[error("answer not submitted yet")]
    NotSubmitted,
}

/// Errors emitted by exam assembly and exam sessions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExamError {
    #[error("no questions available for the selected categories")]
    EmptyPool,
    #[error("exam already submitted")]
    AlreadySubmitted,
    #[error("question index {0} out of range")]
    OutOfRange(usize),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error("failed to read catalog file `{path}`")]
    CatalogRead {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse catalog file `{path}`")]
    CatalogParse {
        path: String,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
