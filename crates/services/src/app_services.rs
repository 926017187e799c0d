use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use fiche_core::model::Catalog;
use storage::Storage;

use crate::Clock;
use crate::content::{ContentService, HttpContentFetcher};
use crate::error::AppServicesError;
use crate::exam::{ExamAssembler, ExamHistoryService};
use crate::progress::ProgressService;
use crate::streak::StreakService;

/// Assembles app-facing services around one catalog and one store.
#[derive(Clone)]
pub struct AppServices {
    catalog: Arc<Catalog>,
    content: Arc<ContentService>,
    assembler: Arc<ExamAssembler>,
    progress: Arc<ProgressService>,
    streaks: Arc<StreakService>,
    exam_history: Arc<ExamHistoryService>,
}

impl fmt::Debug for AppServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppServices").finish_non_exhaustive()
    }
}

impl AppServices {
    /// Build services from a catalog file on disk.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the catalog cannot be read, parsed, or
    /// validated.
    pub fn new(
        catalog_path: &Path,
        storage: &Storage,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let json = fs::read_to_string(catalog_path).map_err(|source| {
            AppServicesError::CatalogRead {
                path: catalog_path.display().to_string(),
                source,
            }
        })?;
        let catalog: Catalog =
            serde_json::from_str(&json).map_err(|source| AppServicesError::CatalogParse {
                path: catalog_path.display().to_string(),
                source,
            })?;
        Self::with_catalog(catalog, storage, clock)
    }

    /// Build services around an already loaded catalog.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if catalog validation fails.
    pub fn with_catalog(
        catalog: Catalog,
        storage: &Storage,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let content = Arc::new(ContentService::new(Arc::new(HttpContentFetcher::new())));
        Self::with_content(catalog, storage, clock, content)
    }

    /// Build services with a caller-provided content layer.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if catalog validation fails.
    pub fn with_content(
        catalog: Catalog,
        storage: &Storage,
        clock: Clock,
        content: Arc<ContentService>,
    ) -> Result<Self, AppServicesError> {
        catalog.validate()?;

        let assembler = Arc::new(ExamAssembler::new(Arc::clone(&content)));
        let progress = Arc::new(ProgressService::new(Arc::clone(&storage.store)));
        let streaks = Arc::new(StreakService::new(Arc::clone(&storage.store), clock));
        let exam_history = Arc::new(ExamHistoryService::new(Arc::clone(&storage.store)));

        Ok(Self {
            catalog: Arc::new(catalog),
            content,
            assembler,
            progress,
            streaks,
            exam_history,
        })
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn content(&self) -> Arc<ContentService> {
        Arc::clone(&self.content)
    }

    #[must_use]
    pub fn assembler(&self) -> Arc<ExamAssembler> {
        Arc::clone(&self.assembler)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn streaks(&self) -> Arc<StreakService> {
        Arc::clone(&self.streaks)
    }

    #[must_use]
    pub fn exam_history(&self) -> Arc<ExamHistoryService> {
        Arc::clone(&self.exam_history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fiche_core::time::fixed_clock;

    fn sample_catalog(base_url: &str) -> Catalog {
        serde_json::from_str(&format!(
            r#"{{
              "certifications": [
                {{
                  "id": "symfony",
                  "title": "Symfony 7",
                  "baseUrl": "{base_url}",
                  "categories": [
                    {{
                      "id": "basics",
                      "title": "Basics",
                      "folder": "01-basics",
                      "topics": [
                        {{ "id": "routing", "title": "Routing", "path": "routing.md" }}
                      ]
                    }}
                  ]
                }}
              ]
            }}"#
        ))
        .unwrap()
    }

    #[test]
    fn services_share_one_store() {
        let storage = Storage::in_memory();
        let catalog = sample_catalog("https://fiches.example.com/");
        let services = AppServices::with_catalog(catalog, &storage, fixed_clock()).unwrap();

        let key = services.catalog().certifications()[0].flatten()[0]
            .key()
            .clone();
        services.progress().toggle_completed(key);
        services.streaks().record_activity();

        // both services persisted into the same backing store
        assert!(storage.store.get("certification-progress").unwrap().is_some());
        assert!(storage.store.get("certification-streaks").unwrap().is_some());
        assert_eq!(services.exam_history().all().len(), 0);
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let storage = Storage::in_memory();
        let catalog = sample_catalog("not-a-url");

        let err = AppServices::with_catalog(catalog, &storage, fixed_clock()).unwrap_err();
        assert!(matches!(err, AppServicesError::Catalog(_)));
    }

    #[test]
    fn missing_catalog_file_reports_path() {
        let storage = Storage::in_memory();
        let path = Path::new("/definitely/not/here/catalog.json");

        let err = AppServices::new(path, &storage, fixed_clock()).unwrap_err();
        match err {
            AppServicesError::CatalogRead { path, .. } => {
                assert!(path.contains("catalog.json"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
