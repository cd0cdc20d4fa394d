use std::sync::Arc;
use std::time::Duration;

use storage::repository::Storage;

use crate::Clock;
use crate::error::AppServicesError;
use crate::profile_service::ProfileService;
use crate::question_bank::{QuestionBank, QuestionCatalog};
use crate::sessions::QuizLoopService;

/// Assembles app-facing services over one storage backend and question bank.
#[derive(Clone)]
pub struct AppServices {
    bank: Arc<QuestionBank>,
    quiz_loop: Arc<QuizLoopService>,
    profiles: Arc<ProfileService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        catalog: QuestionCatalog,
        advance_delay: Duration,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock, catalog, advance_delay))
    }

    /// Build services over the in-memory store.
    #[must_use]
    pub fn in_memory(clock: Clock, catalog: QuestionCatalog, advance_delay: Duration) -> Self {
        Self::from_storage(&Storage::in_memory(), clock, catalog, advance_delay)
    }

    #[must_use]
    pub fn from_storage(
        storage: &Storage,
        clock: Clock,
        catalog: QuestionCatalog,
        advance_delay: Duration,
    ) -> Self {
        let bank = Arc::new(QuestionBank::from_catalog(catalog));
        let quiz_loop = Arc::new(
            QuizLoopService::new(clock, Arc::clone(&bank), Arc::clone(&storage.profiles))
                .with_advance_delay(advance_delay),
        );
        let profiles = Arc::new(ProfileService::new(Arc::clone(&storage.profiles)));

        Self {
            bank,
            quiz_loop,
            profiles,
        }
    }

    #[must_use]
    pub fn bank(&self) -> Arc<QuestionBank> {
        Arc::clone(&self.bank)
    }

    #[must_use]
    pub fn quiz_loop(&self) -> Arc<QuizLoopService> {
        Arc::clone(&self.quiz_loop)
    }

    #[must_use]
    pub fn profiles(&self) -> Arc<ProfileService> {
        Arc::clone(&self.profiles)
    }
}
