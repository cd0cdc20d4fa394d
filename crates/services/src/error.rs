//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{ProfileError, QuestionError, QuestionSetError, ScoreRecordError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted while loading a question catalog.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("failed to read question catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed question catalog: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid question #{index} in category `{category}`: {source}")]
    Question {
        category: String,
        index: usize,
        #[source]
        source: QuestionError,
    },
    #[error(transparent)]
    QuestionSet(#[from] QuestionSetError),
}

/// Errors emitted by session services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no questions available for session")]
    Empty,
    #[error("too many questions for a single session: {len}")]
    TooManyQuestions { len: usize },
    #[error("pending advance was cancelled")]
    AdvanceCancelled,
    #[error("pending advance failed: {0}")]
    AdvanceFailed(String),
    #[error(transparent)]
    Score(#[from] ScoreRecordError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ProfileService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProfileServiceError {
    #[error("no profile registered")]
    NotRegistered,
    #[error(transparent)]
    Profile(#[from] ProfileError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
