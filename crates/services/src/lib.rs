#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod profile_service;
pub mod question_bank;
pub mod score_aggregator;
pub mod sessions;

pub use quiz_core::Clock;

pub use app_services::AppServices;
pub use error::{AppServicesError, CatalogError, ProfileServiceError, SessionError};
pub use profile_service::ProfileService;
pub use question_bank::{QuestionBank, QuestionCatalog};
pub use score_aggregator::ScoreAggregator;

pub use sessions::{
    AdvanceOutcome, AnswerFeedback, DEFAULT_ADVANCE_DELAY, PendingAdvance, QuizLoopService,
    QuizRunner, SessionController, SessionProgress,
};
