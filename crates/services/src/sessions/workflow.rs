use std::sync::Arc;
use std::time::Duration;

use rand::{Rng, rng};
use tracing::{debug, info};

use quiz_core::model::{Difficulty, Profile, SessionOutcome};
use storage::repository::ProfileStore;

use super::controller::{AdvanceOutcome, AnswerFeedback, SessionController};
use crate::Clock;
use crate::error::SessionError;
use crate::question_bank::QuestionBank;
use crate::score_aggregator::ScoreAggregator;

/// Presentation delay between answering and moving on.
pub const DEFAULT_ADVANCE_DELAY: Duration = Duration::from_millis(1500);

/// Orchestrates session start, answering, and persisted completion.
#[derive(Clone)]
pub struct QuizLoopService {
    clock: Clock,
    bank: Arc<QuestionBank>,
    profiles: Arc<dyn ProfileStore>,
    aggregator: ScoreAggregator,
    advance_delay: Duration,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(clock: Clock, bank: Arc<QuestionBank>, profiles: Arc<dyn ProfileStore>) -> Self {
        Self {
            clock,
            bank,
            profiles,
            aggregator: ScoreAggregator::new(clock),
            advance_delay: DEFAULT_ADVANCE_DELAY,
        }
    }

    #[must_use]
    pub fn with_advance_delay(mut self, delay: Duration) -> Self {
        self.advance_delay = delay;
        self
    }

    #[must_use]
    pub fn advance_delay(&self) -> Duration {
        self.advance_delay
    }

    #[must_use]
    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    /// Start a session for `category` at the named difficulty.
    ///
    /// Unknown categories draw from the default category and unknown
    /// difficulties play as easy.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if no questions could be drawn.
    pub fn start_session(
        &self,
        category: &str,
        difficulty: &str,
    ) -> Result<SessionController, SessionError> {
        self.start_session_with_rng(category, difficulty, &mut rng())
    }

    /// Same as [`QuizLoopService::start_session`] with a caller-supplied RNG.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if no questions could be drawn.
    pub fn start_session_with_rng<R: Rng + ?Sized>(
        &self,
        category: &str,
        difficulty: &str,
        rng: &mut R,
    ) -> Result<SessionController, SessionError> {
        let difficulty = Difficulty::parse_or_default(difficulty);
        let questions =
            self.bank
                .select_questions_with(category, difficulty.question_count(), rng);

        info!(
            category,
            resolved = self.bank.resolve_category(category),
            difficulty = %difficulty,
            questions = questions.len(),
            "session started"
        );
        SessionController::new(category, difficulty, questions, self.clock.now())
    }

    /// Grade an answer for the current question. `None` when ignored.
    pub fn submit_answer(
        &self,
        session: &mut SessionController,
        answer: &str,
    ) -> Option<AnswerFeedback> {
        let feedback = session.submit_answer(answer)?;
        debug!(
            index = session.current_index(),
            correct = feedback.is_correct,
            score = feedback.score,
            "answer graded"
        );
        Some(feedback)
    }

    /// Advance past the answered question and persist the result on completion.
    ///
    /// When persistence fails the session still ends up completed; retry with
    /// [`QuizLoopService::record_completion`] using `session.outcome()`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` or `SessionError::Score` if the
    /// completion cannot be recorded.
    pub async fn advance(
        &self,
        session: &mut SessionController,
    ) -> Result<AdvanceOutcome, SessionError> {
        let outcome = session.advance(self.clock.now());
        if let AdvanceOutcome::Completed(ref result) = outcome {
            info!(
                category = %result.category,
                difficulty = %result.difficulty,
                score = result.score,
                total = result.total,
                "session completed"
            );
            self.record_completion(result).await?;
        }
        Ok(outcome)
    }

    /// Append a completed session to the stored profile.
    ///
    /// Returns the updated profile, or `None` when nobody is registered.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the profile cannot be read or
    /// written and `SessionError::Score` for an inconsistent outcome.
    pub async fn record_completion(
        &self,
        outcome: &SessionOutcome,
    ) -> Result<Option<Profile>, SessionError> {
        let Some(profile) = self.profiles.load().await? else {
            info!(category = %outcome.category, "no profile registered; completion not saved");
            return Ok(None);
        };

        let updated = self.aggregator.record_outcome(profile, outcome)?;
        self.profiles.save(&updated).await?;
        debug!(
            category = %outcome.category,
            records = updated.scores_for(&outcome.category).len(),
            "completion saved"
        );
        Ok(Some(updated))
    }

    /// Replay the same questions. Only valid once completed.
    pub fn restart(&self, session: &mut SessionController) -> bool {
        let restarted = session.restart(self.clock.now());
        if restarted {
            debug!(category = session.category(), "session restarted");
        }
        restarted
    }
}
