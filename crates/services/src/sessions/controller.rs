use chrono::{DateTime, Utc};

use quiz_core::model::{Difficulty, OptionMark, Question, SessionOutcome, SessionState};

use super::progress::SessionProgress;
use crate::error::SessionError;

//
// ─── EVENTS ────────────────────────────────────────────────────────────────────
//

/// What the player learns right after answering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerFeedback {
    pub selected: String,
    pub correct_answer: String,
    pub is_correct: bool,
    pub explanation: Option<String>,
    /// Running score including this answer.
    pub score: u32,
}

/// Result of an `advance` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Moved on to the next question.
    Next,
    /// The last question was answered; the session is over.
    Completed(SessionOutcome),
    /// The session was not waiting to advance.
    Ignored,
}

//
// ─── CONTROLLER ────────────────────────────────────────────────────────────────
//

/// State machine for one quiz session.
///
/// Operations invoked in a state that does not permit them leave the session
/// untouched and report that through their return value instead of an error.
#[derive(Debug, Clone)]
pub struct SessionController {
    category: String,
    difficulty: Difficulty,
    questions: Vec<Question>,
    current_index: usize,
    score: u32,
    total: u32,
    state: SessionState,
    last_selected: Option<String>,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl SessionController {
    /// Create a session positioned on the first question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if `questions` is empty and
    /// `SessionError::TooManyQuestions` if its length does not fit a `u32`.
    pub fn new(
        category: impl Into<String>,
        difficulty: Difficulty,
        questions: Vec<Question>,
        started_at: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::Empty);
        }
        let total = u32::try_from(questions.len())
            .map_err(|_| SessionError::TooManyQuestions {
                len: questions.len(),
            })?;

        Ok(Self {
            category: category.into(),
            difficulty,
            questions,
            current_index: 0,
            score: 0,
            total,
            state: SessionState::Unanswered,
            last_selected: None,
            started_at,
            completed_at: None,
        })
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn last_selected(&self) -> Option<&str> {
        self.last_selected.as_deref()
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state == SessionState::Completed
    }

    /// The question being asked, or `None` once completed.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        if self.is_complete() {
            return None;
        }
        self.questions.get(self.current_index)
    }

    /// Presentation marks for the current question's options, in option order.
    #[must_use]
    pub fn option_marks(&self) -> Vec<OptionMark> {
        let Some(question) = self.current_question() else {
            return Vec::new();
        };
        let answered = self.state == SessionState::Answered;
        question
            .options()
            .iter()
            .map(|option| {
                OptionMark::classify(
                    option,
                    question.correct_answer(),
                    self.last_selected(),
                    answered,
                )
            })
            .collect()
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress::new(self.current_index, self.questions.len(), self.is_complete())
    }

    /// Final tally, available once the session has completed.
    #[must_use]
    pub fn outcome(&self) -> Option<SessionOutcome> {
        let completed_at = self.completed_at?;
        if !self.is_complete() {
            return None;
        }
        Some(SessionOutcome {
            category: self.category.clone(),
            difficulty: self.difficulty,
            score: self.score,
            total: self.total,
            completed_at,
        })
    }

    /// Grade `answer` against the current question.
    ///
    /// Returns `None` without touching any state unless the session is
    /// waiting for an answer.
    pub fn submit_answer(&mut self, answer: &str) -> Option<AnswerFeedback> {
        if self.state != SessionState::Unanswered {
            return None;
        }
        let question = self.questions.get(self.current_index)?;

        let is_correct = question.is_correct(answer);
        if is_correct {
            self.score += 1;
        }
        let feedback = AnswerFeedback {
            selected: answer.to_owned(),
            correct_answer: question.correct_answer().to_owned(),
            is_correct,
            explanation: question.explanation().map(str::to_owned),
            score: self.score,
        };

        self.last_selected = Some(answer.to_owned());
        self.state = SessionState::Answered;
        Some(feedback)
    }

    /// Move past the answered question, completing the session after the last.
    pub fn advance(&mut self, now: DateTime<Utc>) -> AdvanceOutcome {
        if self.state != SessionState::Answered {
            return AdvanceOutcome::Ignored;
        }

        self.last_selected = None;
        if self.current_index + 1 < self.questions.len() {
            self.current_index += 1;
            self.state = SessionState::Unanswered;
            return AdvanceOutcome::Next;
        }

        self.current_index = self.questions.len();
        self.state = SessionState::Completed;
        self.completed_at = Some(now);
        self.outcome()
            .map_or(AdvanceOutcome::Ignored, AdvanceOutcome::Completed)
    }

    /// Replay the same questions from the start. Only valid once completed.
    pub fn restart(&mut self, now: DateTime<Utc>) -> bool {
        if !self.is_complete() {
            return false;
        }
        self.current_index = 0;
        self.score = 0;
        self.last_selected = None;
        self.state = SessionState::Unanswered;
        self.started_at = now;
        self.completed_at = None;
        true
    }
}
