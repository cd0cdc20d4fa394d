use chrono::{DateTime, Utc};

use crate::model::difficulty::Difficulty;
use crate::model::score::{ResultTier, ScoreRecord, ScoreRecordError, percent};

/// Where a session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for an answer to the current question.
    Unanswered,
    /// Current question graded; waiting for the advance.
    Answered,
    /// Every question has been answered.
    Completed,
}

/// How an option of the current question should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionMark {
    /// Not answered yet; every option is selectable.
    Neutral,
    Correct,
    /// The player's pick, which was wrong.
    WrongSelection,
    Dimmed,
}

impl OptionMark {
    #[must_use]
    pub fn classify(
        option: &str,
        correct_answer: &str,
        selected: Option<&str>,
        answered: bool,
    ) -> Self {
        if !answered {
            return OptionMark::Neutral;
        }
        if option == correct_answer {
            OptionMark::Correct
        } else if selected == Some(option) {
            OptionMark::WrongSelection
        } else {
            OptionMark::Dimmed
        }
    }
}

/// Final tally emitted when a session completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOutcome {
    pub category: String,
    pub difficulty: Difficulty,
    pub score: u32,
    pub total: u32,
    pub completed_at: DateTime<Utc>,
}

impl SessionOutcome {
    #[must_use]
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        percent(self.score, self.total)
    }

    #[must_use]
    pub fn tier(&self) -> ResultTier {
        ResultTier::from_percent(self.percent())
    }

    /// Convert into the persisted score record.
    ///
    /// # Errors
    ///
    /// Returns `ScoreRecordError` if the tally is inconsistent.
    pub fn to_record(&self) -> Result<ScoreRecord, ScoreRecordError> {
        ScoreRecord::new(
            self.category.clone(),
            self.difficulty,
            self.score,
            self.total,
            self.completed_at,
        )
    }
}
