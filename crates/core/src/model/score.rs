use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::difficulty::Difficulty;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScoreRecordError {
    #[error("score total must be at least 1")]
    ZeroTotal,

    #[error("score ({score}) exceeds total ({total})")]
    ScoreExceedsTotal { score: u32, total: u32 },

    #[error("score category cannot be empty")]
    EmptyCategory,
}

/// Percentage of `score` over `total`; `total` must be non-zero.
#[must_use]
pub fn percent(score: u32, total: u32) -> f64 {
    debug_assert!(total > 0, "percentage of an empty session");
    f64::from(score) / f64::from(total) * 100.0
}

/// Persisted outcome of one completed session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreRecord {
    category: String,
    difficulty: Difficulty,
    score: u32,
    total: u32,
    completed_at: DateTime<Utc>,
}

impl ScoreRecord {
    /// Create a validated score record.
    ///
    /// # Errors
    ///
    /// Returns `ScoreRecordError` if the category is blank, `total` is zero, or
    /// `score` exceeds `total`.
    pub fn new(
        category: impl Into<String>,
        difficulty: Difficulty,
        score: u32,
        total: u32,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, ScoreRecordError> {
        let category = category.into();
        if category.trim().is_empty() {
            return Err(ScoreRecordError::EmptyCategory);
        }
        if total == 0 {
            return Err(ScoreRecordError::ZeroTotal);
        }
        if score > total {
            return Err(ScoreRecordError::ScoreExceedsTotal { score, total });
        }

        Ok(Self {
            category,
            difficulty,
            score,
            total,
            completed_at,
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
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    #[must_use]
    pub fn percent(&self) -> f64 {
        percent(self.score, self.total)
    }
}

/// Aggregate over every score record of a profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreSummary {
    pub total_percent_sum: f64,
    pub count: usize,
    pub average_percent: u32,
}

impl ScoreSummary {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            total_percent_sum: 0.0,
            count: 0,
            average_percent: 0,
        }
    }

    /// Fold per-record percentages into a rounded mean (0 when empty).
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_percentages(percentages: impl IntoIterator<Item = f64>) -> Self {
        let mut total_percent_sum = 0.0;
        let mut count = 0_usize;
        for value in percentages {
            total_percent_sum += value;
            count += 1;
        }
        let average_percent = if count == 0 {
            0
        } else {
            (total_percent_sum / count as f64).round().clamp(0.0, 100.0) as u32
        };

        Self {
            total_percent_sum,
            count,
            average_percent,
        }
    }
}

//
// ─── RESULT TIER ──────────────────────────────────────────────────────────────
//

/// Headline verdict for a finished session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultTier {
    /// 95% and above.
    Excellent,
    /// 80% and above.
    Great,
    /// 70% and above.
    Passed,
    KeepPracticing,
}

impl ResultTier {
    #[must_use]
    pub fn from_percent(percent: f64) -> Self {
        if percent >= 95.0 {
            ResultTier::Excellent
        } else if percent >= 80.0 {
            ResultTier::Great
        } else if percent >= 70.0 {
            ResultTier::Passed
        } else {
            ResultTier::KeepPracticing
        }
    }

    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            ResultTier::Excellent => "Excellent! You're a genius!",
            ResultTier::Great => "Great job! You're doing amazing!",
            ResultTier::Passed => "Well done! You passed!",
            ResultTier::KeepPracticing => "Keep practicing! You'll get there!",
        }
    }

    /// Whether the result deserves a celebration.
    #[must_use]
    pub fn celebrates(self) -> bool {
        !matches!(self, ResultTier::KeepPracticing)
    }
}
