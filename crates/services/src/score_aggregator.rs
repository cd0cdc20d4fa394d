use quiz_core::Clock;
use quiz_core::model::{
    Difficulty, Profile, ScoreRecord, ScoreRecordError, ScoreSummary, SessionOutcome,
};

/// Folds completed sessions into a profile's score history.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreAggregator {
    clock: Clock,
}

impl ScoreAggregator {
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self { clock }
    }

    /// Append a completion stamped with the aggregator's clock.
    ///
    /// # Errors
    ///
    /// Returns `ScoreRecordError` if `total` is zero or `score` exceeds it.
    pub fn record_completion(
        &self,
        profile: Profile,
        category: &str,
        difficulty: Difficulty,
        score: u32,
        total: u32,
    ) -> Result<Profile, ScoreRecordError> {
        let record = ScoreRecord::new(category, difficulty, score, total, self.clock.now())?;
        Ok(Self::append(profile, record))
    }

    /// Append a session outcome using its own completion timestamp.
    ///
    /// # Errors
    ///
    /// Returns `ScoreRecordError` if the outcome's tally is inconsistent.
    pub fn record_outcome(
        &self,
        profile: Profile,
        outcome: &SessionOutcome,
    ) -> Result<Profile, ScoreRecordError> {
        Ok(Self::append(profile, outcome.to_record()?))
    }

    fn append(mut profile: Profile, record: ScoreRecord) -> Profile {
        profile.append_score(record);
        profile
    }

    /// Mean percentage across every record of every category, rounded.
    #[must_use]
    pub fn compute_summary(profile: &Profile) -> ScoreSummary {
        ScoreSummary::from_percentages(profile.all_scores().map(ScoreRecord::percent))
    }
}
