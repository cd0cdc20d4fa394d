//! Versioned persisted shape of a profile.
//!
//! The domain `Profile` never derives serde; this module owns the wire shape
//! and funnels every field back through validated constructors on decode.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::warn;

use quiz_core::model::{
    Difficulty, Gender, Profile, ProfileDraft, ProfileError, ScoreHistory, ScoreRecord,
    ScoreRecordError,
};

/// Schema version written by this build.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RecordError {
    #[error("malformed profile payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported profile schema version {0}")]
    UnsupportedVersion(u32),

    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error(transparent)]
    Score(#[from] ScoreRecordError),
}

/// Persisted shape for one score history entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreEntry {
    pub category: String,
    pub difficulty: Difficulty,
    pub score: u32,
    pub total: u32,
    #[serde(rename = "date")]
    pub completed_at: DateTime<Utc>,
}

impl ScoreEntry {
    #[must_use]
    pub fn from_record(record: &ScoreRecord) -> Self {
        Self {
            category: record.category().to_string(),
            difficulty: record.difficulty(),
            score: record.score(),
            total: record.total(),
            completed_at: record.completed_at(),
        }
    }

    /// Convert back into a validated domain record.
    ///
    /// # Errors
    ///
    /// Returns `ScoreRecordError` if the stored tally is inconsistent.
    pub fn into_record(self) -> Result<ScoreRecord, ScoreRecordError> {
        ScoreRecord::new(
            self.category,
            self.difficulty,
            self.score,
            self.total,
            self.completed_at,
        )
    }
}

/// Persisted shape for a profile, including its schema version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    pub schema_version: u32,
    pub name: String,
    pub preferred_name: String,
    pub gender: String,
    pub age: u32,
    pub avatar: String,
    #[serde(default)]
    pub scores: BTreeMap<String, Vec<ScoreEntry>>,
}

impl ProfileRecord {
    #[must_use]
    pub fn from_profile(profile: &Profile) -> Self {
        let scores = profile
            .score_history()
            .iter()
            .map(|(category, records)| {
                (
                    category.clone(),
                    records.iter().map(ScoreEntry::from_record).collect(),
                )
            })
            .collect();

        Self {
            schema_version: SCHEMA_VERSION,
            name: profile.name().to_string(),
            preferred_name: profile.preferred_name().to_string(),
            gender: profile.gender().as_str().to_string(),
            age: u32::from(profile.age()),
            avatar: profile.avatar().to_string(),
            scores,
        }
    }

    /// Convert the record back into a domain `Profile`.
    ///
    /// # Errors
    ///
    /// Returns `RecordError` for an unknown schema version or any field that
    /// fails domain validation.
    pub fn into_profile(self) -> Result<Profile, RecordError> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(RecordError::UnsupportedVersion(self.schema_version));
        }

        let gender: Gender = self.gender.parse()?;
        let mut history = ScoreHistory::new();
        for (category, entries) in self.scores {
            let records = entries
                .into_iter()
                .map(ScoreEntry::into_record)
                .collect::<Result<Vec<_>, _>>()?;
            history.insert(category, records);
        }

        let draft = ProfileDraft {
            name: self.name,
            preferred_name: self.preferred_name,
            gender,
            age: self.age,
            avatar: Some(self.avatar),
        };
        Ok(Profile::from_persisted(draft, history)?)
    }
}

/// Serialize a profile into its persisted payload.
///
/// # Errors
///
/// Returns `RecordError::Json` if serialization fails.
pub fn encode_profile(profile: &Profile) -> Result<String, RecordError> {
    Ok(serde_json::to_string(&ProfileRecord::from_profile(profile))?)
}

/// Parse a persisted payload into a profile.
///
/// # Errors
///
/// Returns `RecordError` if the payload is malformed or fails validation.
pub fn decode_profile(payload: &str) -> Result<Profile, RecordError> {
    serde_json::from_str::<ProfileRecord>(payload)?.into_profile()
}

/// Decode a payload, treating corrupt data as "no profile".
#[must_use]
pub fn decode_or_discard(payload: &str) -> Option<Profile> {
    match decode_profile(payload) {
        Ok(profile) => Some(profile),
        Err(err) => {
            warn!(error = %err, "discarding unreadable stored profile");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::time::fixed_now;

    fn profile_with_scores() -> Profile {
        let mut profile = Profile::register(ProfileDraft {
            name: "Grace Hopper".into(),
            preferred_name: "Grace".into(),
            gender: Gender::Female,
            age: 85,
            avatar: Some("data:image/jpeg;base64,/9j/4AAQ".into()),
        })
        .unwrap();
        profile.append_score(
            ScoreRecord::new("math", Difficulty::Easy, 8, 10, fixed_now()).unwrap(),
        );
        profile.append_score(
            ScoreRecord::new("science", Difficulty::Hard, 12, 20, fixed_now()).unwrap(),
        );
        profile
    }

    #[test]
    fn payload_preserves_every_field() {
        let profile = profile_with_scores();
        let payload = encode_profile(&profile).unwrap();
        assert!(payload.contains("\"schemaVersion\":1"));
        assert!(payload.contains("\"preferredName\":\"Grace\""));

        let decoded = decode_profile(&payload).unwrap();
        assert_eq!(decoded, profile);
    }

    #[test]
    fn rejects_unknown_schema_version() {
        let mut record = ProfileRecord::from_profile(&profile_with_scores());
        record.schema_version = 99;
        let payload = serde_json::to_string(&record).unwrap();
        assert!(matches!(
            decode_profile(&payload),
            Err(RecordError::UnsupportedVersion(99))
        ));
    }

    #[test]
    fn rejects_invalid_fields() {
        let mut record = ProfileRecord::from_profile(&profile_with_scores());
        record.age = 0;
        let payload = serde_json::to_string(&record).unwrap();
        assert!(matches!(
            decode_profile(&payload),
            Err(RecordError::Profile(ProfileError::InvalidAge(0)))
        ));

        let mut record = ProfileRecord::from_profile(&profile_with_scores());
        if let Some(entries) = record.scores.get_mut("math") {
            entries[0].total = 0;
        }
        let payload = serde_json::to_string(&record).unwrap();
        assert!(matches!(
            decode_profile(&payload),
            Err(RecordError::Score(ScoreRecordError::ZeroTotal))
        ));
    }

    #[test]
    fn corrupt_payload_is_discarded() {
        assert!(decode_or_discard("{not json").is_none());
        assert!(decode_or_discard("{\"name\":\"x\"}").is_none());
    }
}
