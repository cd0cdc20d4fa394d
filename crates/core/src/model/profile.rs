use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::model::score::ScoreRecord;

pub const MIN_AGE: u8 = 1;
pub const MAX_AGE: u8 = 120;

/// Score history keyed by category, each sequence in completion order.
pub type ScoreHistory = BTreeMap<String, Vec<ScoreRecord>>;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProfileError {
    #[error("name cannot be empty")]
    EmptyName,

    #[error("preferred name cannot be empty")]
    EmptyPreferredName,

    #[error("age must be between {MIN_AGE} and {MAX_AGE}, got {0}")]
    InvalidAge(u32),

    #[error("avatar must be a URL or data URI")]
    InvalidAvatar,

    #[error("unknown gender: {0}")]
    InvalidGender(String),

    #[error("score history entry filed under `{expected}` belongs to `{found}`")]
    MisfiledScore { expected: String, found: String },
}

//
// ─── GENDER ────────────────────────────────────────────────────────────────────
//

const MALE_AVATARS: [&str; 3] = [
    "https://hebbkx1anhila5yf.public.blob.vercel-storage.com/Screenshot%202025-02-18%20232406-CCQgff3IYr65hgVPfJ09SNtV7k3AbK.png",
    "https://hebbkx1anhila5yf.public.blob.vercel-storage.com/Screenshot%202025-02-18%20232344-Erzli3VL7Aqy58KptACLt4JTXt8v1F.png",
    "https://hebbkx1anhila5yf.public.blob.vercel-storage.com/Super_kids_icons_cute_cartoon_characters_sketch_vector_10490328.jpg-MGuC1STZIQxFQeJCurrU6oLMVxC5Ak.jpeg",
];

const FEMALE_AVATARS: [&str; 3] = [
    "https://hebbkx1anhila5yf.public.blob.vercel-storage.com/Screenshot%202025-02-18%20232416-5UB8fTM0Gy2UBypykGnVzss5d5OuH8.png",
    "https://hebbkx1anhila5yf.public.blob.vercel-storage.com/Screenshot%202025-02-18%20232356-0vN8esHVbNnKGzvEW4CZEjZQLhlZKV.png",
    "https://hebbkx1anhila5yf.public.blob.vercel-storage.com/Screenshot%202025-02-18%20232426-c0MFoBu3AD4OQozTPsbPrTzvYu233H.png",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    /// Preset avatars offered for this gender.
    #[must_use]
    pub fn preset_avatars(self) -> &'static [&'static str] {
        match self {
            Gender::Male => &MALE_AVATARS,
            Gender::Female => &FEMALE_AVATARS,
        }
    }

    #[must_use]
    pub fn default_avatar(self) -> &'static str {
        self.preset_avatars()[0]
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            _ => Err(ProfileError::InvalidGender(s.to_string())),
        }
    }
}

//
// ─── PROFILE ───────────────────────────────────────────────────────────────────
//

/// Identity fields as entered by the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileDraft {
    pub name: String,
    pub preferred_name: String,
    pub gender: Gender,
    pub age: u32,
    /// `None` picks the gender's default preset.
    pub avatar: Option<String>,
}

/// Validated identity fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileIdentity {
    name: String,
    preferred_name: String,
    gender: Gender,
    age: u8,
    avatar: String,
}

impl ProfileDraft {
    /// Validate and normalize the draft.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError` if a name is blank, the age is outside
    /// `MIN_AGE..=MAX_AGE`, or the avatar does not parse as a URL.
    pub fn validate(self) -> Result<ProfileIdentity, ProfileError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(ProfileError::EmptyName);
        }
        let preferred_name = self.preferred_name.trim().to_string();
        if preferred_name.is_empty() {
            return Err(ProfileError::EmptyPreferredName);
        }

        let age = u8::try_from(self.age)
            .ok()
            .filter(|age| (MIN_AGE..=MAX_AGE).contains(age))
            .ok_or(ProfileError::InvalidAge(self.age))?;

        let avatar = self
            .avatar
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .unwrap_or_else(|| self.gender.default_avatar().to_string());
        if Url::parse(&avatar).is_err() {
            return Err(ProfileError::InvalidAvatar);
        }

        Ok(ProfileIdentity {
            name,
            preferred_name,
            gender: self.gender,
            age,
            avatar,
        })
    }
}

/// Durable player record: identity plus cumulative score history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    identity: ProfileIdentity,
    score_history: ScoreHistory,
}

impl Profile {
    /// Register a new profile with an empty history.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError` if the draft fails validation.
    pub fn register(draft: ProfileDraft) -> Result<Self, ProfileError> {
        Ok(Self {
            identity: draft.validate()?,
            score_history: ScoreHistory::new(),
        })
    }

    /// Rehydrate a profile from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError` if identity fields are invalid or a record is
    /// filed under a category other than its own.
    pub fn from_persisted(
        draft: ProfileDraft,
        score_history: ScoreHistory,
    ) -> Result<Self, ProfileError> {
        for (category, records) in &score_history {
            if let Some(record) = records.iter().find(|r| r.category() != category) {
                return Err(ProfileError::MisfiledScore {
                    expected: category.clone(),
                    found: record.category().to_string(),
                });
            }
        }

        Ok(Self {
            identity: draft.validate()?,
            score_history,
        })
    }

    /// Replace identity fields, keeping the score history.
    ///
    /// Switching gender while still on one of the previous gender's preset
    /// avatars moves the profile to the new gender's default preset; a custom
    /// avatar is kept.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError` if the draft fails validation; the profile is
    /// left unchanged in that case.
    pub fn update_identity(&mut self, mut draft: ProfileDraft) -> Result<(), ProfileError> {
        let previous = self.identity.gender;
        if draft.gender != previous
            && draft
                .avatar
                .as_deref()
                .is_some_and(|avatar| previous.preset_avatars().contains(&avatar))
        {
            draft.avatar = None;
        }
        self.identity = draft.validate()?;
        Ok(())
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.identity.name
    }

    #[must_use]
    pub fn preferred_name(&self) -> &str {
        &self.identity.preferred_name
    }

    #[must_use]
    pub fn gender(&self) -> Gender {
        self.identity.gender
    }

    #[must_use]
    pub fn age(&self) -> u8 {
        self.identity.age
    }

    #[must_use]
    pub fn avatar(&self) -> &str {
        &self.identity.avatar
    }

    #[must_use]
    pub fn score_history(&self) -> &ScoreHistory {
        &self.score_history
    }

    /// Records filed under `category`, oldest first.
    #[must_use]
    pub fn scores_for(&self, category: &str) -> &[ScoreRecord] {
        self.score_history
            .get(category)
            .map_or(&[], Vec::as_slice)
    }

    /// Append a completed session to its category, creating the category's
    /// history on first use.
    pub fn append_score(&mut self, record: ScoreRecord) {
        self.score_history
            .entry(record.category().to_string())
            .or_default()
            .push(record);
    }

    /// Iterate every record across all categories.
    pub fn all_scores(&self) -> impl Iterator<Item = &ScoreRecord> {
        self.score_history.values().flatten()
    }

    /// Draft holding the current identity, handy as a base for edits.
    #[must_use]
    pub fn to_draft(&self) -> ProfileDraft {
        ProfileDraft {
            name: self.identity.name.clone(),
            preferred_name: self.identity.preferred_name.clone(),
            gender: self.identity.gender,
            age: u32::from(self.identity.age),
            avatar: Some(self.identity.avatar.clone()),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Difficulty;
    use crate::time::fixed_now;

    fn draft() -> ProfileDraft {
        ProfileDraft {
            name: "Ada Lovelace".into(),
            preferred_name: "Ada".into(),
            gender: Gender::Female,
            age: 36,
            avatar: None,
        }
    }

    #[test]
    fn register_uses_gender_default_avatar() {
        let profile = Profile::register(draft()).unwrap();
        assert_eq!(profile.avatar(), Gender::Female.default_avatar());
        assert!(profile.score_history().is_empty());
    }

    #[test]
    fn accepts_data_uri_avatar() {
        let mut d = draft();
        d.avatar = Some("data:image/png;base64,iVBORw0KGgo=".into());
        let profile = Profile::register(d).unwrap();
        assert!(profile.avatar().starts_with("data:image/png"));
    }

    #[test]
    fn rejects_out_of_range_age() {
        let mut d = draft();
        d.age = 0;
        assert_eq!(Profile::register(d).unwrap_err(), ProfileError::InvalidAge(0));

        let mut d = draft();
        d.age = 121;
        assert_eq!(Profile::register(d).unwrap_err(), ProfileError::InvalidAge(121));

        let mut d = draft();
        d.age = 120;
        assert!(Profile::register(d).is_ok());
    }

    #[test]
    fn rejects_blank_names_and_bad_avatar() {
        let mut d = draft();
        d.name = " ".into();
        assert_eq!(Profile::register(d).unwrap_err(), ProfileError::EmptyName);

        let mut d = draft();
        d.preferred_name = String::new();
        assert_eq!(
            Profile::register(d).unwrap_err(),
            ProfileError::EmptyPreferredName
        );

        let mut d = draft();
        d.avatar = Some("not a url".into());
        assert_eq!(Profile::register(d).unwrap_err(), ProfileError::InvalidAvatar);
    }

    #[test]
    fn update_identity_keeps_history() {
        let mut profile = Profile::register(draft()).unwrap();
        let record = ScoreRecord::new("math", Difficulty::Easy, 8, 10, fixed_now()).unwrap();
        profile.append_score(record);

        let mut edit = profile.to_draft();
        edit.preferred_name = "Countess".into();
        profile.update_identity(edit).unwrap();

        assert_eq!(profile.preferred_name(), "Countess");
        assert_eq!(profile.scores_for("math").len(), 1);
    }

    #[test]
    fn gender_switch_moves_preset_avatar() {
        let mut profile = Profile::register(draft()).unwrap();
        let mut edit = profile.to_draft();
        edit.gender = Gender::Male;
        profile.update_identity(edit).unwrap();
        assert_eq!(profile.avatar(), Gender::Male.default_avatar());

        let mut edit = profile.to_draft();
        edit.avatar = Some("https://example.com/me.png".into());
        profile.update_identity(edit).unwrap();
        let mut edit = profile.to_draft();
        edit.gender = Gender::Female;
        profile.update_identity(edit).unwrap();
        assert_eq!(profile.avatar(), "https://example.com/me.png");
    }

    #[test]
    fn failed_update_leaves_profile_untouched() {
        let mut profile = Profile::register(draft()).unwrap();
        let mut edit = profile.to_draft();
        edit.age = 500;
        assert!(profile.update_identity(edit).is_err());
        assert_eq!(profile.age(), 36);
    }

    #[test]
    fn from_persisted_rejects_misfiled_records() {
        let record = ScoreRecord::new("math", Difficulty::Easy, 8, 10, fixed_now()).unwrap();
        let mut history = ScoreHistory::new();
        history.insert("science".into(), vec![record]);

        let err = Profile::from_persisted(draft(), history).unwrap_err();
        assert!(matches!(err, ProfileError::MisfiledScore { .. }));
    }

    #[test]
    fn gender_parses_case_insensitively() {
        assert_eq!("Male".parse::<Gender>().unwrap(), Gender::Male);
        assert!("other".parse::<Gender>().is_err());
    }
}
