use std::sync::Arc;

use tracing::info;

use quiz_core::model::{Profile, ProfileDraft, ScoreSummary};
use storage::repository::ProfileStore;

use crate::error::ProfileServiceError;
use crate::score_aggregator::ScoreAggregator;

/// Registration and identity edits for the player profile.
#[derive(Clone)]
pub struct ProfileService {
    profiles: Arc<dyn ProfileStore>,
}

impl ProfileService {
    #[must_use]
    pub fn new(profiles: Arc<dyn ProfileStore>) -> Self {
        Self { profiles }
    }

    /// Create and persist a fresh profile with an empty score history.
    ///
    /// Any previously stored profile is replaced.
    ///
    /// # Errors
    ///
    /// Returns `ProfileServiceError::Profile` for validation failures.
    /// Returns `ProfileServiceError::Storage` if persistence fails.
    pub async fn register(&self, draft: ProfileDraft) -> Result<Profile, ProfileServiceError> {
        let profile = Profile::register(draft)?;
        self.profiles.save(&profile).await?;
        info!(preferred_name = profile.preferred_name(), "profile registered");
        Ok(profile)
    }

    /// Fetch the stored profile. `None` means registration is required.
    ///
    /// # Errors
    ///
    /// Returns `ProfileServiceError::Storage` if the store cannot be reached.
    pub async fn load(&self) -> Result<Option<Profile>, ProfileServiceError> {
        Ok(self.profiles.load().await?)
    }

    /// Replace the identity fields of the stored profile, keeping its history.
    ///
    /// # Errors
    ///
    /// Returns `ProfileServiceError::NotRegistered` if no profile is stored.
    /// Returns `ProfileServiceError::Profile` for validation failures.
    /// Returns `ProfileServiceError::Storage` if repository access fails.
    pub async fn update(&self, draft: ProfileDraft) -> Result<Profile, ProfileServiceError> {
        let mut profile = self
            .profiles
            .load()
            .await?
            .ok_or(ProfileServiceError::NotRegistered)?;
        profile.update_identity(draft)?;
        self.profiles.save(&profile).await?;
        info!(preferred_name = profile.preferred_name(), "profile updated");
        Ok(profile)
    }

    /// Score summary of the stored profile; zeros when nobody is registered.
    ///
    /// # Errors
    ///
    /// Returns `ProfileServiceError::Storage` if the store cannot be reached.
    pub async fn summary(&self) -> Result<ScoreSummary, ProfileServiceError> {
        Ok(self
            .load()
            .await?
            .map_or_else(ScoreSummary::empty, |profile| {
                ScoreAggregator::compute_summary(&profile)
            }))
    }
}
