use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use quiz_core::model::Profile;

use crate::record::{RecordError, decode_or_discard, encode_profile};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<RecordError> for StorageError {
    fn from(err: RecordError) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Boundary through which the engine reads and writes the player profile.
///
/// Implementations hold a single profile; the last `save` wins. A missing or
/// unreadable profile loads as `Ok(None)` so callers fall back to
/// registration; only transport failures surface as errors.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Load the stored profile, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the backend cannot be reached.
    async fn load(&self) -> Result<Option<Profile>, StorageError>;

    /// Persist the profile, replacing whatever was stored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the profile cannot be encoded or written.
    async fn save(&self, profile: &Profile) -> Result<(), StorageError>;
}

/// In-memory profile store for tests and prototyping.
///
/// Keeps the encoded payload rather than the domain value so every load goes
/// through the same codec as the durable backends.
#[derive(Clone, Default)]
pub struct InMemoryProfileStore {
    payload: Arc<Mutex<Option<String>>>,
}

impl InMemoryProfileStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with an arbitrary payload, valid or not.
    #[must_use]
    pub fn with_raw_payload(payload: impl Into<String>) -> Self {
        Self {
            payload: Arc::new(Mutex::new(Some(payload.into()))),
        }
    }

    /// Current raw payload, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn raw_payload(&self) -> Result<Option<String>, StorageError> {
        let guard = self
            .payload
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn load(&self) -> Result<Option<Profile>, StorageError> {
        Ok(self.raw_payload()?.as_deref().and_then(decode_or_discard))
    }

    async fn save(&self, profile: &Profile) -> Result<(), StorageError> {
        let encoded = encode_profile(profile)?;
        let mut guard = self
            .payload
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = Some(encoded);
        Ok(())
    }
}

/// Profile storage behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub profiles: Arc<dyn ProfileStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            profiles: Arc::new(InMemoryProfileStore::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Difficulty, Gender, ProfileDraft, ScoreRecord};
    use quiz_core::time::fixed_now;

    fn build_profile() -> Profile {
        Profile::register(ProfileDraft {
            name: "Alan Turing".into(),
            preferred_name: "Alan".into(),
            gender: Gender::Male,
            age: 41,
            avatar: None,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn empty_store_loads_none() {
        let store = InMemoryProfileStore::new();
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn round_trips_profile_with_history() {
        let store = InMemoryProfileStore::new();
        let mut profile = build_profile();
        profile.append_score(
            ScoreRecord::new("math", Difficulty::Medium, 12, 15, fixed_now()).unwrap(),
        );
        store.save(&profile).await.unwrap();

        let loaded = store.load().await.unwrap().expect("profile stored");
        assert_eq!(loaded, profile);
        assert_eq!(loaded.scores_for("math")[0].total(), 15);
    }

    #[tokio::test]
    async fn last_write_wins() {
        let store = InMemoryProfileStore::new();
        let first = build_profile();
        store.save(&first).await.unwrap();

        let mut second = first.clone();
        let mut draft = second.to_draft();
        draft.preferred_name = "Prof".into();
        second.update_identity(draft).unwrap();
        store.save(&second).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.preferred_name(), "Prof");
    }

    #[tokio::test]
    async fn corrupt_payload_loads_as_none() {
        let store = InMemoryProfileStore::with_raw_payload("{\"name\": 42");
        assert!(store.load().await.unwrap().is_none());
    }
}
