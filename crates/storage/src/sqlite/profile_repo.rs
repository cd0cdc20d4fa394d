use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use tracing::{debug, warn};

use quiz_core::model::Profile;

use super::{PROFILE_KEY, SqliteRepository};
use crate::record::{SCHEMA_VERSION, decode_or_discard, encode_profile};
use crate::repository::{ProfileStore, StorageError};

#[async_trait]
impl ProfileStore for SqliteRepository {
    async fn load(&self) -> Result<Option<Profile>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT schema_version, payload
            FROM profiles
            WHERE key = ?1
            ",
        )
        .bind(PROFILE_KEY)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let payload: String = match row.try_get("payload") {
            Ok(payload) => payload,
            Err(err) => {
                warn!(error = %err, "profile row has no readable payload");
                return Ok(None);
            }
        };
        if let Ok(version) = row.try_get::<i64, _>("schema_version") {
            debug!(schema_version = version, "loaded profile row");
        }

        Ok(decode_or_discard(&payload))
    }

    async fn save(&self, profile: &Profile) -> Result<(), StorageError> {
        let payload = encode_profile(profile)?;

        sqlx::query(
            r"
            INSERT INTO profiles (key, schema_version, payload, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(key) DO UPDATE SET
                schema_version = excluded.schema_version,
                payload = excluded.payload,
                updated_at = excluded.updated_at
            ",
        )
        .bind(PROFILE_KEY)
        .bind(i64::from(SCHEMA_VERSION))
        .bind(payload)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }
}
