use async_trait::async_trait;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::profile::{Profile, ProfileUpdate};
use crate::types::UnknownOption;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Profile not found: {0}")]
    NotFound(Uuid),

    #[error("Stored profile {id} is invalid: {source}")]
    Corrupt {
        id: Uuid,
        #[source]
        source: UnknownOption,
    },

    #[error("Profile store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(DatabaseError::Sqlx(err))
    }
}

/// Keyed profile records; the key is the identity provider's user id
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>, StoreError>;

    /// Insert an empty, not-yet-onboarded profile unless one exists
    async fn ensure_profile(&self, id: Uuid, email: Option<&str>) -> Result<Profile, StoreError>;

    /// Insert or merge; absent fields keep their stored value
    async fn upsert_profile(&self, id: Uuid, update: &ProfileUpdate) -> Result<Profile, StoreError>;

    /// Merge into an existing row, `NotFound` otherwise
    async fn update_profile(&self, id: Uuid, update: &ProfileUpdate) -> Result<Profile, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}
