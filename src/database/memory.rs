use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::models::profile::{Profile, ProfileUpdate};
use crate::database::store::{ProfileStore, StoreError};

/// In-process profile store with the same merge rules as the Postgres one
#[derive(Default)]
pub struct MemoryProfileStore {
    profiles: RwLock<HashMap<Uuid, Profile>>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent writes fail, as if the backing database were unavailable
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent reads fail
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub async fn insert(&self, profile: Profile) {
        self.profiles.write().await.insert(profile.id, profile);
    }

    pub async fn len(&self) -> usize {
        self.profiles.read().await.len()
    }

    fn check(flag: &AtomicBool, what: &str) -> Result<(), StoreError> {
        if flag.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("{} rejected by memory store", what)));
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>, StoreError> {
        Self::check(&self.fail_reads, "read")?;
        Ok(self.profiles.read().await.get(&id).cloned())
    }

    async fn ensure_profile(&self, id: Uuid, email: Option<&str>) -> Result<Profile, StoreError> {
        Self::check(&self.fail_writes, "write")?;
        let mut profiles = self.profiles.write().await;
        let profile = profiles.entry(id).or_insert_with(|| {
            tracing::info!("Created profile for user {}", id);
            Profile::new(id, email.map(str::to_string))
        });
        Ok(profile.clone())
    }

    async fn upsert_profile(&self, id: Uuid, update: &ProfileUpdate) -> Result<Profile, StoreError> {
        Self::check(&self.fail_writes, "write")?;
        let mut profiles = self.profiles.write().await;
        let profile = profiles.entry(id).or_insert_with(|| Profile::new(id, None));
        profile.apply(update);
        Ok(profile.clone())
    }

    async fn update_profile(&self, id: Uuid, update: &ProfileUpdate) -> Result<Profile, StoreError> {
        Self::check(&self.fail_writes, "write")?;
        let mut profiles = self.profiles.write().await;
        let profile = profiles.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        profile.apply(update);
        Ok(profile.clone())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Self::check(&self.fail_reads, "read")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SkillLevel, TeamSize};

    #[tokio::test]
    async fn ensure_profile_creates_once() {
        let store = MemoryProfileStore::new();
        let id = Uuid::new_v4();

        let first = store.ensure_profile(id, Some("a@example.com")).await.unwrap();
        assert!(!first.onboarding_completed);

        store
            .upsert_profile(id, &ProfileUpdate { onboarding_completed: Some(true), ..Default::default() })
            .await
            .unwrap();

        let second = store.ensure_profile(id, Some("b@example.com")).await.unwrap();
        assert!(second.onboarding_completed);
        assert_eq!(second.email.as_deref(), Some("a@example.com"));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn upsert_merges_and_update_requires_row() {
        let store = MemoryProfileStore::new();
        let id = Uuid::new_v4();

        let missing = store
            .update_profile(id, &ProfileUpdate { skill_level: Some(SkillLevel::Expert), ..Default::default() })
            .await;
        assert!(matches!(missing, Err(StoreError::NotFound(found)) if found == id));

        store
            .upsert_profile(id, &ProfileUpdate { skill_level: Some(SkillLevel::Expert), ..Default::default() })
            .await
            .unwrap();
        let merged = store
            .update_profile(id, &ProfileUpdate { preferred_team_size: Some(TeamSize::Small), ..Default::default() })
            .await
            .unwrap();

        assert_eq!(merged.skill_level, Some(SkillLevel::Expert));
        assert_eq!(merged.preferred_team_size, Some(TeamSize::Small));
    }

    #[tokio::test]
    async fn failing_writes_leave_rows_untouched() {
        let store = MemoryProfileStore::new();
        let id = Uuid::new_v4();
        store.ensure_profile(id, None).await.unwrap();

        store.set_fail_writes(true);
        let result = store
            .upsert_profile(id, &ProfileUpdate { onboarding_completed: Some(true), ..Default::default() })
            .await;
        assert!(result.is_err());

        let stored = store.get_profile(id).await.unwrap().unwrap();
        assert!(!stored.onboarding_completed);
    }
}
