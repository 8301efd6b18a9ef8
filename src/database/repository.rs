use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::profile::{option_array, option_text, Profile, ProfileRow, ProfileUpdate};
use crate::database::store::{ProfileStore, StoreError};

const PROFILE_COLUMNS: &str = r#"
    id, email, onboarding_completed, skill_level, ctf_experience,
    interests, preferred_roles, preferred_team_size, availability,
    communication_style, learning_goals, time_zone, created_at, updated_at
"#;

/// Postgres-backed profile store over the `profiles` table
#[derive(Clone)]
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn into_profile(row: ProfileRow) -> Result<Profile, StoreError> {
        let id = row.id;
        Profile::try_from(row).map_err(|source| {
            tracing::error!("Profile {} holds an unknown option value: {}", id, source);
            StoreError::Corrupt { id, source }
        })
    }

    fn bind_update<'q>(
        query: sqlx::query::QueryAs<'q, sqlx::Postgres, ProfileRow, sqlx::postgres::PgArguments>,
        update: &'q ProfileUpdate,
    ) -> sqlx::query::QueryAs<'q, sqlx::Postgres, ProfileRow, sqlx::postgres::PgArguments> {
        query
            .bind(option_text(&update.skill_level))
            .bind(option_text(&update.ctf_experience))
            .bind(option_array(&update.interests))
            .bind(option_array(&update.preferred_roles))
            .bind(option_text(&update.preferred_team_size))
            .bind(option_text(&update.availability))
            .bind(option_text(&update.communication_style))
            .bind(option_array(&update.learning_goals))
            .bind(option_text(&update.time_zone))
            .bind(update.onboarding_completed)
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>, StoreError> {
        let query = format!("SELECT {} FROM profiles WHERE id = $1", PROFILE_COLUMNS);

        let row = sqlx::query_as::<_, ProfileRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::into_profile).transpose()
    }

    async fn ensure_profile(&self, id: Uuid, email: Option<&str>) -> Result<Profile, StoreError> {
        let inserted = sqlx::query(
            "INSERT INTO profiles (id, email, onboarding_completed) VALUES ($1, $2, FALSE) ON CONFLICT (id) DO NOTHING",
        )
        .bind(id)
        .bind(email)
        .execute(&self.pool)
        .await?;

        if inserted.rows_affected() > 0 {
            tracing::info!("Created profile for user {}", id);
        }

        self.get_profile(id).await?.ok_or(StoreError::NotFound(id))
    }

    async fn upsert_profile(&self, id: Uuid, update: &ProfileUpdate) -> Result<Profile, StoreError> {
        // $11 carries the completion flag; a stored TRUE always wins
        let query = format!(
            r#"
            INSERT INTO profiles (
                id, skill_level, ctf_experience, interests, preferred_roles,
                preferred_team_size, availability, communication_style,
                learning_goals, time_zone, onboarding_completed
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, COALESCE($11, FALSE))
            ON CONFLICT (id) DO UPDATE SET
                skill_level = COALESCE(EXCLUDED.skill_level, profiles.skill_level),
                ctf_experience = COALESCE(EXCLUDED.ctf_experience, profiles.ctf_experience),
                interests = COALESCE(EXCLUDED.interests, profiles.interests),
                preferred_roles = COALESCE(EXCLUDED.preferred_roles, profiles.preferred_roles),
                preferred_team_size = COALESCE(EXCLUDED.preferred_team_size, profiles.preferred_team_size),
                availability = COALESCE(EXCLUDED.availability, profiles.availability),
                communication_style = COALESCE(EXCLUDED.communication_style, profiles.communication_style),
                learning_goals = COALESCE(EXCLUDED.learning_goals, profiles.learning_goals),
                time_zone = COALESCE(EXCLUDED.time_zone, profiles.time_zone),
                onboarding_completed = profiles.onboarding_completed OR EXCLUDED.onboarding_completed,
                updated_at = now()
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        );

        let row = Self::bind_update(sqlx::query_as::<_, ProfileRow>(&query).bind(id), update)
            .fetch_one(&self.pool)
            .await?;

        Self::into_profile(row)
    }

    async fn update_profile(&self, id: Uuid, update: &ProfileUpdate) -> Result<Profile, StoreError> {
        let query = format!(
            r#"
            UPDATE profiles SET
                skill_level = COALESCE($2, skill_level),
                ctf_experience = COALESCE($3, ctf_experience),
                interests = COALESCE($4, interests),
                preferred_roles = COALESCE($5, preferred_roles),
                preferred_team_size = COALESCE($6, preferred_team_size),
                availability = COALESCE($7, availability),
                communication_style = COALESCE($8, communication_style),
                learning_goals = COALESCE($9, learning_goals),
                time_zone = COALESCE($10, time_zone),
                onboarding_completed = onboarding_completed OR COALESCE($11, FALSE),
                updated_at = now()
            WHERE id = $1
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        );

        let row = Self::bind_update(sqlx::query_as::<_, ProfileRow>(&query).bind(id), update)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Self::into_profile(row),
            None => Err(StoreError::NotFound(id)),
        }
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        DatabaseManager::health_check(&self.pool).await?;
        Ok(())
    }
}
