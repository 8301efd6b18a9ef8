use std::time::Duration;

use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    ConnectOptions, PgPool,
};
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from DatabaseManager
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Migration failed: {0}")]
    MigrationError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

const MIGRATIONS: &[(&str, &str)] = &[
    (
        "create_profiles",
        r#"
        CREATE TABLE IF NOT EXISTS profiles (
            id UUID PRIMARY KEY,
            email TEXT,
            onboarding_completed BOOLEAN NOT NULL DEFAULT FALSE,
            skill_level TEXT,
            ctf_experience TEXT,
            interests TEXT[],
            preferred_roles TEXT[],
            preferred_team_size TEXT,
            availability TEXT,
            communication_style TEXT,
            learning_goals TEXT[],
            time_zone TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    ),
    (
        "index_profiles_onboarding",
        "CREATE INDEX IF NOT EXISTS profiles_onboarding_idx ON profiles (onboarding_completed)",
    ),
];

/// Connection pool construction and schema management for the profile database
pub struct DatabaseManager;

impl DatabaseManager {
    /// Connect a pool using DATABASE_URL and the configured limits
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let connection_string = Self::build_connection_string(config.url.as_deref())?;

        let mut options: PgConnectOptions = connection_string.parse()?;
        if !config.enable_query_logging {
            options = options.disable_statement_logging();
        }

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect_with(options)
            .await?;

        info!("Created database pool (max {} connections)", config.max_connections);
        Ok(pool)
    }

    fn build_connection_string(url: Option<&str>) -> Result<String, DatabaseError> {
        let base = url.ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;

        let url = url::Url::parse(base).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        match url.scheme() {
            "postgres" | "postgresql" => Ok(url.into()),
            _ => Err(DatabaseError::InvalidDatabaseUrl),
        }
    }

    /// Apply the idempotent schema migrations in order
    pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
        for (name, sql) in MIGRATIONS {
            sqlx::query(sql)
                .execute(pool)
                .await
                .map_err(|e| DatabaseError::MigrationError(format!("{}: {}", name, e)))?;
            info!("Applied migration: {}", name);
        }
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }
}
