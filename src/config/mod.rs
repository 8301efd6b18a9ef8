use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub security: SecurityConfig,
    pub routes: RouteConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

/// Which profile store backs the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreKind {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub store: StoreKind,
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub enable_query_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_audience: Option<String>,
    pub session_cookie: String,
    pub session_ttl_secs: u64,
    pub identity_url: Option<String>,
    #[serde(skip_serializing)]
    pub identity_api_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    pub require_https: bool,
}

/// Static route sets consulted by the access gate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteConfig {
    pub public: Vec<String>,
    pub auth: Vec<String>,
    pub protected: Vec<String>,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            public: strings(&["/", "/home", "/events"]),
            auth: strings(&["/login", "/register", "/auth/callback"]),
            protected: strings(&["/dashboard", "/projects", "/teams", "/profile"]),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Some(port) = env::var("CTFC_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.server.port = port;
        }

        // Database overrides
        if let Ok(v) = env::var("PROFILE_STORE") {
            match v.to_ascii_lowercase().as_str() {
                "memory" => self.database.store = StoreKind::Memory,
                "postgres" | "pg" => self.database.store = StoreKind::Postgres,
                other => tracing::warn!("Ignoring unknown PROFILE_STORE '{}'", other),
            }
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_ENABLE_QUERY_LOGGING") {
            self.database.enable_query_logging = v.parse().unwrap_or(self.database.enable_query_logging);
        }

        // Auth overrides
        if let Ok(v) = env::var("AUTH_JWT_SECRET") {
            self.auth.jwt_secret = v;
        }
        if let Ok(v) = env::var("AUTH_JWT_AUDIENCE") {
            self.auth.jwt_audience = if v.trim().is_empty() { None } else { Some(v) };
        }
        if let Ok(v) = env::var("AUTH_SESSION_COOKIE") {
            self.auth.session_cookie = v;
        }
        if let Ok(v) = env::var("AUTH_SESSION_TTL_SECS") {
            self.auth.session_ttl_secs = v.parse().unwrap_or(self.auth.session_ttl_secs);
        }
        if let Ok(v) = env::var("IDENTITY_URL") {
            self.auth.identity_url = Some(v);
        }
        if let Ok(v) = env::var("IDENTITY_API_KEY") {
            self.auth.identity_api_key = v;
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = split_list(&v);
        }
        if let Ok(v) = env::var("SECURITY_REQUIRE_HTTPS") {
            self.security.require_https = v.parse().unwrap_or(self.security.require_https);
        }

        // Route set overrides
        if let Ok(v) = env::var("ROUTES_PUBLIC") {
            self.routes.public = split_list(&v);
        }
        if let Ok(v) = env::var("ROUTES_AUTH") {
            self.routes.auth = split_list(&v);
        }
        if let Ok(v) = env::var("ROUTES_PROTECTED") {
            self.routes.protected = split_list(&v);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig { port: 3000 },
            database: DatabaseConfig {
                store: StoreKind::Postgres,
                url: None,
                max_connections: 10,
                connection_timeout: 30,
                enable_query_logging: true,
            },
            auth: AuthConfig {
                jwt_secret: "ctf-connect-development-secret".to_string(),
                jwt_audience: Some("authenticated".to_string()),
                session_cookie: "ctfc-access-token".to_string(),
                session_ttl_secs: 60 * 60 * 24 * 7, // 1 week
                identity_url: None,
                identity_api_key: String::new(),
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                require_https: false,
            },
            routes: RouteConfig::default(),
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig { port: 3000 },
            database: DatabaseConfig {
                store: StoreKind::Postgres,
                url: None,
                max_connections: 20,
                connection_timeout: 10,
                enable_query_logging: true,
            },
            auth: AuthConfig {
                jwt_secret: String::new(),
                jwt_audience: Some("authenticated".to_string()),
                session_cookie: "ctfc-access-token".to_string(),
                session_ttl_secs: 60 * 60 * 24,
                identity_url: None,
                identity_api_key: String::new(),
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.ctfconnect.dev".to_string()],
                require_https: true,
            },
            routes: RouteConfig::default(),
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig { port: 3000 },
            database: DatabaseConfig {
                store: StoreKind::Postgres,
                url: None,
                max_connections: 50,
                connection_timeout: 5,
                enable_query_logging: false,
            },
            auth: AuthConfig {
                jwt_secret: String::new(),
                jwt_audience: Some("authenticated".to_string()),
                session_cookie: "ctfc-access-token".to_string(),
                session_ttl_secs: 60 * 60 * 4,
                identity_url: None,
                identity_api_key: String::new(),
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://ctfconnect.dev".to_string()],
                require_https: true,
            },
            routes: RouteConfig::default(),
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_production {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Production)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert!(!config.auth.jwt_secret.is_empty());
        assert_eq!(config.database.store, StoreKind::Postgres);
        assert!(!config.security.require_https);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(config.auth.jwt_secret.is_empty());
        assert!(config.security.require_https);
        assert_eq!(config.auth.session_ttl_secs, 4 * 3600);
    }

    #[test]
    fn test_default_route_sets() {
        let routes = RouteConfig::default();
        assert!(routes.public.iter().any(|r| r == "/home"));
        assert!(routes.auth.iter().any(|r| r == "/auth/callback"));
        assert_eq!(routes.protected.len(), 4);
    }

    #[test]
    fn test_split_list_trims_and_drops_blanks() {
        assert_eq!(split_list(" /a, /b ,,"), vec!["/a".to_string(), "/b".to_string()]);
    }
}
