use std::sync::Arc;

use axum::{
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::IdentityProvider;
use crate::config::{AppConfig, SecurityConfig};
use crate::database::ProfileStore;
use crate::gate::{AccessGate, RouteTable};
use crate::handlers::{protected, public};
use crate::middleware::{access_gate_middleware, require_session};

/// Shared per-process state handed to every handler and middleware
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub identity: Arc<dyn IdentityProvider>,
    pub profiles: Arc<dyn ProfileStore>,
    pub gate: Arc<AccessGate>,
}

impl AppState {
    pub fn new(config: AppConfig, identity: Arc<dyn IdentityProvider>, profiles: Arc<dyn ProfileStore>) -> Self {
        let gate = AccessGate::new(RouteTable::from_config(&config.routes), identity.clone(), profiles.clone());
        Self {
            config: Arc::new(config),
            identity,
            profiles,
            gate: Arc::new(gate),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.security);

    Router::new()
        // Public
        .route("/health", get(public::health))
        .route("/home", get(public::home))
        .route("/onboarding", get(public::onboarding_entry))
        // Session exchange
        .merge(auth_public_routes())
        // Session required
        .merge(protected_routes(state.clone()))
        .fallback(public::not_found)
        // Global middleware
        .layer(middleware::from_fn_with_state(state.clone(), access_gate_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_public_routes() -> Router<AppState> {
    use public::auth;

    Router::new()
        .route("/auth/callback", get(auth::callback))
        .route("/auth/check-onboarding", get(auth::check_onboarding))
        .route("/auth/logout", post(auth::logout))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::{dashboard, onboarding, profile};

    Router::new()
        .route("/dashboard", get(dashboard::dashboard))
        .route("/api/onboarding/steps", get(onboarding::steps))
        .route("/api/onboarding/step", post(onboarding::step))
        .route("/api/onboarding", post(onboarding::submit))
        .route("/api/profile", get(profile::profile_get).patch(profile::profile_patch))
        .route_layer(middleware::from_fn_with_state(state, require_session))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }

    if security.cors_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}
