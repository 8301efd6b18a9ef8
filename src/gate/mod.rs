//! Per-request access gate.
//!
//! Every request path is classified against the configured route sets and
//! mapped to exactly one [`Decision`]. Sessions are only validated for auth
//! and protected paths.

pub mod routes;

use std::sync::Arc;

use serde::Serialize;

use crate::auth::{current_session, IdentityProvider, Session};
use crate::database::ProfileStore;
use crate::onboarding::{is_completed, DASHBOARD_PATH, HOME_PATH, LOGIN_PATH, ONBOARDING_PATH};

pub use routes::{RouteClass, RouteTable};

/// Outcome of gating one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    RedirectHome,
    AllowPublic,
    RedirectDashboard,
    AllowAuth,
    RedirectLogin { from: String },
    RedirectOnboarding,
    AllowProtected,
    AllowDefault,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::RedirectHome => "redirect_home",
            Decision::AllowPublic => "allow_public",
            Decision::RedirectDashboard => "redirect_dashboard",
            Decision::AllowAuth => "allow_auth",
            Decision::RedirectLogin { .. } => "redirect_login",
            Decision::RedirectOnboarding => "redirect_onboarding",
            Decision::AllowProtected => "allow_protected",
            Decision::AllowDefault => "allow_default",
        }
    }

    /// Location to redirect to, `None` when the request may proceed
    pub fn redirect_target(&self) -> Option<String> {
        match self {
            Decision::RedirectHome => Some(HOME_PATH.to_string()),
            Decision::RedirectDashboard => Some(DASHBOARD_PATH.to_string()),
            Decision::RedirectLogin { from } => Some(login_redirect(from)),
            Decision::RedirectOnboarding => Some(ONBOARDING_PATH.to_string()),
            Decision::AllowPublic | Decision::AllowAuth | Decision::AllowProtected | Decision::AllowDefault => None,
        }
    }

    pub fn is_allowed(&self) -> bool {
        self.redirect_target().is_none()
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `/login?redirectedFrom=<path>`, keeping `/` literal in the query value
pub fn login_redirect(from: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(from.as_bytes()).collect();
    format!("{}?redirectedFrom={}", LOGIN_PATH, encoded.replace("%2F", "/"))
}

#[derive(Debug, Clone)]
pub struct Evaluation {
    pub decision: Decision,
    /// Validated session, present only when the gate looked one up
    pub session: Option<Session>,
}

impl Evaluation {
    fn new(decision: Decision) -> Self {
        Self { decision, session: None }
    }
}

pub struct AccessGate {
    routes: RouteTable,
    identity: Arc<dyn IdentityProvider>,
    profiles: Arc<dyn ProfileStore>,
}

impl AccessGate {
    pub fn new(routes: RouteTable, identity: Arc<dyn IdentityProvider>, profiles: Arc<dyn ProfileStore>) -> Self {
        Self { routes, identity, profiles }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub async fn evaluate(&self, path: &str, token: Option<&str>) -> Evaluation {
        let evaluation = match self.routes.classify(path) {
            RouteClass::Root => Evaluation::new(Decision::RedirectHome),
            RouteClass::Public => Evaluation::new(Decision::AllowPublic),
            RouteClass::Auth => match self.session(token).await {
                Some(_) => Evaluation::new(Decision::RedirectDashboard),
                None => Evaluation::new(Decision::AllowAuth),
            },
            RouteClass::Protected => self.evaluate_protected(path, token).await,
            RouteClass::Other => Evaluation::new(Decision::AllowDefault),
        };

        tracing::debug!("Gate {} -> {}", path, evaluation.decision);
        evaluation
    }

    async fn evaluate_protected(&self, path: &str, token: Option<&str>) -> Evaluation {
        let login = || Evaluation::new(Decision::RedirectLogin { from: path.to_string() });

        let Some(session) = self.session(token).await else {
            return login();
        };

        if path == ONBOARDING_PATH {
            return Evaluation { decision: Decision::AllowProtected, session: Some(session) };
        }

        match is_completed(self.profiles.as_ref(), session.user_id).await {
            Ok(true) => Evaluation { decision: Decision::AllowProtected, session: Some(session) },
            Ok(false) => Evaluation::new(Decision::RedirectOnboarding),
            Err(e) => {
                tracing::error!("Onboarding state unavailable for {}: {}", session.user_id, e);
                login()
            }
        }
    }

    /// Validation failures degrade to "no session"
    async fn session(&self, token: Option<&str>) -> Option<Session> {
        match current_session(self.identity.as_ref(), token).await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("Rejected session token: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_redirect_keeps_slashes_literal() {
        assert_eq!(login_redirect("/dashboard"), "/login?redirectedFrom=/dashboard");
        assert_eq!(login_redirect("/teams/red team"), "/login?redirectedFrom=/teams/red+team");
        assert_eq!(login_redirect("/projects?id=1&x"), "/login?redirectedFrom=/projects%3Fid%3D1%26x");
    }

    #[test]
    fn only_redirects_have_targets() {
        assert_eq!(Decision::RedirectHome.redirect_target().as_deref(), Some("/home"));
        assert_eq!(Decision::RedirectOnboarding.redirect_target().as_deref(), Some("/onboarding"));
        assert!(Decision::AllowDefault.is_allowed());
        assert!(!Decision::RedirectLogin { from: "/teams".to_string() }.is_allowed());
    }
}
