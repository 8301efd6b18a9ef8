use serde::Serialize;

use crate::config::RouteConfig;

use super::Decision;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteClass {
    Root,
    Public,
    Auth,
    Protected,
    Other,
}

impl RouteClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteClass::Root => "root",
            RouteClass::Public => "public",
            RouteClass::Auth => "auth",
            RouteClass::Protected => "protected",
            RouteClass::Other => "other",
        }
    }
}

type Rule = (RouteClass, fn(&RouteTable, &str) -> bool);

/// Classification rules in evaluation order; the first match wins
const RULES: &[Rule] = &[
    (RouteClass::Root, RouteTable::is_root),
    (RouteClass::Public, RouteTable::is_public),
    (RouteClass::Auth, RouteTable::is_auth),
    (RouteClass::Protected, RouteTable::is_protected),
];

/// Route sets fixed at startup
#[derive(Debug, Clone)]
pub struct RouteTable {
    public: Vec<String>,
    auth: Vec<String>,
    protected: Vec<String>,
}

impl RouteTable {
    pub fn new(public: Vec<String>, auth: Vec<String>, protected: Vec<String>) -> Self {
        Self { public, auth, protected }
    }

    pub fn from_config(config: &RouteConfig) -> Self {
        Self::new(config.public.clone(), config.auth.clone(), config.protected.clone())
    }

    pub fn classify(&self, path: &str) -> RouteClass {
        RULES
            .iter()
            .find(|(_, matches)| matches(self, path))
            .map(|(class, _)| *class)
            .unwrap_or(RouteClass::Other)
    }

    /// Decision for paths whose outcome does not depend on the session
    pub fn static_decision(&self, path: &str) -> Option<Decision> {
        match self.classify(path) {
            RouteClass::Root => Some(Decision::RedirectHome),
            RouteClass::Public => Some(Decision::AllowPublic),
            RouteClass::Other => Some(Decision::AllowDefault),
            RouteClass::Auth | RouteClass::Protected => None,
        }
    }

    fn is_root(&self, path: &str) -> bool {
        path == "/"
    }

    fn is_public(&self, path: &str) -> bool {
        self.public
            .iter()
            .any(|route| path == route || path.strip_suffix('/') == Some(route.as_str()))
    }

    fn is_auth(&self, path: &str) -> bool {
        self.auth.iter().any(|route| path.starts_with(route.as_str()))
    }

    fn is_protected(&self, path: &str) -> bool {
        self.protected.iter().any(|route| path.starts_with(route.as_str()))
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::from_config(&RouteConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_default_routes() {
        let table = RouteTable::default();
        assert_eq!(table.classify("/"), RouteClass::Root);
        assert_eq!(table.classify("/home"), RouteClass::Public);
        assert_eq!(table.classify("/events/"), RouteClass::Public);
        assert_eq!(table.classify("/login"), RouteClass::Auth);
        assert_eq!(table.classify("/auth/callback"), RouteClass::Auth);
        assert_eq!(table.classify("/dashboard"), RouteClass::Protected);
        assert_eq!(table.classify("/teams/42"), RouteClass::Protected);
        assert_eq!(table.classify("/api/profile"), RouteClass::Other);
    }

    #[test]
    fn public_routes_do_not_match_by_prefix() {
        let table = RouteTable::default();
        assert_eq!(table.classify("/events/ctf-2024"), RouteClass::Other);
        assert_eq!(table.classify("/homepage"), RouteClass::Other);
    }

    #[test]
    fn root_wins_even_if_listed_elsewhere() {
        let table = RouteTable::new(vec!["/".to_string()], vec![], vec!["/".to_string()]);
        assert_eq!(table.classify("/"), RouteClass::Root);
        assert_eq!(table.classify("/anything"), RouteClass::Protected);
    }

    #[test]
    fn static_decisions_skip_session_dependent_classes() {
        let table = RouteTable::default();
        assert_eq!(table.static_decision("/"), Some(Decision::RedirectHome));
        assert_eq!(table.static_decision("/home/"), Some(Decision::AllowPublic));
        assert_eq!(table.static_decision("/unknown"), Some(Decision::AllowDefault));
        assert_eq!(table.static_decision("/profile"), None);
    }
}
