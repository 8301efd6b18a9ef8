// handlers/public/mod.rs - Public handlers (no session required)
//
// Landing, health and onboarding-entry endpoints plus the session exchange
// under /auth/*. The access gate still runs in front of all of them.

pub mod auth;
pub mod pages;

pub use pages::{health, home, not_found, onboarding_entry};
