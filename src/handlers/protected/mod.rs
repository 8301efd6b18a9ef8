// handlers/protected/mod.rs - Protected handlers (session required)
//
// Every route here sits behind `require_session`, which places the caller's
// `Session` in the request extensions.

pub mod dashboard;
pub mod onboarding;
pub mod profile;
