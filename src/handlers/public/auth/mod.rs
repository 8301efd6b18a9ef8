// handlers/public/auth/mod.rs - session exchange with the identity provider

pub mod callback;
pub mod check_onboarding;
pub mod logout;

pub use callback::callback;
pub use check_onboarding::check_onboarding;
pub use logout::logout;
