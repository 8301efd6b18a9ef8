pub mod auth;
pub mod gate;
pub mod response;

pub use auth::{clear_session_cookie, extract_session_token, require_session, session_cookie};
pub use gate::access_gate_middleware;
pub use response::{ApiResponse, ApiResult};
