pub mod auth;
pub mod response;

pub use auth::{require_admin_for_writes, require_session, Session};
pub use response::{ApiResponse, ApiResult};
