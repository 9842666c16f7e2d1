pub mod auth;
pub mod request;
pub mod response;

pub use auth::{jwt_auth_middleware, require_admin, AuthUser};
pub use request::{parse_id, ApiJson};
pub use response::{ApiResponse, ApiResult};
