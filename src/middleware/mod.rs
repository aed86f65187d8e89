pub mod auth;
pub mod response;

pub use auth::{resolve_principal, AuthContext};
pub use response::{ApiResponse, ApiResult};
