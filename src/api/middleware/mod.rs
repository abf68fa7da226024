//! API middleware components

pub mod admin_auth;
pub mod errors;
pub mod user_auth;

pub use admin_auth::RequireAdmin;
pub use errors::mask_internal_errors;
pub use user_auth::{extract_jwt_token, OptionalUser, RequireUser};
