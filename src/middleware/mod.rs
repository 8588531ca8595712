pub mod auth;
pub mod body_limit;

pub use auth::{jwt_auth_middleware, AuthUser};
pub use body_limit::{envelope_payload_too_large, BODY_TOO_LARGE};
