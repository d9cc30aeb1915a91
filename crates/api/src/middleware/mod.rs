//! Request middleware.

pub mod admin;
pub mod auth;
pub mod maintenance;

pub use admin::admin_middleware;
pub use auth::{AuthUser, auth_middleware, extract_bearer_token};
pub use maintenance::maintenance_middleware;
