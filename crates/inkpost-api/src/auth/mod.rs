// Authentication: token codec, request gates, and auth routes

pub mod config;
pub mod jwt;
pub mod middleware;
pub mod routes;

pub use config::AuthConfig;
pub use jwt::TokenService;
pub use middleware::{AdminUser, AuthUser, MaybeUser};
pub use routes::routes;
