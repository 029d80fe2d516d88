//! Middleware del sistema
//!
//! Este módulo contiene el middleware de autenticación, resolución de
//! empresa y CORS.

pub mod auth;
pub mod cors;
pub mod tenant;

pub use auth::{auth_middleware, AuthUser};
pub use cors::cors_layer;
pub use tenant::{tenant_middleware, RequestContext};
