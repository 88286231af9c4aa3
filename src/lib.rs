// Auth Session - Library root

pub mod auth;
pub mod config;
pub mod error;
pub mod http_client;

pub use auth::{AuthSessionManager, AuthStatus, User};
pub use error::AuthError;
