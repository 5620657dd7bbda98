//! Chapter WebAPI Library
//!
//! Login over a pluggable user repository, issuing signed JWTs, plus the
//! user administration endpoints and the HTTP server that hosts them.

pub mod api;
pub mod auth;
pub mod core;
pub mod db;

// Re-export commonly used types
pub use api::ApiServer;
pub use auth::{LoginRequest, LoginResponse, TokenIssuer};
pub use crate::core::{ChapterError, Config};
pub use db::{DatabaseManager, SqliteUserRepository, User, UserRepository};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
