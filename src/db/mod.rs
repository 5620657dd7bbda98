//! Database module
//!
//! This module provides database management functionality including:
//! - Database connection pool management
//! - The user repository seam and its SQLite implementation
//! - Database migrations
//! - Data models and schemas

pub mod manager;
pub mod models;
pub mod repository;
pub mod migrations;

pub use manager::DatabaseManager;
pub use models::{NewUser, User};
pub use repository::{SqliteUserRepository, UserChanges, UserRepository};
