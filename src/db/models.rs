//! Database models
//!
//! Data structures representing database tables

use serde::{Deserialize, Serialize};

/// Role code of an administrator
pub const USER_TYPE_ADMIN: &str = "1";

/// Role code of a regular user
pub const USER_TYPE_REGULAR: &str = "0";

/// User record in the database
///
/// `password` holds whatever the repository stores for comparison; the
/// SQLite repository keeps a bcrypt hash there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub user_type: String,
}

/// Whether a role code grants administrator access
pub fn is_admin(user_type: &str) -> bool {
    user_type == USER_TYPE_ADMIN
}

/// Data needed to insert a user; the id is assigned by the database
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    /// Plain-text password, hashed by the repository before storing
    pub password: String,
    pub user_type: String,
}

/// Normalize an email address for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
