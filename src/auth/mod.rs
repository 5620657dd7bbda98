//! Authentication module
//!
//! This module provides authentication functionality including:
//! - Login against the user repository
//! - JWT token generation and validation
//! - Password hashing and verification
//! - Authentication middleware

pub mod jwt;
pub mod password;
pub mod handlers;
pub mod middleware;
pub mod models;

pub use jwt::{read_claims, Claims, TokenIssuer};
pub use password::{hash_password, verify_password};
pub use middleware::{authenticate, AuthUser};
pub use handlers::{get_me, login};
pub use models::{LoginRequest, LoginResponse, UserInfo};
