//! Authentication request/response models

use crate::db::models::User;
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Login request
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    #[serde(alias = "senha")]
    pub password: String,
}

/// Login response
///
/// Rendered as the plain-text body `{ token = <jwt> }`: splitting the body on
/// single spaces puts the token at index 3.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginResponse {
    pub token: String,
}

impl LoginResponse {
    /// Pull the token back out of a rendered login body
    pub fn token_from_body(body: &str) -> Option<&str> {
        body.split(' ').nth(3)
    }
}

impl fmt::Display for LoginResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{ token = {} }}", self.token)
    }
}

impl IntoResponse for LoginResponse {
    fn into_response(self) -> Response {
        (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.to_string(),
        )
            .into_response()
    }
}

/// User info (without password)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserInfo {
    pub id: i64,
    pub email: String,
    pub user_type: String,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            user_type: user.user_type,
        }
    }
}
