use crate::auth::models::UserInfo;
use crate::core::error::{ChapterError, Result};
use crate::db::models::{USER_TYPE_ADMIN, USER_TYPE_REGULAR};
use serde::{Deserialize, Serialize};

// User Management API models

/// Request body for creating a user
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    #[serde(alias = "senha")]
    pub password: String,
    #[serde(default, alias = "tipo")]
    pub user_type: Option<String>,
}

/// Request body for updating a user
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    #[serde(alias = "senha")]
    pub password: Option<String>,
    #[serde(alias = "tipo")]
    pub user_type: Option<String>,
}

/// Response for create/update operations
#[derive(Debug, Serialize, Deserialize)]
pub struct UserActionResponse {
    pub message: String,
    pub user: UserInfo,
}

/// Minimal shape check; the database enforces uniqueness
pub fn validate_email(email: &str) -> Result<()> {
    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(ChapterError::ValidationError(format!("'{}' is not a valid email", email)))
    }
}

pub fn validate_password(password: &str) -> Result<()> {
    if password.is_empty() {
        return Err(ChapterError::ValidationError("password cannot be empty".to_string()));
    }
    Ok(())
}

pub fn validate_user_type(user_type: &str) -> Result<()> {
    if user_type == USER_TYPE_ADMIN || user_type == USER_TYPE_REGULAR {
        Ok(())
    } else {
        Err(ChapterError::ValidationError(format!(
            "user_type must be '{}' or '{}'",
            USER_TYPE_REGULAR, USER_TYPE_ADMIN
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("email@email.com").is_ok());
        assert!(validate_email(" batata@email.com ").is_ok());
        assert!(validate_email("batata").is_err());
        assert!(validate_email("@email.com").is_err());
        assert!(validate_email("batata@localhost").is_err());
    }

    #[test]
    fn test_validate_user_type() {
        assert!(validate_user_type("0").is_ok());
        assert!(validate_user_type("1").is_ok());
        assert!(validate_user_type("2").is_err());
    }

    #[test]
    fn test_create_request_accepts_original_field_names() {
        let req: CreateUserRequest =
            serde_json::from_str(r#"{"email":"a@chapter.com","senha":"x","tipo":"1"}"#).unwrap();
        assert_eq!(req.password, "x");
        assert_eq!(req.user_type.as_deref(), Some("1"));
    }
}
