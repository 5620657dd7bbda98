use crate::api::extract::AppJson;
use crate::api::models::{
    validate_email, validate_password, validate_user_type, CreateUserRequest, UpdateUserRequest,
    UserActionResponse,
};
use crate::auth::middleware::AuthUser;
use crate::auth::models::UserInfo;
use crate::core::error::{ChapterError, Result};
use crate::db::models::{normalize_email, NewUser, USER_TYPE_REGULAR};
use crate::db::repository::UserChanges;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use super::AppState;

/// Handler for GET /api/users - Get all users (admin only)
pub async fn list_users(
    State(state): State<AppState>,
    admin: AuthUser,
) -> Result<Json<Vec<UserInfo>>> {
    admin.require_admin()?;

    let users = state.users.find_all().await?;
    Ok(Json(users.into_iter().map(UserInfo::from).collect()))
}

/// Handler for GET /api/users/:id - Get one user (admin only)
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    admin: AuthUser,
) -> Result<Json<UserInfo>> {
    admin.require_admin()?;

    let user = state.users.find_by_id(user_id).await?
        .ok_or_else(|| ChapterError::NotFound(format!("User {} not found", user_id)))?;

    Ok(Json(UserInfo::from(user)))
}

/// Handler for POST /api/users - Create new user (admin only)
pub async fn create_user(
    State(state): State<AppState>,
    admin: AuthUser,
    AppJson(req): AppJson<CreateUserRequest>,
) -> Result<impl IntoResponse> {
    admin.require_admin()?;

    validate_email(&req.email)?;
    validate_password(&req.password)?;
    let user_type = req.user_type.unwrap_or_else(|| USER_TYPE_REGULAR.to_string());
    validate_user_type(&user_type)?;

    if state.users.find_by_email(&req.email).await?.is_some() {
        return Err(ChapterError::Conflict(format!(
            "Email '{}' is already registered",
            normalize_email(&req.email)
        )));
    }

    let user = state.users.create(NewUser {
        email: req.email,
        password: req.password,
        user_type,
    }).await?;

    tracing::info!(admin_id = admin.id, user_id = user.id, "User created");

    Ok((
        StatusCode::CREATED,
        Json(UserActionResponse {
            message: "User created successfully".to_string(),
            user: UserInfo::from(user),
        }),
    ))
}

/// Handler for PUT /api/users/:id - Update user (admin only)
pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    admin: AuthUser,
    AppJson(req): AppJson<UpdateUserRequest>,
) -> Result<Json<UserActionResponse>> {
    admin.require_admin()?;

    if let Some(email) = &req.email {
        validate_email(email)?;

        if let Some(existing) = state.users.find_by_email(email).await? {
            if existing.id != user_id {
                return Err(ChapterError::Conflict(format!(
                    "Email '{}' is already registered",
                    existing.email
                )));
            }
        }
    }
    if let Some(password) = &req.password {
        validate_password(password)?;
    }
    if let Some(user_type) = &req.user_type {
        validate_user_type(user_type)?;
    }

    let user = state.users.update(user_id, UserChanges {
        email: req.email,
        password: req.password,
        user_type: req.user_type,
    }).await?
        .ok_or_else(|| ChapterError::NotFound(format!("User {} not found", user_id)))?;

    tracing::info!(admin_id = admin.id, user_id = user.id, "User updated");

    Ok(Json(UserActionResponse {
        message: "User updated successfully".to_string(),
        user: UserInfo::from(user),
    }))
}

/// Handler for DELETE /api/users/:id - Delete user (admin only)
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    admin: AuthUser,
) -> Result<StatusCode> {
    admin.require_admin()?;

    if admin.id == user_id {
        return Err(ChapterError::ValidationError(
            "Cannot delete your own account".to_string()
        ));
    }

    if !state.users.delete(user_id).await? {
        return Err(ChapterError::NotFound(format!("User {} not found", user_id)));
    }

    tracing::info!(admin_id = admin.id, user_id, "User deleted");

    Ok(StatusCode::NO_CONTENT)
}
