//! Authentication API handlers

use crate::api::extract::AppJson;
use crate::api::handlers::AppState;
use crate::auth::middleware::AuthUser;
use crate::auth::models::{LoginRequest, LoginResponse, UserInfo};
use crate::core::error::{ChapterError, Result};
use axum::{extract::State, Json};

/// Handler for POST /api/login - User login
///
/// Credential checking belongs to the repository; this only branches on
/// whether a user came back.
pub async fn login(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<LoginResponse> {
    tracing::info!(email = %req.email, "Login attempt");

    let user = match state.users.login(&req.email, &req.password).await? {
        Some(user) => user,
        None => {
            tracing::warn!(email = %req.email, "Login rejected");
            return Err(ChapterError::AuthenticationError(
                "Invalid email or password".to_string(),
            ));
        }
    };

    let token = state.tokens.issue(&user)?;

    tracing::info!(user_id = user.id, user_type = %user.user_type, "Login successful");

    Ok(LoginResponse { token })
}

/// Handler for GET /api/me - Get current user info
pub async fn get_me(user: AuthUser) -> Json<UserInfo> {
    tracing::debug!(user_id = user.id, "Getting current user info");

    Json(UserInfo {
        id: user.id,
        email: user.email,
        user_type: user.user_type,
    })
}
