//! Authentication middleware

use crate::api::handlers::AppState;
use crate::core::error::{ChapterError, Result};
use crate::db::models::is_admin;
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Authenticated user stored in request extensions
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: i64,
    pub email: String,
    pub user_type: String,
}

impl AuthUser {
    /// Fail with `PermissionDenied` unless this user is an administrator
    pub fn require_admin(&self) -> Result<()> {
        if is_admin(&self.user_type) {
            Ok(())
        } else {
            Err(ChapterError::PermissionDenied("Admin access required".to_string()))
        }
    }
}

/// Bearer token from the Authorization header; the scheme name is case-insensitive
fn extract_token(request: &Request) -> Option<&str> {
    let value = request.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;

    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

/// Authentication middleware
///
/// Validates the token, then reloads the user so that deleted accounts and
/// role changes take effect before the token expires.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = match extract_token(&request) {
        Some(t) => t.to_string(),
        None => {
            return ChapterError::AuthenticationError("Missing authentication token".to_string())
                .into_response();
        }
    };

    let user_id = match state.tokens.validate(&token).and_then(|claims| claims.user_id()) {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };

    let user = match state.users.find_by_id(user_id).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            return ChapterError::AuthenticationError("User not found".to_string())
                .into_response();
        }
        Err(e) => return e.into_response(),
    };

    request.extensions_mut().insert(AuthUser {
        id: user.id,
        email: user.email,
        user_type: user.user_type,
    });

    next.run(request).await
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ChapterError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| ChapterError::AuthenticationError("User not authenticated".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::TokenIssuer;
    use crate::core::config::Config;
    use crate::db::models::{NewUser, USER_TYPE_REGULAR};
    use crate::db::{DatabaseManager, SqliteUserRepository, UserRepository};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        middleware,
        routing::get,
        Router,
    };
    use std::sync::Arc;
    use tower::util::ServiceExt;

    async fn whoami(user: AuthUser) -> String {
        user.email
    }

    async fn setup() -> (Router, AppState, i64) {
        let users = Arc::new(SqliteUserRepository::new(Arc::new(
            DatabaseManager::new_in_memory().unwrap(),
        )));
        let created = users
            .create(NewUser {
                email: "leitor@chapter.com".to_string(),
                password: "1234".to_string(),
                user_type: USER_TYPE_REGULAR.to_string(),
            })
            .await
            .unwrap();

        let config = Config::defaults().unwrap();
        let state = AppState::new(users, Arc::new(TokenIssuer::new(&config.jwt)));

        let app = Router::new()
            .route("/whoami", get(whoami))
            .layer(middleware::from_fn_with_state(state.clone(), authenticate))
            .with_state(state.clone());

        (app, state, created.id)
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let (app, _, _) = setup().await;
        let response = app
            .oneshot(Request::builder().uri("/whoami").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_bearer_header_accepted() {
        let (app, state, id) = setup().await;
        let user = state.users.find_by_id(id).await.unwrap().unwrap();
        let token = state.tokens.issue(&user).unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/whoami")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "leitor@chapter.com");
    }

    #[tokio::test]
    async fn test_scheme_is_case_insensitive() {
        let (app, state, id) = setup().await;
        let user = state.users.find_by_id(id).await.unwrap().unwrap();
        let token = state.tokens.issue(&user).unwrap();

        for scheme in ["bearer", "BEARER"] {
            let response = app
                .clone()
                .oneshot(
                    Request::builder()
                        .uri("/whoami")
                        .header(header::AUTHORIZATION, format!("{} {}", scheme, token))
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn test_query_token_is_ignored() {
        let (app, state, id) = setup().await;
        let user = state.users.find_by_id(id).await.unwrap().unwrap();
        let token = state.tokens.issue(&user).unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/whoami?token={}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_other_schemes_rejected() {
        let (app, _, _) = setup().await;
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/whoami")
                    .header(header::AUTHORIZATION, "Basic YWRtaW46YWRtaW4=")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_garbage_token_is_unauthorized() {
        let (app, _, _) = setup().await;
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/whoami")
                    .header(header::AUTHORIZATION, "Bearer abc.def.ghi")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_deleted_user_loses_access() {
        let (app, state, id) = setup().await;
        let user = state.users.find_by_id(id).await.unwrap().unwrap();
        let token = state.tokens.issue(&user).unwrap();
        state.users.delete(id).await.unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/whoami")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_require_admin() {
        let mut user = AuthUser {
            id: 1,
            email: "admin@chapter.com".to_string(),
            user_type: "1".to_string(),
        };
        assert!(user.require_admin().is_ok());

        user.user_type = "0".to_string();
        assert!(matches!(user.require_admin(), Err(ChapterError::PermissionDenied(_))));
    }
}
