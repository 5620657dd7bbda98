//! API routes

use crate::api::handlers::{create_user, delete_user, get_user, list_users, update_user, AppState};
use crate::auth::handlers::{get_me, login};
use crate::auth::middleware::authenticate;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};

/// Build the API routes
pub fn build_api_routes(state: AppState) -> Router {
    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/login", post(login))
        .route("/api/Login", post(login));

    // Protected routes (bearer token required)
    let protected_routes = Router::new()
        .route("/api/me", get(get_me))
        .route("/api/users", get(list_users).post(create_user))
        .route(
            "/api/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .layer(middleware::from_fn_with_state(state.clone(), authenticate));

    public_routes
        .merge(protected_routes)
        .with_state(state)
}
