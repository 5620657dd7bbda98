pub mod users;

pub use users::*;

use crate::auth::jwt::TokenIssuer;
use crate::db::repository::UserRepository;
use std::sync::Arc;

/// Shared application state for handlers
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub tokens: Arc<TokenIssuer>,
}

impl AppState {
    pub fn new(users: Arc<dyn UserRepository>, tokens: Arc<TokenIssuer>) -> Self {
        Self { users, tokens }
    }
}
