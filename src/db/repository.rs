//! Repository pattern implementation for data access layer
//!
//! `UserRepository` is the seam the HTTP layer talks to; handlers only ever
//! hold an `Arc<dyn UserRepository>`, so tests can swap in their own doubles.

use crate::auth::password::{hash_password, verify_against_placeholder, verify_password};
use crate::core::error::{ChapterError, Result};
use crate::db::manager::DatabaseManager;
use crate::db::models::{normalize_email, NewUser, User};
use async_trait::async_trait;
use rusqlite::{OptionalExtension, Row};
use std::sync::Arc;

/// Partial update of a user; `None` leaves the column untouched
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    /// Plain-text password, hashed by the repository
    pub password: Option<String>,
    pub user_type: Option<String>,
}

/// Storage and credential lookup for users
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find the user matching both email and password, `None` when either is wrong
    async fn login(&self, email: &str, password: &str) -> Result<Option<User>>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn find_all(&self) -> Result<Vec<User>>;

    /// Insert a user; fails with `Conflict` when the email is taken
    async fn create(&self, user: NewUser) -> Result<User>;

    /// Apply `changes` to user `id`, returning the updated row or `None` if absent
    async fn update(&self, id: i64, changes: UserChanges) -> Result<Option<User>>;

    /// Delete user `id`, returning whether a row was removed
    async fn delete(&self, id: i64) -> Result<bool>;

    async fn count(&self) -> Result<i64>;
}

const USER_COLUMNS: &str = "id, email, password, user_type";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        password: row.get(2)?,
        user_type: row.get(3)?,
    })
}

fn map_unique_violation(e: rusqlite::Error, email: &str) -> ChapterError {
    if e.sqlite_error_code() == Some(rusqlite::ErrorCode::ConstraintViolation) {
        ChapterError::Conflict(format!("Email '{}' is already registered", email))
    } else {
        ChapterError::DatabaseError(e)
    }
}

/// SQLite-backed user repository; passwords are stored as bcrypt hashes
pub struct SqliteUserRepository {
    db: Arc<DatabaseManager>,
}

impl SqliteUserRepository {
    /// Create a new SqliteUserRepository
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn login(&self, email: &str, password: &str) -> Result<Option<User>> {
        let email = normalize_email(email);
        let password = password.to_string();

        // bcrypt is CPU-bound, keep it off the async workers too
        self.db.execute(move |conn| {
            let user = conn.query_row(
                &format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS),
                [&email],
                user_from_row,
            ).optional()?;

            match user {
                Some(user) if verify_password(&password, &user.password) => Ok(Some(user)),
                Some(_) => Ok(None),
                None => {
                    verify_against_placeholder(&password);
                    Ok(None)
                }
            }
        }).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        self.db.execute(move |conn| {
            Ok(conn.query_row(
                &format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS),
                [id],
                user_from_row,
            ).optional()?)
        }).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let email = normalize_email(email);
        self.db.execute(move |conn| {
            Ok(conn.query_row(
                &format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS),
                [&email],
                user_from_row,
            ).optional()?)
        }).await
    }

    async fn find_all(&self) -> Result<Vec<User>> {
        self.db.execute(|conn| {
            let mut stmt = conn.prepare(
                &format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS)
            )?;

            let users = stmt
                .query_map([], user_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(users)
        }).await
    }

    async fn create(&self, user: NewUser) -> Result<User> {
        self.db.execute(move |conn| {
            let email = normalize_email(&user.email);
            let password_hash = hash_password(&user.password)?;

            conn.execute(
                "INSERT INTO users (email, password, user_type) VALUES (?, ?, ?)",
                rusqlite::params![&email, &password_hash, &user.user_type],
            ).map_err(|e| map_unique_violation(e, &email))?;

            Ok(User {
                id: conn.last_insert_rowid(),
                email,
                password: password_hash,
                user_type: user.user_type,
            })
        }).await
    }

    async fn update(&self, id: i64, changes: UserChanges) -> Result<Option<User>> {
        self.db.transaction(move |tx| {
            let existing = tx.query_row(
                &format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS),
                [id],
                user_from_row,
            ).optional()?;

            let Some(mut user) = existing else {
                return Ok(None);
            };

            if let Some(email) = changes.email {
                user.email = normalize_email(&email);
            }
            if let Some(password) = changes.password {
                user.password = hash_password(&password)?;
            }
            if let Some(user_type) = changes.user_type {
                user.user_type = user_type;
            }

            tx.execute(
                "UPDATE users SET email = ?, password = ?, user_type = ? WHERE id = ?",
                rusqlite::params![&user.email, &user.password, &user.user_type, user.id],
            ).map_err(|e| map_unique_violation(e, &user.email))?;

            Ok(Some(user))
        }).await
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        self.db.execute(move |conn| {
            let removed = conn.execute("DELETE FROM users WHERE id = ?", [id])?;
            Ok(removed > 0)
        }).await
    }

    async fn count(&self) -> Result<i64> {
        self.db.execute(|conn| {
            Ok(conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?)
        }).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{USER_TYPE_ADMIN, USER_TYPE_REGULAR};

    fn repo() -> SqliteUserRepository {
        SqliteUserRepository::new(Arc::new(DatabaseManager::new_in_memory().unwrap()))
    }

    fn new_user(email: &str, password: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            password: password.to_string(),
            user_type: USER_TYPE_REGULAR.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_hashes_password() {
        let repo = repo();
        let user = repo.create(new_user("Email@Email.com", "1234")).await.unwrap();

        assert_eq!(user.id, 1);
        assert_eq!(user.email, "email@email.com");
        assert_ne!(user.password, "1234");
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_login_matches_email_and_password() {
        let repo = repo();
        let created = repo.create(new_user("email@email.com", "1234")).await.unwrap();

        let found = repo.login(" EMAIL@email.com", "1234").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(created.id));

        assert!(repo.login("email@email.com", "wrong").await.unwrap().is_none());
        assert!(repo.login("batata@email.com", "batata").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_email_costs_a_bcrypt_round() {
        use std::time::Instant;

        let repo = repo();
        repo.create(new_user("email@email.com", "1234")).await.unwrap();
        // first miss also builds the placeholder hash
        repo.login("batata@email.com", "batata").await.unwrap();

        let start = Instant::now();
        assert!(repo.login("email@email.com", "wrong").await.unwrap().is_none());
        let wrong_password = start.elapsed();

        let start = Instant::now();
        assert!(repo.login("batata@email.com", "batata").await.unwrap().is_none());
        let unknown_email = start.elapsed();

        assert!(unknown_email * 3 >= wrong_password);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let repo = repo();
        repo.create(new_user("email@email.com", "1234")).await.unwrap();

        let err = repo.create(new_user("EMAIL@email.com", "5678")).await.unwrap_err();
        assert!(matches!(err, ChapterError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_changes_only_given_fields() {
        let repo = repo();
        let user = repo.create(new_user("email@email.com", "1234")).await.unwrap();

        let updated = repo
            .update(user.id, UserChanges {
                user_type: Some(USER_TYPE_ADMIN.to_string()),
                password: Some("nova".to_string()),
                ..Default::default()
            })
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.email, "email@email.com");
        assert_eq!(updated.user_type, USER_TYPE_ADMIN);
        assert!(repo.login("email@email.com", "nova").await.unwrap().is_some());
        assert!(repo.login("email@email.com", "1234").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let repo = repo();
        let result = repo.update(42, UserChanges::default()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_update_to_taken_email_is_conflict() {
        let repo = repo();
        repo.create(new_user("a@chapter.com", "1234")).await.unwrap();
        let b = repo.create(new_user("b@chapter.com", "1234")).await.unwrap();

        let err = repo
            .update(b.id, UserChanges {
                email: Some("a@chapter.com".to_string()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ChapterError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_find_and_delete() {
        let repo = repo();
        let a = repo.create(new_user("a@chapter.com", "1234")).await.unwrap();
        let b = repo.create(new_user("b@chapter.com", "1234")).await.unwrap();

        assert_eq!(repo.find_by_email("B@chapter.com").await.unwrap().map(|u| u.id), Some(b.id));
        assert_eq!(repo.find_all().await.unwrap().len(), 2);

        assert!(repo.delete(a.id).await.unwrap());
        assert!(!repo.delete(a.id).await.unwrap());
        assert!(repo.find_by_id(a.id).await.unwrap().is_none());
    }
}
