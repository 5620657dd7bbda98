//! Chapter WebAPI server

use chapter_webapi::core::config::SecurityConfig;
use chapter_webapi::db::models::{NewUser, USER_TYPE_ADMIN};
use chapter_webapi::{api, core, db};

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration (handles CLI args, env vars, and config file)
    let config = match core::Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            // logging isn't initialized yet
            eprintln!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let _logger = match core::Logger::init(&config.logging) {
        Ok(logger) => logger,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return Err(e);
        }
    };

    info!("Starting Chapter WebAPI v{}", chapter_webapi::VERSION);
    info!(
        host = %config.server.host,
        port = config.server.port,
        path = ?config.database.path,
        "Configuration loaded"
    );

    let db = Arc::new(db::DatabaseManager::new(
        &config.database.path,
        config.database.connection_pool_size,
        Duration::from_millis(config.database.busy_timeout),
    )?);
    info!(
        path = ?db.db_path(),
        pool_size = db.pool_size(),
        "Database initialized successfully"
    );

    let users: Arc<dyn db::UserRepository> = Arc::new(db::SqliteUserRepository::new(db));

    if config.security.seed_admin {
        ensure_admin_user(users.as_ref(), &config.security).await?;
    }

    let server = api::ApiServer::new(&config, users);
    server.serve().await?;

    Ok(())
}

async fn ensure_admin_user(users: &dyn db::UserRepository, security: &SecurityConfig) -> Result<()> {
    if users.count().await? > 0 {
        return Ok(());
    }

    info!("No users found, creating default admin user...");
    let admin = users
        .create(NewUser {
            email: security.admin_email.clone(),
            password: security.admin_password.clone(),
            user_type: USER_TYPE_ADMIN.to_string(),
        })
        .await?;
    info!(user_id = admin.id, email = %admin.email, "Default admin user created");

    Ok(())
}
