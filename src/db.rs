use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

use crate::auth::identity;
use crate::models::user;

pub const MIGRATIONS: &str = include_str!("schema.sql");

pub async fn init_pool(database_url: &str) -> SqlitePool {
    let options = SqliteConnectOptions::from_str(database_url)
        .expect("Invalid DATABASE_URL")
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(8)
        .connect_with(options)
        .await
        .expect("Failed to create DB pool")
}

pub async fn run_migrations(pool: &SqlitePool) {
    sqlx::raw_sql(MIGRATIONS)
        .execute(pool)
        .await
        .expect("Failed to run migrations");
    log::info!("Database migrations complete");
}

/// Seed the bootstrap admin account if no admin exists yet. Idempotent —
/// restarting against a populated database is a no-op.
pub async fn seed_admin(pool: &SqlitePool, email: &str, password_hash: &str) {
    let admins: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'admin'")
        .fetch_one(pool)
        .await
        .unwrap_or(0);
    if admins > 0 {
        log::info!("Admin account already present ({admins}), skipping seed");
        return;
    }

    let new_admin = user::NewUser {
        id: identity::mint_user_id(),
        firstname: "Admin".to_string(),
        lastname: "Admin".to_string(),
        email: email.to_string(),
        password_hash: password_hash.to_string(),
        role: "admin".to_string(),
    };
    match user::create(pool, &new_admin).await {
        Ok(()) => log::info!("Seeded bootstrap admin {email}"),
        Err(e) => log::error!("Admin seed failed: {e}"),
    }
}
