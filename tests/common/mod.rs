//! Shared test infrastructure: an in-memory SQLite pool with migrations
//! applied and a small cast of seeded users.

use std::str::FromStr;

use chrono::{Duration, NaiveDateTime, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use pollbox::auth::password;
use pollbox::db::MIGRATIONS;
use pollbox::models::poll::{PollDraft, QuestionType};
use pollbox::models::user::{self, NewUser};

pub const ADMIN_ID: &str = "admin-0000000000000001";
pub const ADMIN_EMAIL: &str = "admin@test.com";
pub const ALICE_ID: &str = "alice-0000000000000001";
pub const ALICE_EMAIL: &str = "alice@test.com";
pub const BOB_ID: &str = "bob-000000000000000001";
pub const BOB_EMAIL: &str = "bob@test.com";
pub const TEST_PASSWORD: &str = "Password1!";

pub struct TestDb {
    pool: SqlitePool,
}

impl TestDb {
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Setup an in-memory test database with schema and seeded users.
///
/// The pool is capped at one connection: every connection to `:memory:`
/// gets its own database, so sharing a single connection keeps all
/// queries on the same one.
pub async fn setup_test_db() -> TestDb {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("options")
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("Failed to open test DB");

    sqlx::raw_sql(MIGRATIONS)
        .execute(&pool)
        .await
        .expect("Failed to run migrations");

    seed_users(&pool).await;

    TestDb { pool }
}

async fn seed_users(pool: &SqlitePool) {
    let hash = password::hash_password(TEST_PASSWORD).expect("hash");
    for (id, email, first, role) in [
        (ADMIN_ID, ADMIN_EMAIL, "Admin", "admin"),
        (ALICE_ID, ALICE_EMAIL, "Alice", "user"),
        (BOB_ID, BOB_EMAIL, "Bob", "user"),
    ] {
        let u = NewUser {
            id: id.to_string(),
            firstname: first.to_string(),
            lastname: "Tester".to_string(),
            email: email.to_string(),
            password_hash: hash.clone(),
            role: role.to_string(),
        };
        user::create(pool, &u).await.expect("seed user");
    }
}

pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// A draft whose window is open right now (started an hour ago, ends in an
/// hour).
pub fn active_draft(question_type: QuestionType, options: &[&str]) -> PollDraft {
    PollDraft {
        title: "Test poll".to_string(),
        question_type,
        options: options.iter().map(|s| s.to_string()).collect(),
        is_anonymous: false,
        start_date: now() - Duration::hours(1),
        end_date: Some(now() + Duration::hours(1)),
    }
}
