//! Identity provider contract: credential verification and role storage.
//!
//! This is the only module the rest of the crate talks to about who a user
//! is and what role they hold. The local implementation stores argon2
//! hashes in the `users` table; swapping in a remote provider means
//! replacing these functions, not the callers.

use rand::Rng;
use sqlx::SqlitePool;

use crate::auth::password;
use crate::errors::AppError;
use crate::models::user;

/// Mint an opaque 32-byte hex user id.
pub fn mint_user_id() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();
    hex::encode(bytes)
}

/// Verify an email/password credential and return the stable user id.
/// Unknown email and bad password fail identically with `Unauthorized`.
pub async fn verify_credential(
    pool: &SqlitePool,
    email: &str,
    pass: &str,
) -> Result<String, AppError> {
    let cred = user::find_credential_by_email(pool, email).await?;
    match cred {
        Some(c) => match password::verify_password(pass, &c.password_hash) {
            Ok(true) => Ok(c.id),
            Ok(false) => Err(AppError::Unauthorized),
            Err(e) => Err(AppError::Hash(e)),
        },
        None => Err(AppError::Unauthorized),
    }
}

/// Fetch the role for a user id, fresh on every call (no caching).
pub async fn get_role(pool: &SqlitePool, user_id: &str) -> Result<String, AppError> {
    let role: Option<String> = sqlx::query_scalar("SELECT role FROM users WHERE id = ?1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    role.ok_or(AppError::NotFound)
}

/// Best-effort role lookup for display paths; unknown users read as "".
pub async fn get_role_or_default(pool: &SqlitePool, user_id: &str) -> String {
    match get_role(pool, user_id).await {
        Ok(role) => role,
        Err(e) => {
            log::warn!("Role lookup failed for {user_id}: {e}");
            String::new()
        }
    }
}

pub async fn set_role(pool: &SqlitePool, user_id: &str, role: &str) -> Result<(), AppError> {
    let result = sqlx::query("UPDATE users SET role = ?1 WHERE id = ?2")
        .bind(role)
        .bind(user_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    log::info!("Role for user {user_id} set to {role}");
    Ok(())
}
