use sqlx::SqlitePool;

use super::types::{Credential, NewUser, User};
use crate::errors::{AppError, ConflictKind};

const SELECT_USER: &str =
    "SELECT id, firstname, lastname, email, role, created_at FROM users";

/// Insert a new user. A duplicate email surfaces as `Conflict(DuplicateEmail)`
/// via the unique index rather than a pre-check.
pub async fn create(pool: &SqlitePool, new_user: &NewUser) -> Result<(), AppError> {
    let result = sqlx::query(
        "INSERT INTO users (id, firstname, lastname, email, password_hash, role) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )
    .bind(&new_user.id)
    .bind(&new_user.firstname)
    .bind(&new_user.lastname)
    .bind(&new_user.email)
    .bind(&new_user.password_hash)
    .bind(&new_user.role)
    .execute(pool)
    .await;

    match result {
        Ok(_) => Ok(()),
        Err(sqlx::Error::Database(ref db)) if db.is_unique_violation() => {
            Err(AppError::Conflict(ConflictKind::DuplicateEmail))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!("{SELECT_USER} WHERE id = ?1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!("{SELECT_USER} WHERE email = ?1"))
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_all(pool: &SqlitePool) -> Result<Vec<User>, AppError> {
    let users = sqlx::query_as::<_, User>(&format!("{SELECT_USER} ORDER BY created_at, id"))
        .fetch_all(pool)
        .await?;
    Ok(users)
}

/// Credential row for login verification. `None` when the email is unknown,
/// so the caller can fail the same way as for a bad password.
pub async fn find_credential_by_email(
    pool: &SqlitePool,
    email: &str,
) -> Result<Option<Credential>, AppError> {
    let cred = sqlx::query_as::<_, Credential>(
        "SELECT id, password_hash FROM users WHERE email = ?1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(cred)
}

pub async fn update_profile(
    pool: &SqlitePool,
    id: &str,
    firstname: &str,
    lastname: &str,
    email: &str,
) -> Result<(), AppError> {
    let result = sqlx::query(
        "UPDATE users SET firstname = ?1, lastname = ?2, email = ?3 WHERE id = ?4",
    )
    .bind(firstname)
    .bind(lastname)
    .bind(email)
    .bind(id)
    .execute(pool)
    .await;

    match result {
        Ok(r) if r.rows_affected() == 0 => Err(AppError::NotFound),
        Ok(_) => Ok(()),
        Err(sqlx::Error::Database(ref db)) if db.is_unique_violation() => {
            Err(AppError::Conflict(ConflictKind::DuplicateEmail))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn set_password_hash(
    pool: &SqlitePool,
    id: &str,
    password_hash: &str,
) -> Result<(), AppError> {
    let result = sqlx::query("UPDATE users SET password_hash = ?1 WHERE id = ?2")
        .bind(password_hash)
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

/// Delete a user and everything they own: votes on their polls, the options,
/// the polls, then the user row — one transaction, all or nothing. Ballots
/// the user cast on other people's polls stay recorded.
pub async fn delete_cascade(pool: &SqlitePool, id: &str) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "DELETE FROM votes WHERE poll_id IN (SELECT id FROM polls WHERE user_id = ?1)",
    )
    .bind(id)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "DELETE FROM options WHERE poll_id IN (SELECT id FROM polls WHERE user_id = ?1)",
    )
    .bind(id)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM polls WHERE user_id = ?1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let result = sqlx::query("DELETE FROM users WHERE id = ?1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    tx.commit().await?;
    Ok(())
}
