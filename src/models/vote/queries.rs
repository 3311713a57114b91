use sqlx::{SqliteConnection, SqlitePool};

use super::types::{BallotRow, Vote, Voter};
use crate::errors::{AppError, ConflictKind};
use crate::models::datetime;

/// Whether this respondent already has a ballot on the poll. Pre-check only —
/// the unique ballot index is what actually closes the race.
pub async fn has_voted(pool: &SqlitePool, poll_id: i64, voted_by: &str) -> Result<bool, AppError> {
    if voted_by.is_empty() {
        return Ok(false);
    }
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM votes WHERE poll_id = ?1 AND voted_by = ?2")
            .bind(poll_id)
            .bind(voted_by)
            .fetch_one(pool)
            .await?;
    Ok(count > 0)
}

pub async fn count_for_poll(pool: &SqlitePool, poll_id: i64) -> Result<i64, AppError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM votes WHERE poll_id = ?1")
        .bind(poll_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Insert one ballot (one row per payload) inside the caller's transaction.
/// Row 0 is the ballot head; a concurrent duplicate trips the unique index
/// there and surfaces as `Conflict(AlreadyVoted)`, rolling back any rows
/// already written for this ballot.
pub async fn insert_ballot(
    conn: &mut SqliteConnection,
    poll_id: i64,
    voted_by: &str,
    display_user_id: Option<&str>,
    rows: &[BallotRow<'_>],
    created_at: chrono::NaiveDateTime,
) -> Result<(), AppError> {
    let created_at = datetime::to_db(created_at);
    for (rank, row) in rows.iter().enumerate() {
        let result = sqlx::query(
            "INSERT INTO votes (poll_id, option_id, user_id, text_answer, scale_value, \
             voted_by, option_rank, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(poll_id)
        .bind(row.option_id)
        .bind(display_user_id)
        .bind(row.text_answer)
        .bind(row.scale_value)
        .bind(voted_by)
        .bind(rank as i64)
        .bind(&created_at)
        .execute(&mut *conn)
        .await;

        match result {
            Ok(_) => {}
            Err(sqlx::Error::Database(ref db)) if db.is_unique_violation() => {
                return Err(AppError::Conflict(ConflictKind::AlreadyVoted));
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

pub async fn find_for_poll(pool: &SqlitePool, poll_id: i64) -> Result<Vec<Vote>, AppError> {
    let votes = sqlx::query_as::<_, Vote>(
        "SELECT id, poll_id, option_id, user_id, text_answer, scale_value, voted_by, \
         option_rank, created_at FROM votes WHERE poll_id = ?1 ORDER BY id",
    )
    .bind(poll_id)
    .fetch_all(pool)
    .await?;
    Ok(votes)
}

/// Distinct voters on a poll, with email where the identity store still
/// resolves it. Admin-only view; anonymity does not hide `voted_by` here.
pub async fn voters(pool: &SqlitePool, poll_id: i64) -> Result<Vec<Voter>, AppError> {
    let voters = sqlx::query_as::<_, Voter>(
        "SELECT DISTINCT v.voted_by, u.email \
         FROM votes v LEFT JOIN users u ON v.voted_by = u.id \
         WHERE v.poll_id = ?1 ORDER BY v.voted_by",
    )
    .bind(poll_id)
    .fetch_all(pool)
    .await?;
    Ok(voters)
}

/// Exact-match answer string → occurrence count.
pub async fn text_tally(pool: &SqlitePool, poll_id: i64) -> Result<Vec<(String, i64)>, AppError> {
    let rows: Vec<(String, i64)> = sqlx::query_as(
        "SELECT text_answer, COUNT(*) FROM votes \
         WHERE poll_id = ?1 AND text_answer IS NOT NULL \
         GROUP BY text_answer ORDER BY text_answer",
    )
    .bind(poll_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Observed scale value → count, ascending. Values nobody picked are absent.
pub async fn scale_tally(pool: &SqlitePool, poll_id: i64) -> Result<Vec<(i64, i64)>, AppError> {
    let rows: Vec<(i64, i64)> = sqlx::query_as(
        "SELECT scale_value, COUNT(*) FROM votes \
         WHERE poll_id = ?1 AND scale_value IS NOT NULL \
         GROUP BY scale_value ORDER BY scale_value",
    )
    .bind(poll_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Option text → count, left-joined so zero-vote options still appear,
/// in option-id order.
pub async fn choice_tally(pool: &SqlitePool, poll_id: i64) -> Result<Vec<(String, i64)>, AppError> {
    let rows: Vec<(String, i64)> = sqlx::query_as(
        "SELECT o.option_text, COUNT(v.option_id) \
         FROM options o LEFT JOIN votes v ON o.id = v.option_id AND v.poll_id = ?1 \
         WHERE o.poll_id = ?1 GROUP BY o.id, o.option_text ORDER BY o.id",
    )
    .bind(poll_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
