use sqlx::{SqliteConnection, SqlitePool};

use super::types::{Poll, PollDraft, PollOption, QuestionType};
use crate::errors::AppError;
use crate::models::datetime;

const SELECT_POLL: &str = "SELECT id, title, user_id, question_type, start_date, \
                           end_date, is_anonymous, created_at FROM polls";

#[derive(sqlx::FromRow)]
struct PollRow {
    id: i64,
    title: String,
    user_id: String,
    question_type: String,
    start_date: String,
    end_date: Option<String>,
    is_anonymous: bool,
    created_at: String,
}

impl PollRow {
    fn into_poll(self) -> Result<Poll, AppError> {
        Ok(Poll {
            id: self.id,
            title: self.title,
            owner_id: self.user_id,
            question_type: QuestionType::parse(&self.question_type)?,
            start_date: datetime::from_db(&self.start_date)?,
            end_date: datetime::opt_from_db(self.end_date.as_deref())?,
            is_anonymous: self.is_anonymous,
            created_at: datetime::from_db(&self.created_at)?,
        })
    }
}

/// Insert the poll row. Runs inside the caller's transaction so option
/// insertion failures roll the poll back too.
pub async fn insert(
    conn: &mut SqliteConnection,
    owner_id: &str,
    draft: &PollDraft,
    created_at: chrono::NaiveDateTime,
) -> Result<i64, AppError> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO polls (title, user_id, question_type, start_date, end_date, \
         is_anonymous, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) RETURNING id",
    )
    .bind(&draft.title)
    .bind(owner_id)
    .bind(draft.question_type.as_str())
    .bind(datetime::to_db(draft.start_date))
    .bind(draft.end_date.map(datetime::to_db))
    .bind(draft.is_anonymous)
    .bind(datetime::to_db(created_at))
    .fetch_one(conn)
    .await?;
    Ok(id)
}

pub async fn update_scalars(
    conn: &mut SqliteConnection,
    poll_id: i64,
    draft: &PollDraft,
) -> Result<(), AppError> {
    sqlx::query(
        "UPDATE polls SET title = ?1, question_type = ?2, start_date = ?3, \
         end_date = ?4, is_anonymous = ?5 WHERE id = ?6",
    )
    .bind(&draft.title)
    .bind(draft.question_type.as_str())
    .bind(datetime::to_db(draft.start_date))
    .bind(draft.end_date.map(datetime::to_db))
    .bind(draft.is_anonymous)
    .bind(poll_id)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn insert_options(
    conn: &mut SqliteConnection,
    poll_id: i64,
    options: &[String],
) -> Result<(), AppError> {
    for text in options {
        sqlx::query("INSERT INTO options (poll_id, option_text) VALUES (?1, ?2)")
            .bind(poll_id)
            .bind(text)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

pub async fn delete_options(conn: &mut SqliteConnection, poll_id: i64) -> Result<(), AppError> {
    sqlx::query("DELETE FROM options WHERE poll_id = ?1")
        .bind(poll_id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Cascade delete inside the caller's transaction: votes, options, then the
/// poll row. Reports `NotFound` when the final delete touched nothing.
pub async fn delete_cascade(conn: &mut SqliteConnection, poll_id: i64) -> Result<(), AppError> {
    sqlx::query("DELETE FROM votes WHERE poll_id = ?1")
        .bind(poll_id)
        .execute(&mut *conn)
        .await?;
    sqlx::query("DELETE FROM options WHERE poll_id = ?1")
        .bind(poll_id)
        .execute(&mut *conn)
        .await?;
    let result = sqlx::query("DELETE FROM polls WHERE id = ?1")
        .bind(poll_id)
        .execute(conn)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Poll>, AppError> {
    let row = sqlx::query_as::<_, PollRow>(&format!("{SELECT_POLL} WHERE id = ?1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.map(PollRow::into_poll).transpose()
}

pub async fn find_by_owner(pool: &SqlitePool, owner_id: &str) -> Result<Vec<Poll>, AppError> {
    let rows = sqlx::query_as::<_, PollRow>(&format!(
        "{SELECT_POLL} WHERE user_id = ?1 ORDER BY created_at DESC, id DESC"
    ))
    .bind(owner_id)
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(PollRow::into_poll).collect()
}

pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Poll>, AppError> {
    let rows = sqlx::query_as::<_, PollRow>(&format!(
        "{SELECT_POLL} ORDER BY created_at DESC, id DESC"
    ))
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(PollRow::into_poll).collect()
}

pub async fn options_for(pool: &SqlitePool, poll_id: i64) -> Result<Vec<PollOption>, AppError> {
    let options = sqlx::query_as::<_, PollOption>(
        "SELECT id, poll_id, option_text FROM options WHERE poll_id = ?1 ORDER BY id",
    )
    .bind(poll_id)
    .fetch_all(pool)
    .await?;
    Ok(options)
}

/// Whether an option id belongs to the given poll.
pub async fn option_belongs(
    pool: &SqlitePool,
    poll_id: i64,
    option_id: i64,
) -> Result<bool, AppError> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM options WHERE poll_id = ?1 AND id = ?2)",
    )
    .bind(poll_id)
    .bind(option_id)
    .fetch_one(pool)
    .await?;
    Ok(exists)
}

pub async fn count_by_owner(pool: &SqlitePool, owner_id: &str) -> Result<i64, AppError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM polls WHERE user_id = ?1")
        .bind(owner_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}
