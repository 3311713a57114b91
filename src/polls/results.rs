//! On-demand result aggregation: distinct voter list plus a per-type tally.

use serde::Serialize;
use sqlx::SqlitePool;

use crate::errors::AppError;
use crate::models::poll::{self, QuestionType};
use crate::models::vote::{self, Voter};

/// Tally variants, one per question type. Pairs keep the presentation
/// order: scale ascending by value, choice in option-id order.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Tally {
    /// Exact answer string → occurrence count.
    Text(Vec<(String, i64)>),
    /// Observed scale value → count; absent values mean zero.
    Scale(Vec<(i64, i64)>),
    /// Option text → count, zero-vote options included.
    Choice(Vec<(String, i64)>),
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub poll_id: i64,
    pub title: String,
    pub question_type: QuestionType,
    pub is_anonymous: bool,
    pub voters: Vec<Voter>,
    pub results: Tally,
}

pub async fn summarize(pool: &SqlitePool, poll_id: i64) -> Result<Summary, AppError> {
    let poll_row = poll::find_by_id(pool, poll_id).await?.ok_or(AppError::NotFound)?;

    let voters = vote::voters(pool, poll_id).await?;
    let results = match poll_row.question_type {
        QuestionType::Text => Tally::Text(vote::text_tally(pool, poll_id).await?),
        QuestionType::Scale => Tally::Scale(vote::scale_tally(pool, poll_id).await?),
        QuestionType::SingleChoice | QuestionType::MultipleChoice => {
            Tally::Choice(vote::choice_tally(pool, poll_id).await?)
        }
    };

    Ok(Summary {
        poll_id: poll_row.id,
        title: poll_row.title,
        question_type: poll_row.question_type,
        is_anonymous: poll_row.is_anonymous,
        voters,
        results,
    })
}
