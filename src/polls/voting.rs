//! Vote admission and recording. One state machine per ballot attempt,
//! terminal outcomes only — no retries at this layer.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::errors::{AppError, ConflictKind};
use crate::models::poll::{self, Poll, QuestionType};
use crate::models::vote::{self, BallotRow};
use crate::polls::status::{PollStatus, poll_status};

pub const SCALE_MIN: i64 = 1;
pub const SCALE_MAX: i64 = 5;

/// Raw ballot payload as submitted. Scale votes arrive with the chosen
/// value in `option_ids[0]`, matching the submission form contract.
#[derive(Debug, Clone, Default)]
pub struct BallotInput {
    pub option_ids: Vec<i64>,
    pub text_answer: String,
}

/// Admit and record one ballot:
/// load → window check → uniqueness pre-check → shape validation → insert.
///
/// The pre-check gives the common duplicate a clean answer; the unique
/// ballot index closes the race two concurrent submissions would otherwise
/// win together. All rows of a multiple-choice ballot insert in one
/// transaction, so a failure partway leaves nothing behind.
pub async fn record_vote(
    pool: &SqlitePool,
    caller: &str,
    poll_id: i64,
    input: &BallotInput,
) -> Result<(), AppError> {
    let poll_row = poll::find_by_id(pool, poll_id).await?.ok_or(AppError::NotFound)?;

    let now = Utc::now().naive_utc();
    if poll_status(now, poll_row.start_date, poll_row.end_date) != PollStatus::Active {
        return Err(AppError::Conflict(ConflictKind::PollInactive));
    }

    // Respondents without a stable identifier bypass uniqueness entirely.
    if !caller.is_empty() && vote::has_voted(pool, poll_id, caller).await? {
        return Err(AppError::Conflict(ConflictKind::AlreadyVoted));
    }

    let text_answer = input.text_answer.trim();
    let rows = validate_shape(pool, &poll_row, input, text_answer).await?;

    let display_user_id = if poll_row.is_anonymous || caller.is_empty() {
        None
    } else {
        Some(caller)
    };

    let mut tx = pool.begin().await?;
    vote::insert_ballot(&mut tx, poll_id, caller, display_user_id, &rows, now).await?;
    tx.commit().await?;

    log::info!(
        "Ballot recorded on poll {poll_id}: {:?}, {} row(s)",
        poll_row.question_type,
        rows.len()
    );
    Ok(())
}

/// Per-type payload validation. Returns the rows to insert, one per
/// selected option for multiple-choice, exactly one otherwise.
async fn validate_shape<'a>(
    pool: &SqlitePool,
    poll_row: &Poll,
    input: &BallotInput,
    text_answer: &'a str,
) -> Result<Vec<BallotRow<'a>>, AppError> {
    match poll_row.question_type {
        QuestionType::SingleChoice => {
            if input.option_ids.len() != 1 {
                return Err(AppError::Validation(
                    "Single-choice polls take exactly one option".to_string(),
                ));
            }
            let option_id = input.option_ids[0];
            require_option(pool, poll_row.id, option_id).await?;
            Ok(vec![BallotRow { option_id: Some(option_id), ..Default::default() }])
        }
        QuestionType::MultipleChoice => {
            if input.option_ids.is_empty() {
                return Err(AppError::Validation(
                    "Select at least one option".to_string(),
                ));
            }
            for &option_id in &input.option_ids {
                require_option(pool, poll_row.id, option_id).await?;
            }
            Ok(input
                .option_ids
                .iter()
                .map(|&id| BallotRow { option_id: Some(id), ..Default::default() })
                .collect())
        }
        QuestionType::Scale => {
            if input.option_ids.len() != 1 {
                return Err(AppError::Validation(
                    "Scale polls take exactly one value".to_string(),
                ));
            }
            let value = input.option_ids[0];
            if !(SCALE_MIN..=SCALE_MAX).contains(&value) {
                return Err(AppError::Validation(format!(
                    "Scale value must be between {SCALE_MIN} and {SCALE_MAX}"
                )));
            }
            Ok(vec![BallotRow { scale_value: Some(value), ..Default::default() }])
        }
        QuestionType::Text => {
            if text_answer.is_empty() {
                return Err(AppError::Validation("Answer text is required".to_string()));
            }
            Ok(vec![BallotRow { text_answer: Some(text_answer), ..Default::default() }])
        }
    }
}

async fn require_option(pool: &SqlitePool, poll_id: i64, option_id: i64) -> Result<(), AppError> {
    if !poll::option_belongs(pool, poll_id, option_id).await? {
        log::warn!("Rejected ballot: option {option_id} does not belong to poll {poll_id}");
        return Err(AppError::Validation(format!(
            "Option {option_id} does not belong to this poll"
        )));
    }
    Ok(())
}
