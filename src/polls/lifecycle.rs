//! Poll lifecycle: draft admission, create/update/delete with cascade
//! semantics, and the read projections the poll surfaces are built from.

use chrono::{NaiveDateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::auth::{gate, validate};
use crate::errors::{AppError, ConflictKind};
use crate::models::poll::{self, Poll, PollDraft, PollOption, QuestionType};
use crate::models::vote;
use crate::polls::status::{PollStatus, poll_status};

/// Input format of the HTML `datetime-local` control, with a seconds-bearing
/// fallback for clients that send them.
const INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";
const INPUT_FORMAT_SECS: &str = "%Y-%m-%dT%H:%M:%S";

pub fn parse_input_date(s: &str, field_name: &str) -> Result<NaiveDateTime, AppError> {
    NaiveDateTime::parse_from_str(s, INPUT_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, INPUT_FORMAT_SECS))
        .map_err(|_| AppError::Validation(format!("Invalid {field_name} format")))
}

/// Validate raw poll input into a draft: title required, question type known,
/// options trimmed and shape-checked per type, window parseable and ordered.
pub fn build_draft(
    title: &str,
    question_type: &str,
    options: &[String],
    is_anonymous: bool,
    start_date: &str,
    end_date: Option<&str>,
) -> Result<PollDraft, AppError> {
    if let Some(msg) = validate::validate_required(title, "Title", 200) {
        return Err(AppError::Validation(msg));
    }
    let question_type = QuestionType::parse(question_type)?;

    let options: Vec<String> = options
        .iter()
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty())
        .collect();

    match question_type {
        QuestionType::SingleChoice | QuestionType::MultipleChoice if options.is_empty() => {
            return Err(AppError::Validation(
                "At least one non-empty option is required for choice polls".to_string(),
            ));
        }
        QuestionType::Text if !options.is_empty() => {
            return Err(AppError::Validation(
                "Text polls do not take options".to_string(),
            ));
        }
        _ => {}
    }

    let start = parse_input_date(start_date, "start date")?;
    let end = end_date
        .filter(|s| !s.trim().is_empty())
        .map(|s| parse_input_date(s, "end date"))
        .transpose()?;
    if let Some(end) = end {
        if end < start {
            return Err(AppError::Validation(
                "End date must not be before start date".to_string(),
            ));
        }
    }

    Ok(PollDraft {
        title: title.trim().to_string(),
        question_type,
        options,
        is_anonymous,
        start_date: start,
        end_date: end,
    })
}

/// Create a poll with its options in one transaction. Admin-only.
pub async fn create_poll(
    pool: &SqlitePool,
    caller: &str,
    draft: &PollDraft,
) -> Result<Poll, AppError> {
    gate::require_admin(pool, caller).await?;

    let created_at = Utc::now().naive_utc();
    let mut tx = pool.begin().await?;
    let poll_id = poll::insert(&mut tx, caller, draft, created_at).await?;
    poll::insert_options(&mut tx, poll_id, &draft.options).await?;
    tx.commit().await?;

    log::info!(
        "Poll {poll_id} created by {caller}: {:?} \"{}\", {} options, anonymous={}",
        draft.question_type,
        draft.title,
        draft.options.len(),
        draft.is_anonymous
    );

    Ok(Poll {
        id: poll_id,
        title: draft.title.clone(),
        owner_id: caller.to_string(),
        question_type: draft.question_type,
        start_date: draft.start_date,
        end_date: draft.end_date,
        is_anonymous: draft.is_anonymous,
        created_at,
    })
}

/// Replace a poll's scalar fields and option set, one transaction. Rejected
/// once any vote has been recorded — replacing options under live ballots
/// would leave them pointing at deleted rows.
pub async fn update_poll(
    pool: &SqlitePool,
    caller: &str,
    poll_id: i64,
    draft: &PollDraft,
) -> Result<(), AppError> {
    let existing = poll::find_by_id(pool, poll_id).await?.ok_or(AppError::NotFound)?;
    gate::require_owner_or_admin(pool, caller, &existing.owner_id).await?;

    if vote::count_for_poll(pool, poll_id).await? > 0 {
        return Err(AppError::Conflict(ConflictKind::PollHasVotes));
    }

    let mut tx = pool.begin().await?;
    poll::update_scalars(&mut tx, poll_id, draft).await?;
    poll::delete_options(&mut tx, poll_id).await?;
    poll::insert_options(&mut tx, poll_id, &draft.options).await?;
    tx.commit().await?;

    log::info!("Poll {poll_id} updated by {caller}");
    Ok(())
}

/// Delete a poll and cascade its votes and options, one transaction.
pub async fn delete_poll(pool: &SqlitePool, caller: &str, poll_id: i64) -> Result<(), AppError> {
    let existing = poll::find_by_id(pool, poll_id).await?.ok_or(AppError::NotFound)?;
    gate::require_owner_or_admin(pool, caller, &existing.owner_id).await?;

    let mut tx = pool.begin().await?;
    poll::delete_cascade(&mut tx, poll_id).await?;
    tx.commit().await?;

    log::info!("Poll {poll_id} deleted by {caller}");
    Ok(())
}

pub async fn get_poll(pool: &SqlitePool, poll_id: i64) -> Result<Poll, AppError> {
    poll::find_by_id(pool, poll_id).await?.ok_or(AppError::NotFound)
}

/// Poll detail for the read surface: options, derived status, and whether
/// the caller already has a ballot on it.
#[derive(Debug, Serialize)]
pub struct PollDetail {
    #[serde(flatten)]
    pub poll: Poll,
    pub options: Vec<PollOption>,
    pub status: PollStatus,
    pub has_voted: bool,
}

pub async fn poll_detail(
    pool: &SqlitePool,
    caller: &str,
    poll_id: i64,
) -> Result<PollDetail, AppError> {
    let poll = get_poll(pool, poll_id).await?;
    let options = poll::options_for(pool, poll_id).await?;
    let status = poll_status(Utc::now().naive_utc(), poll.start_date, poll.end_date);
    let has_voted = vote::has_voted(pool, poll_id, caller).await?;
    Ok(PollDetail { poll, options, status, has_voted })
}

/// Owner listing entry: each poll with its options.
#[derive(Debug, Serialize)]
pub struct OwnedPoll {
    #[serde(flatten)]
    pub poll: Poll,
    pub options: Vec<PollOption>,
}

pub async fn list_by_owner(pool: &SqlitePool, owner_id: &str) -> Result<Vec<OwnedPoll>, AppError> {
    let polls = poll::find_by_owner(pool, owner_id).await?;
    let mut owned = Vec::with_capacity(polls.len());
    for poll_row in polls {
        let options = poll::options_for(pool, poll_row.id).await?;
        owned.push(OwnedPoll { poll: poll_row, options });
    }
    Ok(owned)
}

/// All-polls listing entry: the derived status lets clients grey out
/// pending and closed polls.
#[derive(Debug, Serialize)]
pub struct ListedPoll {
    #[serde(flatten)]
    pub poll: Poll,
    pub status: PollStatus,
}

pub async fn list_all(pool: &SqlitePool) -> Result<Vec<ListedPoll>, AppError> {
    let now = Utc::now().naive_utc();
    let polls = poll::find_all(pool).await?;
    Ok(polls
        .into_iter()
        .map(|p| {
            let status = poll_status(now, p.start_date, p.end_date);
            ListedPoll { poll: p, status }
        })
        .collect())
}
