use actix_session::Session;
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;

use crate::auth::session::require_user;
use crate::errors::AppError;
use crate::polls::lifecycle;

#[derive(Deserialize)]
pub struct PollForm {
    pub title: String,
    pub question_type: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub is_anonymous: bool,
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
}

/// POST /api/polls — create a poll (admin only, enforced by the lifecycle).
pub async fn create(
    pool: web::Data<SqlitePool>,
    session: Session,
    body: web::Json<PollForm>,
) -> Result<HttpResponse, AppError> {
    let caller = require_user(&session)?;
    let draft = lifecycle::build_draft(
        &body.title,
        &body.question_type,
        &body.options,
        body.is_anonymous,
        &body.start_date,
        body.end_date.as_deref(),
    )?;
    let poll = lifecycle::create_poll(&pool, &caller, &draft).await?;
    Ok(HttpResponse::Created().json(poll))
}

/// GET /api/polls — every poll with its derived status.
pub async fn list_all(
    pool: web::Data<SqlitePool>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    require_user(&session)?;
    let polls = lifecycle::list_all(&pool).await?;
    Ok(HttpResponse::Ok().json(polls))
}

/// GET /api/polls/mine — the caller's polls, options included.
pub async fn list_mine(
    pool: web::Data<SqlitePool>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let caller = require_user(&session)?;
    let polls = lifecycle::list_by_owner(&pool, &caller).await?;
    Ok(HttpResponse::Ok().json(polls))
}

/// GET /api/polls/{id} — poll, options, status, and the caller's voted flag.
pub async fn read(
    pool: web::Data<SqlitePool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let caller = require_user(&session)?;
    let detail = lifecycle::poll_detail(&pool, &caller, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(detail))
}

/// PUT /api/polls/{id} — replace scalars and the option set.
pub async fn update(
    pool: web::Data<SqlitePool>,
    session: Session,
    path: web::Path<i64>,
    body: web::Json<PollForm>,
) -> Result<HttpResponse, AppError> {
    let caller = require_user(&session)?;
    let draft = lifecycle::build_draft(
        &body.title,
        &body.question_type,
        &body.options,
        body.is_anonymous,
        &body.start_date,
        body.end_date.as_deref(),
    )?;
    lifecycle::update_poll(&pool, &caller, path.into_inner(), &draft).await?;
    Ok(HttpResponse::Ok().json(json!({ "status": "updated" })))
}

/// DELETE /api/polls/{id} — cascade votes, options, then the poll.
pub async fn delete(
    pool: web::Data<SqlitePool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let caller = require_user(&session)?;
    lifecycle::delete_poll(&pool, &caller, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
