use actix_session::Session;
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;

use crate::auth::session::require_user;
use crate::errors::AppError;
use crate::polls::voting::{self, BallotInput};

/// Ballot body. Scale polls send the chosen value in `option_ids[0]`,
/// matching the submission form contract.
#[derive(Deserialize)]
pub struct BallotForm {
    #[serde(default)]
    pub option_ids: Vec<i64>,
    #[serde(default)]
    pub text_answer: String,
}

/// POST /api/polls/{id}/vote
pub async fn cast(
    pool: web::Data<SqlitePool>,
    session: Session,
    path: web::Path<i64>,
    body: web::Json<BallotForm>,
) -> Result<HttpResponse, AppError> {
    let caller = require_user(&session)?;
    let input = BallotInput {
        option_ids: body.option_ids.clone(),
        text_answer: body.text_answer.clone(),
    };
    voting::record_vote(&pool, &caller, path.into_inner(), &input).await?;
    Ok(HttpResponse::Created().json(json!({ "status": "vote recorded" })))
}
