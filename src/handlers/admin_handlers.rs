use actix_session::Session;
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;

use crate::auth::gate::{self, ROLE_ADMIN, ROLE_USER};
use crate::auth::identity;
use crate::auth::session::require_user;
use crate::errors::{AppError, ConflictKind};
use crate::models::user;
use crate::polls::{export, results};

#[derive(Deserialize)]
pub struct RoleForm {
    pub email: String,
    pub role: String,
}

#[derive(Deserialize)]
pub struct DownloadQuery {
    pub format: String,
}

/// GET /api/admin/users
pub async fn list_users(
    pool: web::Data<SqlitePool>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let caller = require_user(&session)?;
    gate::require_admin(&pool, &caller).await?;
    let users = user::find_all(&pool).await?;
    Ok(HttpResponse::Ok().json(users))
}

/// POST /api/admin/users/role — set a user's role by email.
pub async fn set_role(
    pool: web::Data<SqlitePool>,
    session: Session,
    body: web::Json<RoleForm>,
) -> Result<HttpResponse, AppError> {
    let caller = require_user(&session)?;
    gate::require_admin(&pool, &caller).await?;

    if body.role != ROLE_ADMIN && body.role != ROLE_USER {
        return Err(AppError::Validation(format!("Unknown role: {}", body.role)));
    }
    let target = user::find_by_email(&pool, body.email.trim())
        .await?
        .ok_or(AppError::NotFound)?;
    identity::set_role(&pool, &target.id, &body.role).await?;
    Ok(HttpResponse::Ok().json(json!({ "id": target.id, "role": body.role })))
}

/// DELETE /api/admin/users/{id} — delete a user and cascade their polls.
pub async fn delete_user(
    pool: web::Data<SqlitePool>,
    session: Session,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let caller = require_user(&session)?;
    gate::require_admin(&pool, &caller).await?;

    let target = path.into_inner();
    if target == caller {
        return Err(AppError::Conflict(ConflictKind::SelfDelete));
    }
    user::delete_cascade(&pool, &target).await?;

    log::info!("User {target} deleted by {caller}");
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/admin/polls/{id}/summary
pub async fn summary(
    pool: web::Data<SqlitePool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let caller = require_user(&session)?;
    gate::require_admin(&pool, &caller).await?;
    let summary = results::summarize(&pool, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(summary))
}

/// GET /api/admin/polls/{id}/summary/download?format=csv|json
pub async fn download_summary(
    pool: web::Data<SqlitePool>,
    session: Session,
    path: web::Path<i64>,
    query: web::Query<DownloadQuery>,
) -> Result<HttpResponse, AppError> {
    let caller = require_user(&session)?;
    gate::require_admin(&pool, &caller).await?;

    let poll_id = path.into_inner();
    let summary = results::summarize(&pool, poll_id).await?;

    match query.format.as_str() {
        "csv" => {
            let body = export::summary_csv(&summary)?;
            Ok(HttpResponse::Ok()
                .content_type("text/csv")
                .insert_header((
                    "Content-Disposition",
                    format!("attachment; filename=poll_{poll_id}_summary.csv"),
                ))
                .body(body))
        }
        "json" => {
            let body = export::summary_json(&summary)?;
            Ok(HttpResponse::Ok()
                .content_type("application/json")
                .insert_header((
                    "Content-Disposition",
                    format!("attachment; filename=poll_{poll_id}_summary.json"),
                ))
                .body(body))
        }
        other => Err(AppError::Validation(format!(
            "Invalid format '{other}'. Use csv or json"
        ))),
    }
}
