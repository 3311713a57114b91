use actix_session::Session;
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;

use crate::auth::session::require_user;
use crate::auth::{password, validate};
use crate::errors::AppError;
use crate::models::{poll, user};

#[derive(Deserialize)]
pub struct ProfileForm {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
}

#[derive(Deserialize)]
pub struct PasswordForm {
    pub current_password: String,
    pub new_password: String,
}

/// GET /api/profile — the current user plus their poll count.
pub async fn profile(
    pool: web::Data<SqlitePool>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let caller = require_user(&session)?;
    let me = user::find_by_id(&pool, &caller).await?.ok_or(AppError::NotFound)?;
    let poll_count = poll::count_by_owner(&pool, &caller).await?;
    Ok(HttpResponse::Ok().json(json!({ "user": me, "poll_count": poll_count })))
}

/// PUT /api/profile — update name and email.
pub async fn update_profile(
    pool: web::Data<SqlitePool>,
    session: Session,
    body: web::Json<ProfileForm>,
) -> Result<HttpResponse, AppError> {
    let caller = require_user(&session)?;

    let mut errors = Vec::new();
    errors.extend(validate::validate_name(&body.firstname, "First name"));
    errors.extend(validate::validate_name(&body.lastname, "Last name"));
    errors.extend(validate::validate_email(&body.email));
    if !errors.is_empty() {
        return Err(AppError::Validation(errors.join("; ")));
    }

    user::update_profile(
        &pool,
        &caller,
        body.firstname.trim(),
        body.lastname.trim(),
        body.email.trim(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(json!({ "status": "updated" })))
}

/// PUT /api/profile/password — verify the current password, store a new hash.
pub async fn change_password(
    pool: web::Data<SqlitePool>,
    session: Session,
    body: web::Json<PasswordForm>,
) -> Result<HttpResponse, AppError> {
    let caller = require_user(&session)?;
    if let Some(msg) = validate::validate_password(&body.new_password) {
        return Err(AppError::Validation(msg));
    }

    let me = user::find_by_id(&pool, &caller).await?.ok_or(AppError::NotFound)?;
    // Re-verify the current password even inside an authenticated session.
    crate::auth::identity::verify_credential(&pool, &me.email, &body.current_password).await?;

    let hash = password::hash_password(&body.new_password).map_err(AppError::Hash)?;
    user::set_password_hash(&pool, &caller, &hash).await?;

    log::info!("Password changed for {caller}");
    Ok(HttpResponse::Ok().json(json!({ "status": "password updated" })))
}
