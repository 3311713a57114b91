use actix_session::Session;
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;

use crate::auth::{identity, password, validate};
use crate::errors::AppError;
use crate::models::user::{self, NewUser};

#[derive(Deserialize)]
pub struct RegisterForm {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// POST /api/register — create an account with the `user` role.
pub async fn register(
    pool: web::Data<SqlitePool>,
    body: web::Json<RegisterForm>,
) -> Result<HttpResponse, AppError> {
    let mut errors = Vec::new();
    errors.extend(validate::validate_name(&body.firstname, "First name"));
    errors.extend(validate::validate_name(&body.lastname, "Last name"));
    errors.extend(validate::validate_email(&body.email));
    errors.extend(validate::validate_password(&body.password));
    if !errors.is_empty() {
        return Err(AppError::Validation(errors.join("; ")));
    }

    let hash = password::hash_password(&body.password).map_err(AppError::Hash)?;
    let new_user = NewUser {
        id: identity::mint_user_id(),
        firstname: body.firstname.trim().to_string(),
        lastname: body.lastname.trim().to_string(),
        email: body.email.trim().to_string(),
        password_hash: hash,
        role: "user".to_string(),
    };
    user::create(&pool, &new_user).await?;

    log::info!("Registered user {} ({})", new_user.id, new_user.email);
    Ok(HttpResponse::Created().json(json!({
        "id": new_user.id,
        "email": new_user.email,
        "role": new_user.role,
    })))
}

/// POST /api/login — verify the credential and establish a session.
pub async fn login(
    pool: web::Data<SqlitePool>,
    session: Session,
    body: web::Json<LoginForm>,
) -> Result<HttpResponse, AppError> {
    let user_id = identity::verify_credential(&pool, body.email.trim(), &body.password).await?;
    let role = identity::get_role_or_default(&pool, &user_id).await;

    session.renew();
    let _ = session.insert("user_id", &user_id);

    log::info!("Login successful for {user_id}");
    Ok(HttpResponse::Ok().json(json!({ "user_id": user_id, "role": role })))
}

/// POST /api/logout — drop the session.
pub async fn logout(session: Session) -> HttpResponse {
    session.purge();
    HttpResponse::Ok().json(json!({ "status": "logged out" }))
}
