use actix_session::Session;

use crate::errors::AppError;

pub fn get_user_id(session: &Session) -> Option<String> {
    session.get::<String>("user_id").unwrap_or(None)
}

/// The authenticated caller's id, or `Unauthorized` if there is no session.
pub fn require_user(session: &Session) -> Result<String, AppError> {
    get_user_id(session).ok_or(AppError::Unauthorized)
}
