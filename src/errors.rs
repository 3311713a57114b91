use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use std::fmt;

/// Request-conflict subtypes. All map to HTTP 409 but carry distinct
/// messages so clients can tell a closed poll from a duplicate ballot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    AlreadyVoted,
    PollInactive,
    PollHasVotes,
    DuplicateEmail,
    SelfDelete,
}

impl ConflictKind {
    pub fn message(&self) -> &'static str {
        match self {
            ConflictKind::AlreadyVoted => "You have already voted on this poll",
            ConflictKind::PollInactive => "This poll is not currently active",
            ConflictKind::PollHasVotes => "Poll already has recorded votes and can no longer be edited",
            ConflictKind::DuplicateEmail => "An account with this email already exists",
            ConflictKind::SelfDelete => "Cannot delete your own account",
        }
    }
}

#[derive(Debug)]
pub enum AppError {
    Db(sqlx::Error),
    Hash(String),
    Export(String),
    NotFound,
    Unauthorized,
    Forbidden(String),
    Validation(String),
    Conflict(ConflictKind),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Db(e) => write!(f, "Database error: {e}"),
            AppError::Hash(e) => write!(f, "Hash error: {e}"),
            AppError::Export(e) => write!(f, "Export error: {e}"),
            AppError::NotFound => write!(f, "Not found"),
            AppError::Unauthorized => write!(f, "Unauthorized"),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {msg}"),
            AppError::Validation(msg) => write!(f, "Validation failed: {msg}"),
            AppError::Conflict(kind) => write!(f, "Conflict: {}", kind.message()),
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::NotFound => HttpResponse::NotFound().json(json!({ "error": "Not found" })),
            AppError::Unauthorized => {
                HttpResponse::Unauthorized().json(json!({ "error": "Please log in" }))
            }
            AppError::Forbidden(msg) => HttpResponse::Forbidden().json(json!({ "error": msg })),
            AppError::Validation(msg) => HttpResponse::BadRequest().json(json!({ "error": msg })),
            AppError::Conflict(kind) => {
                HttpResponse::Conflict().json(json!({ "error": kind.message() }))
            }
            _ => {
                log::error!("{self}");
                HttpResponse::InternalServerError()
                    .json(json!({ "error": "Internal server error" }))
            }
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Db(e)
    }
}
