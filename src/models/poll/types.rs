use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// The four supported question shapes. Stored as snake_case text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    SingleChoice,
    MultipleChoice,
    Scale,
    Text,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::SingleChoice => "single_choice",
            QuestionType::MultipleChoice => "multiple_choice",
            QuestionType::Scale => "scale",
            QuestionType::Text => "text",
        }
    }

    pub fn parse(s: &str) -> Result<Self, AppError> {
        match s {
            "single_choice" => Ok(QuestionType::SingleChoice),
            "multiple_choice" => Ok(QuestionType::MultipleChoice),
            "scale" => Ok(QuestionType::Scale),
            "text" => Ok(QuestionType::Text),
            other => Err(AppError::Validation(format!("Unknown question type: {other}"))),
        }
    }

    /// Choice types require a non-empty option set; scale polls may carry
    /// optional display labels; text polls never have options.
    pub fn is_choice(&self) -> bool {
        matches!(self, QuestionType::SingleChoice | QuestionType::MultipleChoice)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Poll {
    pub id: i64,
    pub title: String,
    pub owner_id: String,
    pub question_type: QuestionType,
    pub start_date: NaiveDateTime,
    pub end_date: Option<NaiveDateTime>,
    pub is_anonymous: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PollOption {
    pub id: i64,
    pub poll_id: i64,
    #[sqlx(rename = "option_text")]
    pub text: String,
}

/// Validated input for poll creation and update. Options are already
/// trimmed and non-empty by the time a draft exists.
#[derive(Debug, Clone)]
pub struct PollDraft {
    pub title: String,
    pub question_type: QuestionType,
    pub options: Vec<String>,
    pub is_anonymous: bool,
    pub start_date: NaiveDateTime,
    pub end_date: Option<NaiveDateTime>,
}
