use serde::Serialize;

/// A recorded vote row. Multiple-choice ballots span several rows sharing
/// `voted_by` and `created_at`, distinguished by `option_rank`.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Vote {
    pub id: i64,
    pub poll_id: i64,
    pub option_id: Option<i64>,
    /// Display identity; NULL on anonymous polls so result views cannot
    /// re-identify the voter.
    #[sqlx(rename = "user_id")]
    pub display_user_id: Option<String>,
    pub text_answer: Option<String>,
    pub scale_value: Option<i64>,
    /// True respondent identifier, kept for uniqueness enforcement only.
    pub voted_by: String,
    pub option_rank: i64,
    pub created_at: String,
}

/// Payload for one row of a ballot; exactly one field is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct BallotRow<'a> {
    pub option_id: Option<i64>,
    pub text_answer: Option<&'a str>,
    pub scale_value: Option<i64>,
}

/// Distinct voter entry for the admin summary view.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Voter {
    pub voted_by: String,
    pub email: Option<String>,
}
