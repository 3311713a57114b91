use chrono::NaiveDateTime;
use serde::Serialize;

/// Derived poll state. Never persisted — always recomputed from the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PollStatus {
    Pending,
    Active,
    Closed,
}

/// The one place window comparisons happen. Both boundary instants are
/// inclusive: a vote exactly at `start` or `end` is in the window.
pub fn poll_status(
    now: NaiveDateTime,
    start: NaiveDateTime,
    end: Option<NaiveDateTime>,
) -> PollStatus {
    if now < start {
        PollStatus::Pending
    } else if end.is_some_and(|e| now > e) {
        PollStatus::Closed
    } else {
        PollStatus::Active
    }
}
