//! Poll lifecycle: draft admission, create/update/delete, cascades.

use chrono::Duration;

use pollbox::errors::{AppError, ConflictKind};
use pollbox::models::poll::{self, QuestionType};
use pollbox::models::vote;
use pollbox::polls::results::{Tally, summarize};
use pollbox::polls::voting::{BallotInput, record_vote};
use pollbox::polls::{lifecycle, status::PollStatus};

mod common;
use common::{ADMIN_ID, ALICE_ID, BOB_ID, active_draft, now, setup_test_db};

// ---------------------------------------------------------------------------
// Draft admission
// ---------------------------------------------------------------------------

#[test]
fn draft_requires_options_for_choice_polls() {
    let result = lifecycle::build_draft(
        "Favorite color",
        "single_choice",
        &["  ".to_string(), "".to_string()],
        false,
        "2025-06-01T10:00",
        None,
    );
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[test]
fn draft_rejects_options_on_text_polls() {
    let result = lifecycle::build_draft(
        "Feedback",
        "text",
        &["stray option".to_string()],
        false,
        "2025-06-01T10:00",
        None,
    );
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[test]
fn draft_allows_optional_scale_labels() {
    let with_label = lifecycle::build_draft(
        "Rate us",
        "scale",
        &["Satisfaction".to_string()],
        false,
        "2025-06-01T10:00",
        None,
    )
    .expect("scale draft with label");
    assert_eq!(with_label.options, vec!["Satisfaction".to_string()]);

    let without = lifecycle::build_draft("Rate us", "scale", &[], false, "2025-06-01T10:00", None)
        .expect("scale draft without label");
    assert!(without.options.is_empty());
}

#[test]
fn draft_parses_both_datetime_formats() {
    let draft = lifecycle::build_draft(
        "Window",
        "text",
        &[],
        false,
        "2025-06-01T10:00",
        Some("2025-06-02T10:00:30"),
    )
    .expect("draft");
    assert_eq!(draft.start_date.format("%H:%M:%S").to_string(), "10:00:00");
    assert_eq!(draft.end_date.unwrap().format("%H:%M:%S").to_string(), "10:00:30");
}

#[test]
fn draft_rejects_end_before_start() {
    let result = lifecycle::build_draft(
        "Backwards",
        "text",
        &[],
        false,
        "2025-06-02T10:00",
        Some("2025-06-01T10:00"),
    );
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[test]
fn draft_rejects_bad_dates_and_unknown_type() {
    assert!(matches!(
        lifecycle::build_draft("P", "text", &[], false, "junk", None),
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        lifecycle::build_draft("P", "ranked_choice", &[], false, "2025-06-01T10:00", None),
        Err(AppError::Validation(_))
    ));
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_persists_poll_and_options() {
    let db = setup_test_db().await;
    let pool = db.pool();

    let draft = active_draft(QuestionType::SingleChoice, &["Red", "Blue"]);
    let created = lifecycle::create_poll(pool, ADMIN_ID, &draft).await.expect("create");

    let options = poll::options_for(pool, created.id).await.expect("options");
    assert_eq!(options.len(), 2);
    assert_eq!(options[0].text, "Red");

    // Fresh poll tallies to zero for every option
    let summary = summarize(pool, created.id).await.expect("summary");
    assert_eq!(
        summary.results,
        Tally::Choice(vec![("Red".to_string(), 0), ("Blue".to_string(), 0)])
    );
    assert!(summary.voters.is_empty());
}

#[tokio::test]
async fn create_requires_admin_role() {
    let db = setup_test_db().await;
    let draft = active_draft(QuestionType::Text, &[]);
    let result = lifecycle::create_poll(db.pool(), ALICE_ID, &draft).await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_replaces_scalars_and_option_set() {
    let db = setup_test_db().await;
    let pool = db.pool();

    let created = lifecycle::create_poll(pool, ADMIN_ID, &active_draft(QuestionType::SingleChoice, &["Red", "Blue"]))
        .await
        .expect("create");

    let mut updated = active_draft(QuestionType::MultipleChoice, &["Green", "Yellow", "Cyan"]);
    updated.title = "New title".to_string();
    lifecycle::update_poll(pool, ADMIN_ID, created.id, &updated).await.expect("update");

    let reloaded = lifecycle::get_poll(pool, created.id).await.expect("get");
    assert_eq!(reloaded.title, "New title");
    assert_eq!(reloaded.question_type, QuestionType::MultipleChoice);

    let options = poll::options_for(pool, created.id).await.expect("options");
    let texts: Vec<&str> = options.iter().map(|o| o.text.as_str()).collect();
    assert_eq!(texts, vec!["Green", "Yellow", "Cyan"]);
}

#[tokio::test]
async fn update_denied_for_non_owner() {
    let db = setup_test_db().await;
    let pool = db.pool();

    let created = lifecycle::create_poll(pool, ADMIN_ID, &active_draft(QuestionType::Text, &[]))
        .await
        .expect("create");
    let result = lifecycle::update_poll(pool, BOB_ID, created.id, &active_draft(QuestionType::Text, &[])).await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn update_refused_once_votes_exist() {
    let db = setup_test_db().await;
    let pool = db.pool();

    let created = lifecycle::create_poll(pool, ADMIN_ID, &active_draft(QuestionType::SingleChoice, &["Red", "Blue"]))
        .await
        .expect("create");
    let options = poll::options_for(pool, created.id).await.expect("options");

    let input = BallotInput { option_ids: vec![options[0].id], text_answer: String::new() };
    record_vote(pool, ALICE_ID, created.id, &input).await.expect("vote");

    let result = lifecycle::update_poll(
        pool,
        ADMIN_ID,
        created.id,
        &active_draft(QuestionType::SingleChoice, &["Purple"]),
    )
    .await;
    assert!(matches!(result, Err(AppError::Conflict(ConflictKind::PollHasVotes))));

    // The existing option set must be untouched
    let options_after = poll::options_for(pool, created.id).await.expect("options");
    assert_eq!(options_after.len(), 2);
    assert_eq!(options_after[0].text, "Red");
}

#[tokio::test]
async fn update_missing_poll_is_not_found() {
    let db = setup_test_db().await;
    let result =
        lifecycle::update_poll(db.pool(), ADMIN_ID, 9999, &active_draft(QuestionType::Text, &[])).await;
    assert!(matches!(result, Err(AppError::NotFound)));
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_cascades_votes_and_options() {
    let db = setup_test_db().await;
    let pool = db.pool();

    let created = lifecycle::create_poll(pool, ADMIN_ID, &active_draft(QuestionType::SingleChoice, &["Red", "Blue"]))
        .await
        .expect("create");
    let options = poll::options_for(pool, created.id).await.expect("options");
    let input = BallotInput { option_ids: vec![options[1].id], text_answer: String::new() };
    record_vote(pool, ALICE_ID, created.id, &input).await.expect("vote");

    lifecycle::delete_poll(pool, ADMIN_ID, created.id).await.expect("delete");

    assert!(matches!(lifecycle::get_poll(pool, created.id).await, Err(AppError::NotFound)));
    assert!(matches!(summarize(pool, created.id).await, Err(AppError::NotFound)));
    assert!(poll::options_for(pool, created.id).await.expect("options").is_empty());
    assert_eq!(vote::count_for_poll(pool, created.id).await.expect("count"), 0);
}

#[tokio::test]
async fn delete_denied_for_non_owner() {
    let db = setup_test_db().await;
    let pool = db.pool();

    let created = lifecycle::create_poll(pool, ADMIN_ID, &active_draft(QuestionType::Text, &[]))
        .await
        .expect("create");
    let result = lifecycle::delete_poll(pool, ALICE_ID, created.id).await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn delete_missing_poll_is_not_found() {
    let db = setup_test_db().await;
    let result = lifecycle::delete_poll(db.pool(), ADMIN_ID, 424242).await;
    assert!(matches!(result, Err(AppError::NotFound)));
}

// ---------------------------------------------------------------------------
// Read projections
// ---------------------------------------------------------------------------

#[tokio::test]
async fn poll_detail_reports_status_and_voted_flag() {
    let db = setup_test_db().await;
    let pool = db.pool();

    let created = lifecycle::create_poll(pool, ADMIN_ID, &active_draft(QuestionType::SingleChoice, &["Red"]))
        .await
        .expect("create");
    let options = poll::options_for(pool, created.id).await.expect("options");

    let before = lifecycle::poll_detail(pool, ALICE_ID, created.id).await.expect("detail");
    assert_eq!(before.status, PollStatus::Active);
    assert!(!before.has_voted);

    let input = BallotInput { option_ids: vec![options[0].id], text_answer: String::new() };
    record_vote(pool, ALICE_ID, created.id, &input).await.expect("vote");

    let after = lifecycle::poll_detail(pool, ALICE_ID, created.id).await.expect("detail");
    assert!(after.has_voted);
    // A different caller has not voted
    let other = lifecycle::poll_detail(pool, BOB_ID, created.id).await.expect("detail");
    assert!(!other.has_voted);
}

#[tokio::test]
async fn listings_cover_ownership_and_status() {
    let db = setup_test_db().await;
    let pool = db.pool();

    lifecycle::create_poll(pool, ADMIN_ID, &active_draft(QuestionType::Text, &[]))
        .await
        .expect("create");
    let mut pending = active_draft(QuestionType::Text, &[]);
    pending.start_date = now() + Duration::hours(2);
    pending.end_date = None;
    lifecycle::create_poll(pool, ADMIN_ID, &pending).await.expect("create pending");

    let mine = lifecycle::list_by_owner(pool, ADMIN_ID).await.expect("mine");
    assert_eq!(mine.len(), 2);
    assert!(lifecycle::list_by_owner(pool, ALICE_ID).await.expect("alice").is_empty());

    let all = lifecycle::list_all(pool).await.expect("all");
    assert_eq!(all.len(), 2);
    // Newest first; the pending poll was created last
    assert_eq!(all[0].status, PollStatus::Pending);
    assert_eq!(all[1].status, PollStatus::Active);
}
