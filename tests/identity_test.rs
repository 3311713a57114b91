//! Identity provider and authorization gate.

use pollbox::auth::{gate, identity, password};
use pollbox::errors::{AppError, ConflictKind};
use pollbox::models::user::{self, NewUser};

mod common;
use common::{ADMIN_ID, ALICE_EMAIL, ALICE_ID, BOB_ID, TEST_PASSWORD, setup_test_db};

#[tokio::test]
async fn verify_credential_yields_stable_user_id() {
    let db = setup_test_db().await;
    let pool = db.pool();

    let id = identity::verify_credential(pool, ALICE_EMAIL, TEST_PASSWORD).await.expect("login");
    assert_eq!(id, ALICE_ID);
}

#[tokio::test]
async fn bad_password_and_unknown_email_fail_alike() {
    let db = setup_test_db().await;
    let pool = db.pool();

    let wrong = identity::verify_credential(pool, ALICE_EMAIL, "not-the-password").await;
    assert!(matches!(wrong, Err(AppError::Unauthorized)));

    let unknown = identity::verify_credential(pool, "nobody@test.com", TEST_PASSWORD).await;
    assert!(matches!(unknown, Err(AppError::Unauthorized)));
}

#[tokio::test]
async fn role_changes_are_visible_to_the_gate_immediately() {
    let db = setup_test_db().await;
    let pool = db.pool();

    assert!(matches!(
        gate::require_admin(pool, ALICE_ID).await,
        Err(AppError::Forbidden(_))
    ));

    identity::set_role(pool, ALICE_ID, gate::ROLE_ADMIN).await.expect("promote");
    gate::require_admin(pool, ALICE_ID).await.expect("admin now");
    assert_eq!(identity::get_role(pool, ALICE_ID).await.expect("role"), "admin");

    identity::set_role(pool, ALICE_ID, gate::ROLE_USER).await.expect("demote");
    assert!(matches!(
        gate::require_admin(pool, ALICE_ID).await,
        Err(AppError::Forbidden(_))
    ));
}

#[tokio::test]
async fn set_role_for_unknown_user_is_not_found() {
    let db = setup_test_db().await;
    let result = identity::set_role(db.pool(), "no-such-user", "admin").await;
    assert!(matches!(result, Err(AppError::NotFound)));
}

#[tokio::test]
async fn owner_or_admin_gate() {
    let db = setup_test_db().await;
    let pool = db.pool();

    gate::require_owner_or_admin(pool, ALICE_ID, ALICE_ID).await.expect("owner");
    gate::require_owner_or_admin(pool, ADMIN_ID, ALICE_ID).await.expect("admin");
    assert!(matches!(
        gate::require_owner_or_admin(pool, BOB_ID, ALICE_ID).await,
        Err(AppError::Forbidden(_))
    ));
}

#[tokio::test]
async fn duplicate_email_conflicts_on_create_and_update() {
    let db = setup_test_db().await;
    let pool = db.pool();

    let dup = NewUser {
        id: identity::mint_user_id(),
        firstname: "Dupe".to_string(),
        lastname: "Tester".to_string(),
        email: ALICE_EMAIL.to_string(),
        password_hash: "x".to_string(),
        role: "user".to_string(),
    };
    assert!(matches!(
        user::create(pool, &dup).await,
        Err(AppError::Conflict(ConflictKind::DuplicateEmail))
    ));

    let steal = user::update_profile(pool, BOB_ID, "Bob", "Tester", ALICE_EMAIL).await;
    assert!(matches!(steal, Err(AppError::Conflict(ConflictKind::DuplicateEmail))));
}

#[tokio::test]
async fn password_change_invalidates_old_credential() {
    let db = setup_test_db().await;
    let pool = db.pool();

    let new_hash = password::hash_password("FreshSecret9").expect("hash");
    user::set_password_hash(pool, ALICE_ID, &new_hash).await.expect("set");

    assert!(matches!(
        identity::verify_credential(pool, ALICE_EMAIL, TEST_PASSWORD).await,
        Err(AppError::Unauthorized)
    ));
    let id = identity::verify_credential(pool, ALICE_EMAIL, "FreshSecret9").await.expect("login");
    assert_eq!(id, ALICE_ID);
}

#[test]
fn minted_ids_are_opaque_hex() {
    let a = identity::mint_user_id();
    let b = identity::mint_user_id();
    assert_eq!(a.len(), 64);
    assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    assert_ne!(a, b);
}

#[tokio::test]
async fn best_effort_role_lookup_defaults_to_empty() {
    let db = setup_test_db().await;
    let role = identity::get_role_or_default(db.pool(), "no-such-user").await;
    assert_eq!(role, "");
}
