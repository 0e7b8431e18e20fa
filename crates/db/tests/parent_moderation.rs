//! Integration tests for parent moderation windows on the users table.

use chrono::{Duration, Utc};
use sqlx::PgPool;
use syncdesk_core::roles::Role;
use syncdesk_db::models::user::CreateUser;
use syncdesk_db::repositories::UserRepo;

fn new_user(phone: &str, role: Role, school_id: i64) -> CreateUser {
    CreateUser {
        phone: phone.to_string(),
        role,
        school_id,
        name: None,
        email: None,
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_restrict_parent_scoping(pool: PgPool) {
    let parent = UserRepo::create(&pool, &new_user("+912000000001", Role::Parent, 1))
        .await
        .unwrap();
    let teacher = UserRepo::create(&pool, &new_user("+912000000002", Role::Teacher, 1))
        .await
        .unwrap();
    let until = Utc::now() + Duration::days(7);

    let applied = UserRepo::restrict_parent(&pool, parent.id, 1, until)
        .await
        .unwrap();
    assert!(applied.is_some());

    let user = UserRepo::find_by_id(&pool, parent.id).await.unwrap().unwrap();
    assert!(user.restricted_to_admin_until.is_some());

    // Wrong role and wrong school are both refused.
    assert!(UserRepo::restrict_parent(&pool, teacher.id, 1, until)
        .await
        .unwrap()
        .is_none());
    assert!(UserRepo::restrict_parent(&pool, parent.id, 2, until)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_block_parent_tickets_round_trip(pool: PgPool) {
    let parent = UserRepo::create(&pool, &new_user("+912000000003", Role::Parent, 1))
        .await
        .unwrap();
    let until = Utc::now() + Duration::hours(48);

    let applied = UserRepo::block_parent_tickets(&pool, parent.id, 1, until)
        .await
        .unwrap();
    assert!(applied.is_some());

    let user = UserRepo::find_by_id(&pool, parent.id).await.unwrap().unwrap();
    let stored = user.ticket_creation_blocked_until.unwrap();
    assert!((stored - until).num_seconds().abs() < 1);
}
