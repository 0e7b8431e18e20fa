//! Integration tests for the ticket repository lifecycle paths.
//!
//! Exercises the repository layer against a real database to verify that:
//! - Soft-deleted tickets are hidden from find and list queries
//! - A staff reply advances a pending ticket, a parent reply does not
//! - Reopen requests are capped per ticket and reset resolution state
//! - Satisfaction confirmation applies only to resolved tickets
//! - Visibility filters keep parents and other schools out

use sqlx::PgPool;
use syncdesk_core::roles::Role;
use syncdesk_core::ticket::{TicketCategory, TicketStatus};
use syncdesk_db::models::ticket::CreateTicket;
use syncdesk_db::models::user::CreateUser;
use syncdesk_db::repositories::{TicketRepo, UserRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_user(phone: &str, role: Role, school_id: i64) -> CreateUser {
    CreateUser {
        phone: phone.to_string(),
        role,
        school_id,
        name: None,
        email: None,
    }
}

fn new_ticket(school_id: i64, parent_id: i64, category: TicketCategory) -> CreateTicket {
    CreateTicket {
        school_id,
        created_by_id: parent_id,
        category,
        urgency: false,
        title: Some("Lunch menu question".to_string()),
        description: Some("What changed this term?".to_string()),
        student_ids: vec![],
    }
}

// ---------------------------------------------------------------------------
// Test: soft delete hides the ticket everywhere
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_soft_delete_hides_from_find_and_list(pool: PgPool) {
    let parent = UserRepo::create(&pool, &new_user("+910000000001", Role::Parent, 1))
        .await
        .unwrap();
    let ticket = TicketRepo::create(&pool, &new_ticket(1, parent.id, TicketCategory::Other))
        .await
        .unwrap();

    let deleted = TicketRepo::soft_delete(&pool, ticket.id).await.unwrap();
    assert!(deleted, "soft_delete should return true on first call");

    let found = TicketRepo::find_for_user(&pool, ticket.id, parent.id, Role::Parent, 1)
        .await
        .unwrap();
    assert!(found.is_none(), "owner should no longer see a deleted ticket");

    let staff_list = TicketRepo::list_for_user(&pool, 0, Role::Principal, 1)
        .await
        .unwrap();
    assert!(
        !staff_list.iter().any(|t| t.id == ticket.id),
        "deleted ticket should not appear in staff listings"
    );

    // Second call is a no-op.
    let again = TicketRepo::soft_delete(&pool, ticket.id).await.unwrap();
    assert!(!again, "soft_delete should return false when already deleted");
}

// ---------------------------------------------------------------------------
// Test: visibility filters by ownership and school
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_visibility_scoping(pool: PgPool) {
    let parent = UserRepo::create(&pool, &new_user("+910000000002", Role::Parent, 1))
        .await
        .unwrap();
    let other_parent = UserRepo::create(&pool, &new_user("+910000000003", Role::Parent, 1))
        .await
        .unwrap();
    let ticket = TicketRepo::create(&pool, &new_ticket(1, parent.id, TicketCategory::FeeAccounts))
        .await
        .unwrap();

    // Another parent in the same school sees nothing.
    let peer = TicketRepo::find_for_user(&pool, ticket.id, other_parent.id, Role::Parent, 1)
        .await
        .unwrap();
    assert!(peer.is_none());

    // Staff in the same school see it, staff elsewhere do not.
    let same_school = TicketRepo::find_for_user(&pool, ticket.id, 999, Role::Teacher, 1)
        .await
        .unwrap();
    assert!(same_school.is_some());

    let other_school = TicketRepo::find_for_user(&pool, ticket.id, 999, Role::Teacher, 2)
        .await
        .unwrap();
    assert!(other_school.is_none());
}

// ---------------------------------------------------------------------------
// Test: staff reply advances a pending ticket
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_staff_reply_advances_pending(pool: PgPool) {
    let parent = UserRepo::create(&pool, &new_user("+910000000004", Role::Parent, 1))
        .await
        .unwrap();
    let staff = UserRepo::create(&pool, &new_user("+910000000005", Role::Office, 1))
        .await
        .unwrap();
    let ticket = TicketRepo::create(&pool, &new_ticket(1, parent.id, TicketCategory::Documents))
        .await
        .unwrap();
    assert_eq!(ticket.status().unwrap(), TicketStatus::Pending);

    // A parent reply leaves the status alone.
    TicketRepo::add_reply(&pool, ticket.id, parent.id, false, "Any update?")
        .await
        .unwrap();
    let t = TicketRepo::find_for_user(&pool, ticket.id, parent.id, Role::Parent, 1)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(t.status().unwrap(), TicketStatus::Pending);

    // A staff reply moves it to in-progress.
    TicketRepo::add_reply(&pool, ticket.id, staff.id, true, "Looking into it.")
        .await
        .unwrap();
    let t = TicketRepo::find_for_user(&pool, ticket.id, parent.id, Role::Parent, 1)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(t.status().unwrap(), TicketStatus::InProgress);

    // A further staff reply on an in-progress ticket changes nothing.
    TicketRepo::add_reply(&pool, ticket.id, staff.id, true, "Found the cause.")
        .await
        .unwrap();
    let t = TicketRepo::find_for_user(&pool, ticket.id, parent.id, Role::Parent, 1)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(t.status().unwrap(), TicketStatus::InProgress);

    let messages = TicketRepo::messages(&pool, ticket.id).await.unwrap();
    assert_eq!(messages.len(), 3);
}

// ---------------------------------------------------------------------------
// Test: reopen is capped at two per ticket
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_reopen_cap_and_state_reset(pool: PgPool) {
    let parent = UserRepo::create(&pool, &new_user("+910000000006", Role::Parent, 1))
        .await
        .unwrap();
    let ticket = TicketRepo::create(&pool, &new_ticket(1, parent.id, TicketCategory::Transport))
        .await
        .unwrap();

    for round in 0..2 {
        TicketRepo::set_status(&pool, ticket.id, 1, TicketStatus::Resolved)
            .await
            .unwrap();
        let satisfied = TicketRepo::mark_satisfied(&pool, ticket.id, parent.id)
            .await
            .unwrap();
        assert!(satisfied);

        let reopen = TicketRepo::request_reopen(&pool, ticket.id, parent.id, "Still broken")
            .await
            .unwrap();
        assert!(reopen.is_some(), "reopen {round} should be accepted");

        let t = TicketRepo::find_for_user(&pool, ticket.id, parent.id, Role::Parent, 1)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(t.status().unwrap(), TicketStatus::Pending);
        assert!(t.satisfied_at.is_none(), "reopen should clear satisfaction");
    }

    TicketRepo::set_status(&pool, ticket.id, 1, TicketStatus::Resolved)
        .await
        .unwrap();
    let third = TicketRepo::request_reopen(&pool, ticket.id, parent.id, "Third time")
        .await
        .unwrap();
    assert!(third.is_none(), "third reopen should be refused");
    assert_eq!(TicketRepo::reopen_count(&pool, ticket.id).await.unwrap(), 2);
}

// ---------------------------------------------------------------------------
// Test: reopen requires a resolved ticket owned by the caller
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_reopen_requires_resolved_and_ownership(pool: PgPool) {
    let parent = UserRepo::create(&pool, &new_user("+910000000007", Role::Parent, 1))
        .await
        .unwrap();
    let other = UserRepo::create(&pool, &new_user("+910000000008", Role::Parent, 1))
        .await
        .unwrap();
    let ticket = TicketRepo::create(&pool, &new_ticket(1, parent.id, TicketCategory::FeeAccounts))
        .await
        .unwrap();

    // Still pending.
    let pending = TicketRepo::request_reopen(&pool, ticket.id, parent.id, "Please")
        .await
        .unwrap();
    assert!(pending.is_none());

    // Resolved, but someone else's ticket.
    TicketRepo::set_status(&pool, ticket.id, 1, TicketStatus::Resolved)
        .await
        .unwrap();
    let stranger = TicketRepo::request_reopen(&pool, ticket.id, other.id, "Mine now")
        .await
        .unwrap();
    assert!(stranger.is_none());
}

// ---------------------------------------------------------------------------
// Test: satisfaction only sticks to resolved tickets
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_mark_satisfied_requires_resolved(pool: PgPool) {
    let parent = UserRepo::create(&pool, &new_user("+910000000009", Role::Parent, 1))
        .await
        .unwrap();
    let ticket = TicketRepo::create(&pool, &new_ticket(1, parent.id, TicketCategory::AcademicTeaching))
        .await
        .unwrap();

    let early = TicketRepo::mark_satisfied(&pool, ticket.id, parent.id)
        .await
        .unwrap();
    assert!(!early, "pending ticket cannot be marked satisfied");

    TicketRepo::set_status(&pool, ticket.id, 1, TicketStatus::Resolved)
        .await
        .unwrap();
    let ok = TicketRepo::mark_satisfied(&pool, ticket.id, parent.id)
        .await
        .unwrap();
    assert!(ok);
}

// ---------------------------------------------------------------------------
// Test: known-issue flag only applies to transport tickets
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_known_issue_transport_only(pool: PgPool) {
    let parent = UserRepo::create(&pool, &new_user("+910000000010", Role::Parent, 1))
        .await
        .unwrap();
    let transport = TicketRepo::create(&pool, &new_ticket(1, parent.id, TicketCategory::Transport))
        .await
        .unwrap();
    let fees = TicketRepo::create(&pool, &new_ticket(1, parent.id, TicketCategory::FeeAccounts))
        .await
        .unwrap();

    assert!(TicketRepo::set_known_issue(&pool, transport.id, 1, true)
        .await
        .unwrap());
    assert!(!TicketRepo::set_known_issue(&pool, fees.id, 1, true)
        .await
        .unwrap());
    // Wrong school is also refused.
    assert!(!TicketRepo::set_known_issue(&pool, transport.id, 2, false)
        .await
        .unwrap());
}

// ---------------------------------------------------------------------------
// Test: abuse flag overwrites, never accumulates
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_abuse_flag_overwrites(pool: PgPool) {
    let parent = UserRepo::create(&pool, &new_user("+910000000011", Role::Parent, 1))
        .await
        .unwrap();
    let staff_a = UserRepo::create(&pool, &new_user("+910000000012", Role::Teacher, 1))
        .await
        .unwrap();
    let staff_b = UserRepo::create(&pool, &new_user("+910000000013", Role::Office, 1))
        .await
        .unwrap();
    let ticket = TicketRepo::create(&pool, &new_ticket(1, parent.id, TicketCategory::Other))
        .await
        .unwrap();

    assert!(TicketRepo::flag_abuse(&pool, ticket.id, 1, staff_a.id)
        .await
        .unwrap());
    assert!(TicketRepo::flag_abuse(&pool, ticket.id, 1, staff_b.id)
        .await
        .unwrap());

    let flagged = TicketRepo::list_abuse_flagged(&pool, 1).await.unwrap();
    assert_eq!(flagged.len(), 1);
    assert_eq!(flagged[0].abuse_flagged_by_id, Some(staff_b.id));
}

// ---------------------------------------------------------------------------
// Test: creation history counts what the guardrails need
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_creation_history_counts(pool: PgPool) {
    let parent = UserRepo::create(&pool, &new_user("+910000000014", Role::Parent, 1))
        .await
        .unwrap();

    TicketRepo::create(&pool, &new_ticket(1, parent.id, TicketCategory::Other))
        .await
        .unwrap();
    let resolved = TicketRepo::create(&pool, &new_ticket(1, parent.id, TicketCategory::FeeAccounts))
        .await
        .unwrap();
    TicketRepo::set_status(&pool, resolved.id, 1, TicketStatus::Resolved)
        .await
        .unwrap();
    let mut urgent = new_ticket(1, parent.id, TicketCategory::Transport);
    urgent.urgency = true;
    TicketRepo::create(&pool, &urgent).await.unwrap();

    let now = chrono::Utc::now();
    let history = TicketRepo::creation_history(&pool, parent.id, 1, None, now)
        .await
        .unwrap();

    assert_eq!(history.open_count, 2, "resolved tickets are not open");
    assert_eq!(history.open_other_count, 1);
    assert_eq!(history.week_count, 3);
    assert_eq!(history.urgent_week_count, 1);
    assert!(history.last_created_at.is_some());
    assert!(history.blocked_until.is_none());
}
