//! Integration tests for announcement publishing, targeting, and receipts.

mod common;

use axum::http::StatusCode;
use common::{body_json, get_auth, post_empty_auth, post_json_auth, seed_user};
use serde_json::json;
use sqlx::PgPool;
use syncdesk_core::roles::Role;

async fn publish(
    pool: &PgPool,
    token: &str,
    title: &str,
    audience: &str,
) -> axum::http::Response<axum::body::Body> {
    post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/announcements",
        token,
        json!({
            "title": title,
            "content": "Please take note.",
            "target_audience": audience,
        }),
    )
    .await
}

// ---------------------------------------------------------------------------
// Test: only leadership roles can publish
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn publishing_is_gated_by_role(pool: PgPool) {
    let (_, principal_token) = seed_user(&pool, "+912222220001", Role::Principal, 1).await;
    let (_, teacher_token) = seed_user(&pool, "+912222220002", Role::Teacher, 1).await;
    let (_, parent_token) = seed_user(&pool, "+912222220003", Role::Parent, 1).await;

    let ok = publish(&pool, &principal_token, "Sports day", "both").await;
    assert_eq!(ok.status(), StatusCode::CREATED);

    let teacher = publish(&pool, &teacher_token, "Nope", "both").await;
    assert_eq!(teacher.status(), StatusCode::FORBIDDEN);

    let parent = publish(&pool, &parent_token, "Nope", "both").await;
    assert_eq!(parent.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Test: title and content must both be non-empty
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn blank_title_or_content_is_rejected(pool: PgPool) {
    let (_, principal_token) = seed_user(&pool, "+912222220012", Role::Principal, 1).await;

    let blank_title = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/announcements",
        &principal_token,
        json!({"title": "  ", "content": "Body", "target_audience": "both"}),
    )
    .await;
    common::assert_error_contains(blank_title, StatusCode::BAD_REQUEST, "Title cannot be empty")
        .await;

    let blank_content = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/announcements",
        &principal_token,
        json!({"title": "Notice", "content": "   ", "target_audience": "both"}),
    )
    .await;
    common::assert_error_contains(
        blank_content,
        StatusCode::BAD_REQUEST,
        "Content cannot be empty",
    )
    .await;

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM announcements")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

// ---------------------------------------------------------------------------
// Test: audience targeting per caller side
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn audience_split_filters_listings(pool: PgPool) {
    let (_, principal_token) = seed_user(&pool, "+912222220004", Role::Principal, 1).await;
    let (_, parent_token) = seed_user(&pool, "+912222220005", Role::Parent, 1).await;
    let (_, teacher_token) = seed_user(&pool, "+912222220006", Role::Teacher, 1).await;

    publish(&pool, &principal_token, "PTM schedule", "parents").await;
    publish(&pool, &principal_token, "Staff meeting", "staff").await;
    publish(&pool, &principal_token, "Holiday notice", "both").await;

    let parent_feed = body_json(
        get_auth(
            common::build_test_app(pool.clone()),
            "/api/v1/announcements",
            &parent_token,
        )
        .await,
    )
    .await["data"]
        .clone();
    let parent_titles: Vec<&str> = parent_feed
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["title"].as_str().unwrap())
        .collect();
    assert_eq!(parent_titles.len(), 2);
    assert!(parent_titles.contains(&"PTM schedule"));
    assert!(parent_titles.contains(&"Holiday notice"));

    let teacher_feed = body_json(
        get_auth(
            common::build_test_app(pool.clone()),
            "/api/v1/announcements",
            &teacher_token,
        )
        .await,
    )
    .await["data"]
        .clone();
    let teacher_titles: Vec<&str> = teacher_feed
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["title"].as_str().unwrap())
        .collect();
    assert_eq!(teacher_titles.len(), 2);
    assert!(teacher_titles.contains(&"Staff meeting"));
    assert!(teacher_titles.contains(&"Holiday notice"));
}

// ---------------------------------------------------------------------------
// Test: mark-read is idempotent over HTTP
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn mark_read_is_idempotent(pool: PgPool) {
    let (_, principal_token) = seed_user(&pool, "+912222220007", Role::Principal, 1).await;
    let (_, parent_token) = seed_user(&pool, "+912222220008", Role::Parent, 1).await;

    let created = publish(&pool, &principal_token, "Fee reminder", "parents").await;
    let id = body_json(created).await["data"]["id"].as_i64().unwrap();

    for _ in 0..2 {
        let response = post_empty_auth(
            common::build_test_app(pool.clone()),
            &format!("/api/v1/announcements/{id}/read"),
            &parent_token,
        )
        .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    let receipts: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM announcement_reads WHERE announcement_id = $1")
            .bind(id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(receipts, 1);

    let feed = body_json(
        get_auth(
            common::build_test_app(pool.clone()),
            "/api/v1/announcements",
            &parent_token,
        )
        .await,
    )
    .await["data"]
        .clone();
    assert_eq!(feed[0]["read"], true);
}

// ---------------------------------------------------------------------------
// Test: unknown announcement answers 404
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn marking_missing_announcement_is_not_found(pool: PgPool) {
    let (_, parent_token) = seed_user(&pool, "+912222220009", Role::Parent, 1).await;

    let response = post_empty_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/announcements/999/read",
        &parent_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: announcements do not cross school boundaries
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn announcements_stay_in_their_school(pool: PgPool) {
    let (_, principal_token) = seed_user(&pool, "+912222220010", Role::Principal, 1).await;
    let (_, far_parent_token) = seed_user(&pool, "+912222220011", Role::Parent, 2).await;

    publish(&pool, &principal_token, "Local only", "both").await;

    let feed = body_json(
        get_auth(
            common::build_test_app(pool.clone()),
            "/api/v1/announcements",
            &far_parent_token,
        )
        .await,
    )
    .await["data"]
        .clone();
    assert_eq!(feed.as_array().unwrap().len(), 0);
}
