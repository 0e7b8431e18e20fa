//! Handlers for the `/announcements` resource: one-way broadcasts with
//! audience targeting and per-user read receipts.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use syncdesk_core::announcement::Audience;
use syncdesk_core::error::CoreError;
use syncdesk_core::types::{DbId, Timestamp};
use syncdesk_db::models::announcement::{AnnouncementWithRead, CreateAnnouncement};
use syncdesk_db::repositories::AnnouncementRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /announcements`.
#[derive(Debug, Deserialize)]
pub struct CreateAnnouncementRequest {
    pub title: String,
    pub content: String,
    pub target_audience: String,
    pub target_grade: Option<String>,
    pub target_class: Option<String>,
}

/// An announcement as shown to a caller, with their read flag.
#[derive(Debug, Serialize)]
pub struct AnnouncementView {
    pub id: DbId,
    pub title: String,
    pub content: String,
    pub target_audience: String,
    pub target_grade: Option<String>,
    pub target_class: Option<String>,
    pub read: bool,
    pub created_at: Timestamp,
}

impl From<AnnouncementWithRead> for AnnouncementView {
    fn from(a: AnnouncementWithRead) -> Self {
        AnnouncementView {
            id: a.id,
            title: a.title,
            content: a.content,
            target_audience: a.target_audience,
            target_grade: a.target_grade,
            target_class: a.target_class,
            read: a.read,
            created_at: a.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/announcements
///
/// Director, Principal, and Vice-Principal only.
pub async fn create_announcement(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateAnnouncementRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<AnnouncementView>>)> {
    if !user.role.can_publish_announcements() {
        return Err(AppError::Core(CoreError::Forbidden(
            "Role cannot publish announcements".into(),
        )));
    }
    if input.title.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Title cannot be empty.".into(),
        )));
    }
    if input.content.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Content cannot be empty.".into(),
        )));
    }
    let audience = Audience::parse(&input.target_audience).map_err(AppError::Core)?;

    let created = AnnouncementRepo::create(
        &state.pool,
        &CreateAnnouncement {
            school_id: user.school_id,
            author_id: user.user_id,
            title: input.title.trim().to_string(),
            content: input.content.trim().to_string(),
            target_audience: audience.as_str().to_string(),
            target_grade: input.target_grade,
            target_class: input.target_class,
        },
    )
    .await?;

    let view = AnnouncementView {
        id: created.id,
        title: created.title,
        content: created.content,
        target_audience: created.target_audience,
        target_grade: created.target_grade,
        target_class: created.target_class,
        read: false,
        created_at: created.created_at,
    };
    Ok((StatusCode::CREATED, Json(DataResponse { data: view })))
}

/// GET /api/v1/announcements
///
/// The caller's school only, filtered to their side of the audience split,
/// newest first.
pub async fn list_announcements(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<AnnouncementView>>>> {
    let rows =
        AnnouncementRepo::list_for_user(&state.pool, user.user_id, user.role, user.school_id)
            .await?;
    let views = rows.into_iter().map(AnnouncementView::from).collect();
    Ok(Json(DataResponse { data: views }))
}

/// POST /api/v1/announcements/{id}/read
///
/// Idempotent: marking twice is not an error and leaves a single receipt.
pub async fn mark_read(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let found = AnnouncementRepo::mark_read(&state.pool, id, user.user_id, user.school_id).await?;
    if !found {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Announcement".into(),
            id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}
