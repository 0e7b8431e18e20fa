//! Handlers for the `/admin` resource: parent moderation, school metrics,
//! and the ticket export.

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use syncdesk_core::audit::{actions, resources};
use syncdesk_core::error::CoreError;
use syncdesk_core::roles::Role;
use syncdesk_core::types::{DbId, Timestamp};
use syncdesk_db::models::audit::NewAuditEntry;
use syncdesk_db::repositories::{AnnouncementRepo, AuditRepo, TicketRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::tickets::TicketSummary;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireDirector, RequireStaff};
use crate::response::DataResponse;
use crate::state::AppState;

/// Restriction window for `restrict-parent`, in days.
const RESTRICT_DAYS: i64 = 7;
/// Block window for `block-parent-tickets`, in days.
const BLOCK_DAYS: i64 = 3;
/// Export row cap.
const EXPORT_LIMIT: i64 = 1000;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Response body for the moderation endpoints.
#[derive(Debug, Serialize)]
pub struct ModerationResponse {
    pub parent_id: DbId,
    pub until: Timestamp,
}

/// Response body for `GET /admin/metrics`.
#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    pub total_tickets: i64,
    pub resolved_tickets: i64,
    pub reopen_requests: i64,
    pub announcement_reads: i64,
}

/// Response body for `GET /admin/export/tickets`.
#[derive(Debug, Serialize)]
pub struct ExportResponse {
    pub watermark: String,
    pub tickets: Vec<TicketSummary>,
}

// ---------------------------------------------------------------------------
// Handlers: moderation (Director only)
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/abuse-flagged
pub async fn list_abuse_flagged(
    State(state): State<AppState>,
    RequireDirector(user): RequireDirector,
) -> AppResult<Json<DataResponse<Vec<TicketSummary>>>> {
    let tickets = TicketRepo::list_abuse_flagged(&state.pool, user.school_id).await?;
    let summaries = tickets.iter().map(TicketSummary::from).collect();
    Ok(Json(DataResponse { data: summaries }))
}

/// POST /api/v1/admin/parents/{id}/restrict
///
/// Restrict a parent to admin-mediated contact for seven days. A missing
/// parent, a non-parent target, and another school's parent all answer the
/// same way.
pub async fn restrict_parent(
    State(state): State<AppState>,
    RequireDirector(user): RequireDirector,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ModerationResponse>>> {
    let until = Utc::now() + chrono::Duration::days(RESTRICT_DAYS);
    let applied = UserRepo::restrict_parent(&state.pool, id, user.school_id, until).await?;
    let Some(until) = applied else {
        return Err(parent_not_found(id));
    };

    audit_moderation(&state, &user, actions::PARENT_RESTRICTED, id).await?;
    Ok(Json(DataResponse {
        data: ModerationResponse {
            parent_id: id,
            until,
        },
    }))
}

/// POST /api/v1/admin/parents/{id}/block-tickets
///
/// Block a parent from creating tickets for three days. Enforcement lives
/// in the guardrail engine's first rule.
pub async fn block_parent_tickets(
    State(state): State<AppState>,
    RequireDirector(user): RequireDirector,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ModerationResponse>>> {
    let until = Utc::now() + chrono::Duration::days(BLOCK_DAYS);
    let applied = UserRepo::block_parent_tickets(&state.pool, id, user.school_id, until).await?;
    let Some(until) = applied else {
        return Err(parent_not_found(id));
    };

    audit_moderation(&state, &user, actions::PARENT_BLOCKED, id).await?;
    Ok(Json(DataResponse {
        data: ModerationResponse {
            parent_id: id,
            until,
        },
    }))
}

// ---------------------------------------------------------------------------
// Handlers: reporting
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/metrics
///
/// Director and Principal only.
pub async fn metrics(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
) -> AppResult<Json<DataResponse<MetricsResponse>>> {
    if !matches!(user.role, Role::Director | Role::Principal) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Director or Principal role required".into(),
        )));
    }

    let (total_tickets, resolved_tickets) =
        TicketRepo::counts_for_school(&state.pool, user.school_id).await?;
    let reopen_requests = TicketRepo::reopen_total(&state.pool).await?;
    let announcement_reads =
        AnnouncementRepo::reads_count_for_school(&state.pool, user.school_id).await?;

    Ok(Json(DataResponse {
        data: MetricsResponse {
            total_tickets,
            resolved_tickets,
            reopen_requests,
            announcement_reads,
        },
    }))
}

/// GET /api/v1/admin/export/tickets
///
/// Director only. Last 1000 non-deleted tickets for the school, newest
/// first, watermarked.
pub async fn export_tickets(
    State(state): State<AppState>,
    RequireDirector(user): RequireDirector,
) -> AppResult<Json<DataResponse<ExportResponse>>> {
    let tickets = TicketRepo::export_recent(&state.pool, user.school_id, EXPORT_LIMIT).await?;
    let summaries = tickets.iter().map(TicketSummary::from).collect();

    Ok(Json(DataResponse {
        data: ExportResponse {
            watermark: format!(
                "Syncdesk export | School ID {} | For official use only",
                user.school_id
            ),
            tickets: summaries,
        },
    }))
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

fn parent_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Parent".into(),
        id,
    })
}

async fn audit_moderation(
    state: &AppState,
    actor: &AuthUser,
    action: &'static str,
    parent_id: DbId,
) -> AppResult<()> {
    AuditRepo::record(
        &state.pool,
        &NewAuditEntry {
            school_id: actor.school_id,
            user_id: Some(actor.user_id),
            action,
            resource_type: Some(resources::USER),
            resource_id: Some(parent_id.to_string()),
            details: None,
        },
    )
    .await?;
    Ok(())
}
