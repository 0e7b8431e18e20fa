//! Handlers for the `/tickets` resource: creation behind the guardrails,
//! conversation, lifecycle transitions, and moderation flags.

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use syncdesk_core::audit::{actions, resources};
use syncdesk_core::error::CoreError;
use syncdesk_core::guardrails;
use syncdesk_core::roles::Role;
use syncdesk_core::ticket::{self, TicketCategory, TicketStatus};
use syncdesk_core::types::{DbId, Timestamp};
use syncdesk_core::visibility;
use syncdesk_db::models::audit::NewAuditEntry;
use syncdesk_db::models::ticket::{CreateTicket, Ticket};
use syncdesk_db::repositories::{AuditRepo, StudentRepo, TicketRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireParent, RequireStaff};
use crate::response::DataResponse;
use crate::state::AppState;

const STUDENT_LINK_DENIED: &str = "All selected students must be linked to your account.";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /tickets`.
#[derive(Debug, Deserialize)]
pub struct CreateTicketRequest {
    pub category: String,
    #[serde(default)]
    pub urgency: bool,
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub student_ids: Vec<DbId>,
}

/// Request body for `POST /tickets/{id}/messages`.
#[derive(Debug, Deserialize)]
pub struct ReplyRequest {
    pub body: String,
}

/// Request body for `PATCH /tickets/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

/// Request body for `POST /tickets/{id}/reopen`.
#[derive(Debug, Deserialize)]
pub struct ReopenRequest {
    pub reason: String,
}

/// Request body for `PATCH /tickets/{id}/known-issue`.
#[derive(Debug, Deserialize)]
pub struct KnownIssueRequest {
    pub known_issue: bool,
}

/// Request body for `POST /tickets/{id}/internal-notes`.
#[derive(Debug, Deserialize)]
pub struct InternalNoteRequest {
    pub body: String,
}

/// A message as shown to any viewer. `is_staff` reflects the sender's
/// current role at read time, not the role they held when posting.
#[derive(Debug, Serialize)]
pub struct MessageView {
    pub id: DbId,
    pub sender_id: DbId,
    pub body: String,
    pub is_staff: bool,
    pub created_at: Timestamp,
}

/// Full ticket projection for the detail endpoint.
///
/// `internal_notes_count` is present only for staff viewers; note bodies
/// never appear here at all.
#[derive(Debug, Serialize)]
pub struct TicketView {
    pub id: DbId,
    pub category: String,
    pub status: String,
    pub urgency: bool,
    pub title: Option<String>,
    pub description: Option<String>,
    pub student_ids: Vec<DbId>,
    pub satisfied_at: Option<Timestamp>,
    pub known_issue: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport_footer: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_notes_count: Option<i64>,
    pub messages: Vec<MessageView>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Compact row for listings.
#[derive(Debug, Serialize)]
pub struct TicketSummary {
    pub id: DbId,
    pub category: String,
    pub status: String,
    pub urgency: bool,
    pub title: Option<String>,
    pub known_issue: bool,
    pub satisfied_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<&Ticket> for TicketSummary {
    fn from(t: &Ticket) -> Self {
        TicketSummary {
            id: t.id,
            category: t.category.clone(),
            status: t.status.clone(),
            urgency: t.urgency,
            title: t.title.clone(),
            known_issue: t.known_issue,
            satisfied_at: t.satisfied_at,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers: creation and reads
// ---------------------------------------------------------------------------

/// POST /api/v1/tickets
///
/// Parent-only. At least one student must be referenced. Runs the guardrail
/// engine against a fresh history snapshot, then verifies every referenced
/// student is linked to the caller, then writes the ticket and its links in
/// one transaction.
pub async fn create_ticket(
    State(state): State<AppState>,
    RequireParent(user): RequireParent,
    Json(input): Json<CreateTicketRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<TicketView>>)> {
    let category = TicketCategory::parse(&input.category).map_err(AppError::Core)?;
    if input.student_ids.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "At least one student must be selected.".into(),
        )));
    }

    let row = UserRepo::find_by_id(&state.pool, user.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("Unknown user".into())))?;

    let now = Utc::now();
    let history = TicketRepo::creation_history(
        &state.pool,
        user.user_id,
        user.school_id,
        row.ticket_creation_blocked_until,
        now,
    )
    .await?;

    guardrails::evaluate(
        user.role,
        category,
        input.urgency,
        &history,
        &state.config.guardrails,
        now,
    )?;

    let linked = StudentRepo::student_ids_for_parent(&state.pool, user.user_id).await?;
    if input.student_ids.iter().any(|id| !linked.contains(id)) {
        return Err(AppError::Core(CoreError::Validation(
            STUDENT_LINK_DENIED.into(),
        )));
    }

    let created = TicketRepo::create(
        &state.pool,
        &CreateTicket {
            school_id: user.school_id,
            created_by_id: user.user_id,
            category,
            urgency: input.urgency,
            title: input.title,
            description: input.description,
            student_ids: input.student_ids,
        },
    )
    .await?;

    let view = project_ticket(&state, &created, user.role).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: view })))
}

/// GET /api/v1/tickets
pub async fn list_tickets(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<TicketSummary>>>> {
    let tickets =
        TicketRepo::list_for_user(&state.pool, user.user_id, user.role, user.school_id).await?;
    let summaries = tickets.iter().map(TicketSummary::from).collect();
    Ok(Json(DataResponse { data: summaries }))
}

/// GET /api/v1/tickets/{id}
pub async fn get_ticket(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<TicketView>>> {
    let ticket = fetch_visible(&state, &user, id).await?;
    let view = project_ticket(&state, &ticket, user.role).await?;
    Ok(Json(DataResponse { data: view }))
}

// ---------------------------------------------------------------------------
// Handlers: conversation
// ---------------------------------------------------------------------------

/// POST /api/v1/tickets/{id}/messages
///
/// Any actor with visibility may reply. A staff reply on a pending ticket
/// advances it to in-progress.
pub async fn reply(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<ReplyRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<MessageView>>)> {
    if input.body.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Message cannot be empty.".into(),
        )));
    }

    fetch_visible(&state, &user, id).await?;

    // The stored role wins over the token's role claim, so a reply posted
    // with a stale token is annotated the same way the projection will
    // annotate it later.
    let is_staff = UserRepo::find_by_id(&state.pool, user.user_id)
        .await?
        .and_then(|row| row.role().ok())
        .map(|role| role.is_staff())
        .unwrap_or(false);

    let message =
        TicketRepo::add_reply(&state.pool, id, user.user_id, is_staff, input.body.trim()).await?;

    let view = MessageView {
        id: message.id,
        sender_id: message.sender_id,
        body: message.body,
        is_staff,
        created_at: message.created_at,
    };
    Ok((StatusCode::CREATED, Json(DataResponse { data: view })))
}

/// POST /api/v1/tickets/{id}/internal-notes
///
/// Staff-only side channel; parents never see notes or their count.
pub async fn add_internal_note(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Path(id): Path<DbId>,
    Json(input): Json<InternalNoteRequest>,
) -> AppResult<StatusCode> {
    if !user.role.can_post_internal_notes() {
        return Err(AppError::Core(CoreError::Forbidden(
            "Role cannot post internal notes".into(),
        )));
    }
    if input.body.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Note cannot be empty.".into(),
        )));
    }

    fetch_visible(&state, &user, id).await?;
    TicketRepo::add_internal_note(&state.pool, id, user.user_id, input.body.trim()).await?;
    Ok(StatusCode::CREATED)
}

// ---------------------------------------------------------------------------
// Handlers: lifecycle
// ---------------------------------------------------------------------------

/// PATCH /api/v1/tickets/{id}/status
///
/// The body literal is validated before any business rule runs: only
/// `in_progress` and `resolved` are legal targets.
pub async fn set_status(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Path(id): Path<DbId>,
    Json(input): Json<StatusRequest>,
) -> AppResult<Json<DataResponse<TicketSummary>>> {
    let target = TicketStatus::parse_update_target(&input.status).map_err(AppError::Core)?;

    if !user.role.can_set_ticket_status() {
        return Err(AppError::Core(CoreError::Forbidden(
            "Role cannot change ticket status".into(),
        )));
    }

    let updated = TicketRepo::set_status(&state.pool, id, user.school_id, target).await?;
    if !updated {
        return Err(AppError::ticket_not_found(id));
    }

    let ticket = fetch_visible(&state, &user, id).await?;
    Ok(Json(DataResponse {
        data: TicketSummary::from(&ticket),
    }))
}

/// POST /api/v1/tickets/{id}/reopen
///
/// Parent-only, resolved tickets, at most two reopens over the ticket's
/// lifetime. All refusal causes collapse into one message.
pub async fn reopen(
    State(state): State<AppState>,
    RequireParent(user): RequireParent,
    Path(id): Path<DbId>,
    Json(input): Json<ReopenRequest>,
) -> AppResult<Json<DataResponse<TicketSummary>>> {
    let reason = input.reason.trim();
    if reason.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Reason cannot be empty.".into(),
        )));
    }

    let accepted = TicketRepo::request_reopen(&state.pool, id, user.user_id, reason).await?;
    if accepted.is_none() {
        return Err(AppError::BadRequest(ticket::REOPEN_DENIED.into()));
    }

    let ticket = fetch_visible(&state, &user, id).await?;
    Ok(Json(DataResponse {
        data: TicketSummary::from(&ticket),
    }))
}

/// POST /api/v1/tickets/{id}/satisfied
///
/// Creating parent confirms a resolved ticket. Re-stamping is harmless.
pub async fn mark_satisfied(
    State(state): State<AppState>,
    RequireParent(user): RequireParent,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<TicketSummary>>> {
    let stamped = TicketRepo::mark_satisfied(&state.pool, id, user.user_id).await?;
    if !stamped {
        return Err(AppError::NotFound("Ticket not found or not resolved.".into()));
    }

    let ticket = fetch_visible(&state, &user, id).await?;
    Ok(Json(DataResponse {
        data: TicketSummary::from(&ticket),
    }))
}

/// PATCH /api/v1/tickets/{id}/known-issue
///
/// Transport staff on Transport-category tickets only. Every other
/// combination answers with the uniform not-found.
pub async fn set_known_issue(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Path(id): Path<DbId>,
    Json(input): Json<KnownIssueRequest>,
) -> AppResult<Json<DataResponse<TicketSummary>>> {
    if !user.role.can_toggle_known_issue() {
        return Err(AppError::ticket_not_found(id));
    }

    let updated =
        TicketRepo::set_known_issue(&state.pool, id, user.school_id, input.known_issue).await?;
    if !updated {
        return Err(AppError::ticket_not_found(id));
    }

    let ticket = fetch_visible(&state, &user, id).await?;
    Ok(Json(DataResponse {
        data: TicketSummary::from(&ticket),
    }))
}

/// POST /api/v1/tickets/{id}/flag-abuse
///
/// Overwrites the flag fields (repeat flags never accumulate) and records
/// an audit entry.
pub async fn flag_abuse(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !user.role.can_flag_abuse() {
        return Err(AppError::Core(CoreError::Forbidden(
            "Role cannot flag tickets".into(),
        )));
    }

    let flagged = TicketRepo::flag_abuse(&state.pool, id, user.school_id, user.user_id).await?;
    if !flagged {
        return Err(AppError::ticket_not_found(id));
    }

    AuditRepo::record(
        &state.pool,
        &NewAuditEntry {
            school_id: user.school_id,
            user_id: Some(user.user_id),
            action: actions::TICKET_ABUSE_FLAGGED,
            resource_type: Some(resources::TICKET),
            resource_id: Some(id.to_string()),
            details: None,
        },
    )
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

/// Fetch a ticket through the caller's visibility filter, or the uniform
/// not-found.
async fn fetch_visible(state: &AppState, user: &AuthUser, id: DbId) -> AppResult<Ticket> {
    TicketRepo::find_for_user(&state.pool, id, user.user_id, user.role, user.school_id)
        .await?
        .ok_or_else(|| AppError::ticket_not_found(id))
}

/// Build the full [`TicketView`] for a viewer.
///
/// Sender staff-ness is resolved from the senders' current roles in one
/// batched query. The internal note count is attached only when the viewer
/// role is allowed to see that notes exist at all.
async fn project_ticket(
    state: &AppState,
    ticket: &Ticket,
    viewer_role: Role,
) -> AppResult<TicketView> {
    let messages = TicketRepo::messages(&state.pool, ticket.id).await?;
    let student_ids = TicketRepo::student_ids(&state.pool, ticket.id).await?;

    let sender_ids: Vec<DbId> = messages.iter().map(|m| m.sender_id).collect();
    let staff_by_sender: HashMap<DbId, bool> = if sender_ids.is_empty() {
        HashMap::new()
    } else {
        UserRepo::roles_for_ids(&state.pool, &sender_ids)
            .await?
            .into_iter()
            .map(|(id, role)| {
                let is_staff = Role::parse(&role).map(|r| r.is_staff()).unwrap_or(false);
                (id, is_staff)
            })
            .collect()
    };

    let message_views = messages
        .into_iter()
        .map(|m| MessageView {
            id: m.id,
            sender_id: m.sender_id,
            is_staff: staff_by_sender.get(&m.sender_id).copied().unwrap_or(false),
            body: m.body,
            created_at: m.created_at,
        })
        .collect();

    let internal_notes_count = if visibility::sees_internal_notes(viewer_role) {
        Some(TicketRepo::internal_notes_count(&state.pool, ticket.id).await?)
    } else {
        None
    };

    let category = ticket.category().map_err(AppError::Core)?;

    Ok(TicketView {
        id: ticket.id,
        category: ticket.category.clone(),
        status: ticket.status.clone(),
        urgency: ticket.urgency,
        title: ticket.title.clone(),
        description: ticket.description.clone(),
        student_ids,
        satisfied_at: ticket.satisfied_at,
        known_issue: ticket.known_issue,
        transport_footer: ticket::category_footer(category),
        internal_notes_count,
        messages: message_views,
        created_at: ticket.created_at,
        updated_at: ticket.updated_at,
    })
}
