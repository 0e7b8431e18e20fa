//! Route definitions for the `/tickets` resource.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::tickets;
use crate::state::AppState;

/// Routes mounted at `/tickets`.
///
/// ```text
/// GET   /                      -> list_tickets
/// POST  /                      -> create_ticket (parent)
/// GET   /{id}                  -> get_ticket
/// POST  /{id}/messages         -> reply
/// POST  /{id}/internal-notes   -> add_internal_note (staff)
/// PATCH /{id}/status           -> set_status (staff)
/// POST  /{id}/reopen           -> reopen (parent)
/// POST  /{id}/satisfied        -> mark_satisfied (parent)
/// PATCH /{id}/known-issue      -> set_known_issue (transport)
/// POST  /{id}/flag-abuse       -> flag_abuse (staff)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(tickets::list_tickets).post(tickets::create_ticket))
        .route("/{id}", get(tickets::get_ticket))
        .route("/{id}/messages", post(tickets::reply))
        .route("/{id}/internal-notes", post(tickets::add_internal_note))
        .route("/{id}/status", patch(tickets::set_status))
        .route("/{id}/reopen", post(tickets::reopen))
        .route("/{id}/satisfied", post(tickets::mark_satisfied))
        .route("/{id}/known-issue", patch(tickets::set_known_issue))
        .route("/{id}/flag-abuse", post(tickets::flag_abuse))
}
