//! Route definitions for the `/admin` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// ```text
/// GET  /abuse-flagged                -> list_abuse_flagged (director)
/// POST /parents/{id}/restrict        -> restrict_parent (director)
/// POST /parents/{id}/block-tickets   -> block_parent_tickets (director)
/// GET  /metrics                      -> metrics (director, principal)
/// GET  /export/tickets               -> export_tickets (director)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/abuse-flagged", get(admin::list_abuse_flagged))
        .route("/parents/{id}/restrict", post(admin::restrict_parent))
        .route(
            "/parents/{id}/block-tickets",
            post(admin::block_parent_tickets),
        )
        .route("/metrics", get(admin::metrics))
        .route("/export/tickets", get(admin::export_tickets))
}
