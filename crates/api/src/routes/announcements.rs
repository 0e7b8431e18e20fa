//! Route definitions for the `/announcements` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::announcements;
use crate::state::AppState;

/// Routes mounted at `/announcements`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(announcements::list_announcements).post(announcements::create_announcement),
        )
        .route("/{id}/read", post(announcements::mark_read))
}
