pub mod admin;
pub mod announcements;
pub mod auth;
pub mod health;
pub mod me;
pub mod tickets;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/request-otp                      issue a code (public)
/// /auth/verify-otp                       exchange code for a token (public)
///
/// /me                                    caller profile
/// /me/students                           caller's linked students
///
/// /tickets                               list, create
/// /tickets/{id}                          get
/// /tickets/{id}/messages                 reply (POST)
/// /tickets/{id}/internal-notes           staff note (POST)
/// /tickets/{id}/status                   staff transition (PATCH)
/// /tickets/{id}/reopen                   parent reopen request (POST)
/// /tickets/{id}/satisfied                parent confirmation (POST)
/// /tickets/{id}/known-issue              transport toggle (PATCH)
/// /tickets/{id}/flag-abuse               staff flag (POST)
///
/// /announcements                         list, create
/// /announcements/{id}/read               mark read (POST)
///
/// /admin/abuse-flagged                   flagged tickets (director)
/// /admin/parents/{id}/restrict           restrict to admin (director)
/// /admin/parents/{id}/block-tickets      block creation (director)
/// /admin/metrics                         school metrics (director, principal)
/// /admin/export/tickets                  watermarked export (director)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/me", me::router())
        .nest("/tickets", tickets::router())
        .nest("/announcements", announcements::router())
        .nest("/admin", admin::router())
}
