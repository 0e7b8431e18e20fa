//! Route definitions for the `/me` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::me;
use crate::state::AppState;

/// Routes mounted at `/me` (all require auth).
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(me::me))
        .route("/students", get(me::my_students))
}
