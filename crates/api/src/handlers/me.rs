//! Handlers for the `/me` resource.

use axum::extract::State;
use axum::Json;
use syncdesk_core::roles::Role;
use syncdesk_db::models::student::Student;
use syncdesk_db::models::user::UserResponse;
use syncdesk_db::repositories::{StudentRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/me -- the caller's own profile.
pub async fn me(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let row = UserRepo::find_by_id(&state.pool, user.user_id)
        .await?
        .ok_or_else(|| AppError::Core(syncdesk_core::error::CoreError::NotFound {
            entity: "User".into(),
            id: user.user_id,
        }))?;
    Ok(Json(DataResponse {
        data: UserResponse::from(&row),
    }))
}

/// GET /api/v1/me/students -- the parent's linked students. Staff callers
/// get an empty list rather than an error.
pub async fn my_students(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<Student>>>> {
    let students = if user.role == Role::Parent {
        StudentRepo::students_for_parent(&state.pool, user.user_id, user.school_id).await?
    } else {
        Vec::new()
    };
    Ok(Json(DataResponse { data: students }))
}
