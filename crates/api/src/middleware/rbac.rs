//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does not
//! meet the requirement. Use these in route handlers to enforce authorization
//! at the type level; finer-grained checks go through the capability table
//! on [`syncdesk_core::roles::Role`].

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use syncdesk_core::error::CoreError;
use syncdesk_core::roles::Role;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `parent` role. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn parent_only(RequireParent(user): RequireParent) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireParent(pub AuthUser);

impl FromRequestParts<AppState> for RequireParent {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != Role::Parent {
            return Err(AppError::Core(CoreError::Forbidden(
                "Parent role required".into(),
            )));
        }
        Ok(RequireParent(user))
    }
}

/// Requires any staff role. Rejects with 403 Forbidden otherwise.
pub struct RequireStaff(pub AuthUser);

impl FromRequestParts<AppState> for RequireStaff {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.role.is_staff() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Staff role required".into(),
            )));
        }
        Ok(RequireStaff(user))
    }
}

/// Requires the `director` role. Rejects with 403 Forbidden otherwise.
pub struct RequireDirector(pub AuthUser);

impl FromRequestParts<AppState> for RequireDirector {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.role.can_moderate_parents() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Director role required".into(),
            )));
        }
        Ok(RequireDirector(user))
    }
}
