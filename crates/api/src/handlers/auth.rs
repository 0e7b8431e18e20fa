//! Handlers for the `/auth` resource (OTP request and verification).

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use syncdesk_core::audit::{actions, resources};
use syncdesk_core::error::CoreError;
use syncdesk_core::roles::Role;
use syncdesk_db::models::audit::NewAuditEntry;
use syncdesk_db::models::user::{CreateUser, User, UserResponse};
use syncdesk_db::repositories::{AuditRepo, OtpRepo, UserRepo};

use crate::auth::jwt::generate_access_token;
use crate::auth::otp::{generate_code, hash_code};
use crate::error::{AppError, AppResult};
use crate::notifications::NotificationSender;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/request-otp`.
#[derive(Debug, Deserialize)]
pub struct RequestOtpRequest {
    pub phone: String,
}

/// Response body for `POST /auth/request-otp`.
#[derive(Debug, Serialize)]
pub struct RequestOtpResponse {
    pub message: &'static str,
    /// Code lifetime in minutes, so clients can show a countdown.
    pub expires_in_mins: i64,
}

/// Request body for `POST /auth/verify-otp`.
#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    pub phone: String,
    pub code: String,
}

/// Successful authentication response.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/request-otp
///
/// Issue a 6-digit code for the phone number and hand it to the
/// notification sender. Delivery is fire-and-forget; only the digest is
/// stored.
pub async fn request_otp(
    State(state): State<AppState>,
    Json(input): Json<RequestOtpRequest>,
) -> AppResult<Json<RequestOtpResponse>> {
    let phone = normalize_phone(&input.phone)?;

    let code = generate_code();
    let expires_at = Utc::now() + chrono::Duration::minutes(state.config.otp.expiry_mins);
    OtpRepo::create(&state.pool, &phone, &hash_code(&code), expires_at).await?;

    let notifier: Arc<dyn NotificationSender> = Arc::clone(&state.notifier);
    tokio::spawn(async move {
        if let Err(err) = notifier.send_otp(&phone, &code).await {
            tracing::warn!(error = %err, "OTP delivery failed");
        }
    });

    Ok(Json(RequestOtpResponse {
        message: "OTP sent.",
        expires_in_mins: state.config.otp.expiry_mins,
    }))
}

/// POST /api/v1/auth/verify-otp
///
/// Verify a code (or a configured development stub code) and mint an access
/// token. The first successful verification for an unknown phone creates a
/// Parent account in the default school.
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(input): Json<VerifyOtpRequest>,
) -> AppResult<Json<AuthResponse>> {
    let phone = normalize_phone(&input.phone)?;

    let user = if state.config.otp.is_staff_stub(&input.code) {
        login_with_role(&state, &phone, Role::Teacher).await?
    } else if state.config.otp.is_parent_stub(&input.code) {
        login_with_role(&state, &phone, Role::Parent).await?
    } else {
        verify_real_code(&state, &phone, &input.code).await?
    };

    AuditRepo::record(
        &state.pool,
        &NewAuditEntry {
            school_id: user.school_id,
            user_id: Some(user.id),
            action: actions::LOGIN,
            resource_type: Some(resources::USER),
            resource_id: Some(user.id.to_string()),
            details: None,
        },
    )
    .await?;

    let access_token =
        generate_access_token(user.id, &user.role, user.school_id, &state.config.jwt)
            .map_err(|e| AppError::InternalError(format!("Token generation failed: {e}")))?;

    Ok(Json(AuthResponse {
        access_token,
        expires_in: state.config.jwt.access_token_expiry_mins * 60,
        user: UserResponse::from(&user),
    }))
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

/// Stub login: fetch or create the user, correcting the role to match the
/// stub that was used. The staff stub upgrades a Parent to Teacher; the
/// parent stub downgrades any staff account to Parent.
async fn login_with_role(state: &AppState, phone: &str, role: Role) -> AppResult<User> {
    match UserRepo::find_by_phone(&state.pool, phone).await? {
        Some(user) => {
            let current = user.role().map_err(AppError::Core)?;
            let wrong_side = (role == Role::Parent) != (current == Role::Parent);
            if wrong_side {
                UserRepo::set_role(&state.pool, user.id, role).await?;
                let user = UserRepo::find_by_id(&state.pool, user.id)
                    .await?
                    .ok_or_else(|| AppError::InternalError("User vanished mid-login".into()))?;
                Ok(user)
            } else {
                Ok(user)
            }
        }
        None => {
            let user = UserRepo::create(
                &state.pool,
                &CreateUser {
                    phone: phone.to_string(),
                    role,
                    school_id: state.config.default_school_id,
                    name: None,
                    email: None,
                },
            )
            .await?;
            Ok(user)
        }
    }
}

/// Verify a real stored code: latest for the phone, unused, unexpired,
/// digest match. Consumes the code on success.
async fn verify_real_code(state: &AppState, phone: &str, code: &str) -> AppResult<User> {
    let invalid = || AppError::Core(CoreError::Unauthorized("Invalid or expired OTP.".into()));

    let otp = OtpRepo::latest_for_phone(&state.pool, phone)
        .await?
        .ok_or_else(invalid)?;

    if otp.used || otp.expires_at <= Utc::now() || otp.code_hash != hash_code(code) {
        return Err(invalid());
    }

    OtpRepo::mark_used(&state.pool, otp.id).await?;

    match UserRepo::find_by_phone(&state.pool, phone).await? {
        Some(user) => Ok(user),
        None => {
            let user = UserRepo::create(
                &state.pool,
                &CreateUser {
                    phone: phone.to_string(),
                    role: Role::Parent,
                    school_id: state.config.default_school_id,
                    name: None,
                    email: None,
                },
            )
            .await?;
            Ok(user)
        }
    }
}

/// Trim and sanity-check a phone number. No carrier-grade validation, just
/// enough to reject obviously empty or oversized input.
fn normalize_phone(phone: &str) -> Result<String, AppError> {
    let trimmed = phone.trim();
    if trimmed.len() < 7 || trimmed.len() > 20 {
        return Err(AppError::Core(CoreError::Validation(
            "Invalid phone number.".into(),
        )));
    }
    Ok(trimmed.to_string())
}
