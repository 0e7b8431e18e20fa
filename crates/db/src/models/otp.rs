//! OTP row model. Only the SHA-256 digest of a code is stored.

use sqlx::FromRow;
use syncdesk_core::types::{DbId, Timestamp};

/// A row from the `otps` table.
#[derive(Debug, Clone, FromRow)]
pub struct Otp {
    pub id: DbId,
    pub phone: String,
    pub code_hash: String,
    pub expires_at: Timestamp,
    pub used: bool,
    pub created_at: Timestamp,
}
