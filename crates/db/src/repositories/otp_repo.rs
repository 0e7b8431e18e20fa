//! Repository for the `otps` table.

use sqlx::PgPool;
use syncdesk_core::types::{DbId, Timestamp};

use crate::models::otp::Otp;

const COLUMNS: &str = "id, phone, code_hash, expires_at, used, created_at";

/// Provides storage for one-time codes. Only digests are persisted.
pub struct OtpRepo;

impl OtpRepo {
    /// Store a new code digest for a phone number.
    pub async fn create(
        pool: &PgPool,
        phone: &str,
        code_hash: &str,
        expires_at: Timestamp,
    ) -> Result<Otp, sqlx::Error> {
        let query = format!(
            "INSERT INTO otps (phone, code_hash, expires_at)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Otp>(&query)
            .bind(phone)
            .bind(code_hash)
            .bind(expires_at)
            .fetch_one(pool)
            .await
    }

    /// The most recently issued OTP for a phone, used or not.
    pub async fn latest_for_phone(
        pool: &PgPool,
        phone: &str,
    ) -> Result<Option<Otp>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM otps WHERE phone = $1 ORDER BY id DESC LIMIT 1"
        );
        sqlx::query_as::<_, Otp>(&query)
            .bind(phone)
            .fetch_optional(pool)
            .await
    }

    /// Mark an OTP consumed.
    pub async fn mark_used(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE otps SET used = TRUE WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
