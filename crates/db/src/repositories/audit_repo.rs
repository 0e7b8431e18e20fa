//! Repository for the append-only audit log.

use sqlx::PgPool;
use syncdesk_core::types::DbId;

use crate::models::audit::{AuditLog, NewAuditEntry};

pub struct AuditRepo;

impl AuditRepo {
    /// Append one entry. Entries are never updated or deleted.
    pub async fn record(pool: &PgPool, entry: &NewAuditEntry) -> Result<AuditLog, sqlx::Error> {
        sqlx::query_as::<_, AuditLog>(
            "INSERT INTO audit_logs
                (school_id, user_id, action, resource_type, resource_id, details)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id, school_id, user_id, action, resource_type, resource_id, details, created_at",
        )
        .bind(entry.school_id)
        .bind(entry.user_id)
        .bind(entry.action)
        .bind(entry.resource_type)
        .bind(&entry.resource_id)
        .bind(&entry.details)
        .fetch_one(pool)
        .await
    }

    /// Recent entries for a school, newest first.
    pub async fn recent_for_school(
        pool: &PgPool,
        school_id: DbId,
        limit: i64,
    ) -> Result<Vec<AuditLog>, sqlx::Error> {
        sqlx::query_as::<_, AuditLog>(
            "SELECT id, school_id, user_id, action, resource_type, resource_id, details, created_at
             FROM audit_logs WHERE school_id = $1
             ORDER BY created_at DESC, id DESC LIMIT $2",
        )
        .bind(school_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
