//! Audit log models.

use sqlx::FromRow;
use syncdesk_core::types::{DbId, Timestamp};

/// A row from the `audit_logs` table.
#[derive(Debug, Clone, FromRow)]
pub struct AuditLog {
    pub id: DbId,
    pub school_id: DbId,
    pub user_id: Option<DbId>,
    pub action: String,
    pub resource_type: Option<String>,
    pub resource_id: Option<String>,
    pub details: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for appending an audit entry.
#[derive(Debug)]
pub struct NewAuditEntry {
    pub school_id: DbId,
    pub user_id: Option<DbId>,
    pub action: &'static str,
    pub resource_type: Option<&'static str>,
    pub resource_id: Option<String>,
    pub details: Option<String>,
}
