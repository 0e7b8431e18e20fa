//! Ticket aggregate models: the ticket row and its owned collections.

use sqlx::FromRow;
use syncdesk_core::error::CoreError;
use syncdesk_core::ticket::{TicketCategory, TicketStatus};
use syncdesk_core::types::{DbId, Timestamp};

/// A row from the `tickets` table.
///
/// `category` and `status` are stored as TEXT; use the accessor methods to
/// get the closed enums.
#[derive(Debug, Clone, FromRow)]
pub struct Ticket {
    pub id: DbId,
    pub school_id: DbId,
    pub created_by_id: DbId,
    pub category: String,
    pub status: String,
    pub urgency: bool,
    pub assigned_to_id: Option<DbId>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub satisfied_at: Option<Timestamp>,
    pub known_issue: bool,
    pub abuse_flagged: bool,
    pub abuse_flagged_at: Option<Timestamp>,
    pub abuse_flagged_by_id: Option<DbId>,
    pub escalation_snoozed_until: Option<Timestamp>,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Ticket {
    pub fn status(&self) -> Result<TicketStatus, CoreError> {
        TicketStatus::parse(&self.status)
    }

    pub fn category(&self) -> Result<TicketCategory, CoreError> {
        TicketCategory::parse(&self.category)
    }
}

/// DTO for creating a ticket with its student links.
#[derive(Debug)]
pub struct CreateTicket {
    pub school_id: DbId,
    pub created_by_id: DbId,
    pub category: TicketCategory,
    pub urgency: bool,
    pub title: Option<String>,
    pub description: Option<String>,
    pub student_ids: Vec<DbId>,
}

/// A row from the `ticket_messages` table.
#[derive(Debug, Clone, FromRow)]
pub struct TicketMessage {
    pub id: DbId,
    pub ticket_id: DbId,
    pub sender_id: DbId,
    pub body: String,
    pub created_at: Timestamp,
}

/// A row from the `internal_notes` table. Never surfaced to parents.
#[derive(Debug, Clone, FromRow)]
pub struct InternalNote {
    pub id: DbId,
    pub ticket_id: DbId,
    pub author_id: DbId,
    pub body: String,
    pub created_at: Timestamp,
}

/// A row from the `ticket_reopens` table.
#[derive(Debug, Clone, FromRow)]
pub struct TicketReopen {
    pub id: DbId,
    pub ticket_id: DbId,
    pub requested_by_id: DbId,
    pub reason: String,
    pub created_at: Timestamp,
}
