//! Per-actor ticket visibility.
//!
//! One predicate, used both for single-ticket reads and (mirrored in SQL)
//! for listings: parents see only their own tickets, staff see every
//! ticket in their school, nobody sees soft-deleted tickets through the
//! standard read paths.

use crate::roles::Role;
use crate::types::{DbId, Timestamp};

/// The ticket fields visibility depends on.
#[derive(Debug, Clone, Copy)]
pub struct TicketScope {
    pub school_id: DbId,
    pub created_by_id: DbId,
    pub deleted_at: Option<Timestamp>,
}

/// Whether `actor` may read a ticket with the given scope fields.
pub fn can_view_ticket(
    actor_id: DbId,
    actor_role: Role,
    actor_school_id: DbId,
    ticket: TicketScope,
) -> bool {
    if ticket.deleted_at.is_some() {
        return false;
    }
    if actor_role == Role::Parent {
        return ticket.created_by_id == actor_id;
    }
    ticket.school_id == actor_school_id
}

/// Whether a viewer role receives the internal-notes count in projections.
///
/// This is a hard boundary, not a default: parent projections never carry
/// the field at all.
pub fn sees_internal_notes(viewer_role: Role) -> bool {
    viewer_role.is_staff()
}
