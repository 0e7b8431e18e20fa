//! Ticket lifecycle rules: statuses, categories, and transition guards.
//!
//! Statuses move Pending -> InProgress -> Resolved, with a parent-requested
//! reopen back to Pending. Soft deletion is an orthogonal flag handled by
//! the visibility filter, not a lifecycle state.

use crate::error::CoreError;
use crate::roles::Role;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle state of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketStatus {
    Pending,
    InProgress,
    Resolved,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Pending => "pending",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::Resolved => "resolved",
        }
    }

    /// Parse a stored status value.
    pub fn parse(s: &str) -> Result<TicketStatus, CoreError> {
        match s {
            "pending" => Ok(TicketStatus::Pending),
            "in_progress" => Ok(TicketStatus::InProgress),
            "resolved" => Ok(TicketStatus::Resolved),
            other => Err(CoreError::Validation(format!(
                "Unknown ticket status '{other}'"
            ))),
        }
    }

    /// Parse the body of an explicit status update.
    ///
    /// Only `in_progress` and `resolved` are ever accepted as targets;
    /// anything else (including `pending`) is malformed input, rejected
    /// before any business rule runs.
    pub fn parse_update_target(s: &str) -> Result<TicketStatus, CoreError> {
        match s {
            "in_progress" => Ok(TicketStatus::InProgress),
            "resolved" => Ok(TicketStatus::Resolved),
            _ => Err(CoreError::Validation("Invalid status.".to_string())),
        }
    }

    /// A ticket still awaiting resolution.
    pub fn is_open(&self) -> bool {
        matches!(self, TicketStatus::Pending | TicketStatus::InProgress)
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// The closed set of ticket categories parents file against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketCategory {
    AcademicTeaching,
    AcademicExamPolicy,
    Discipline,
    AttendanceLeave,
    FeeAccounts,
    Transport,
    HealthSafety,
    CleanlinessInfra,
    Documents,
    Other,
}

impl TicketCategory {
    pub const ALL: &'static [TicketCategory] = &[
        TicketCategory::AcademicTeaching,
        TicketCategory::AcademicExamPolicy,
        TicketCategory::Discipline,
        TicketCategory::AttendanceLeave,
        TicketCategory::FeeAccounts,
        TicketCategory::Transport,
        TicketCategory::HealthSafety,
        TicketCategory::CleanlinessInfra,
        TicketCategory::Documents,
        TicketCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketCategory::AcademicTeaching => "academic_teaching",
            TicketCategory::AcademicExamPolicy => "academic_exam_policy",
            TicketCategory::Discipline => "discipline",
            TicketCategory::AttendanceLeave => "attendance_leave",
            TicketCategory::FeeAccounts => "fee_accounts",
            TicketCategory::Transport => "transport",
            TicketCategory::HealthSafety => "health_safety",
            TicketCategory::CleanlinessInfra => "cleanliness_infra",
            TicketCategory::Documents => "documents",
            TicketCategory::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Result<TicketCategory, CoreError> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown ticket category '{s}'")))
    }
}

impl std::fmt::Display for TicketCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Lifecycle guards
// ---------------------------------------------------------------------------

/// Lifetime cap on reopen requests per ticket, regardless of how many times
/// the ticket cycled back to Resolved in between.
pub const MAX_REOPENS_PER_TICKET: i64 = 2;

/// Informational footer attached to the projection of Transport tickets.
pub const TRANSPORT_FOOTER: &str = "No action required from parents.";

/// Generic denial for a reopen request. Wrong-state and cap-reached are
/// deliberately indistinguishable to the caller.
pub const REOPEN_DENIED: &str = "Ticket cannot be reopened. It may not be resolved, \
     or you have reached the maximum reopen requests for this ticket.";

/// Whether a staff reply should auto-advance the ticket.
///
/// The only implicit transition in the system: a non-parent reply on a
/// Pending ticket moves it to InProgress.
pub fn reply_advances_status(sender_role: Role, status: TicketStatus) -> bool {
    sender_role.is_staff() && status == TicketStatus::Pending
}

/// Whether a reopen request is admissible given current state and history.
pub fn can_reopen(status: TicketStatus, prior_reopens: i64) -> bool {
    status == TicketStatus::Resolved && prior_reopens < MAX_REOPENS_PER_TICKET
}

/// Whether the creating parent may confirm satisfaction right now.
pub fn can_mark_satisfied(status: TicketStatus) -> bool {
    status == TicketStatus::Resolved
}

/// Whether an actor may toggle the known-issue flag on a ticket.
///
/// Transport-role actors only, and only on Transport-category tickets.
pub fn can_set_known_issue(actor_role: Role, category: TicketCategory) -> bool {
    actor_role.can_toggle_known_issue() && category == TicketCategory::Transport
}

/// The footer shown in a ticket projection, if the category carries one.
pub fn category_footer(category: TicketCategory) -> Option<&'static str> {
    match category {
        TicketCategory::Transport => Some(TRANSPORT_FOOTER),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips() {
        for s in ["pending", "in_progress", "resolved"] {
            assert_eq!(TicketStatus::parse(s).unwrap().as_str(), s);
        }
        assert!(TicketStatus::parse("closed").is_err());
    }

    #[test]
    fn update_target_accepts_only_the_two_literals() {
        assert_eq!(
            TicketStatus::parse_update_target("in_progress").unwrap(),
            TicketStatus::InProgress
        );
        assert_eq!(
            TicketStatus::parse_update_target("resolved").unwrap(),
            TicketStatus::Resolved
        );
        // `pending` is a real status but never a valid update target.
        assert!(TicketStatus::parse_update_target("pending").is_err());
        assert!(TicketStatus::parse_update_target("done").is_err());
        assert!(TicketStatus::parse_update_target("").is_err());
    }

    #[test]
    fn category_round_trips_all_ten() {
        assert_eq!(TicketCategory::ALL.len(), 10);
        for c in TicketCategory::ALL {
            assert_eq!(TicketCategory::parse(c.as_str()).unwrap(), *c);
        }
        assert!(TicketCategory::parse("misc").is_err());
    }

    #[test]
    fn staff_reply_on_pending_advances() {
        assert!(reply_advances_status(Role::Teacher, TicketStatus::Pending));
        assert!(reply_advances_status(Role::Office, TicketStatus::Pending));
    }

    #[test]
    fn parent_reply_never_advances() {
        assert!(!reply_advances_status(Role::Parent, TicketStatus::Pending));
        assert!(!reply_advances_status(Role::Parent, TicketStatus::InProgress));
    }

    #[test]
    fn staff_reply_on_non_pending_does_not_advance() {
        assert!(!reply_advances_status(Role::Teacher, TicketStatus::InProgress));
        assert!(!reply_advances_status(Role::Teacher, TicketStatus::Resolved));
    }

    #[test]
    fn reopen_requires_resolved_and_headroom() {
        assert!(can_reopen(TicketStatus::Resolved, 0));
        assert!(can_reopen(TicketStatus::Resolved, 1));
        assert!(!can_reopen(TicketStatus::Resolved, 2));
        assert!(!can_reopen(TicketStatus::Pending, 0));
        assert!(!can_reopen(TicketStatus::InProgress, 0));
    }

    #[test]
    fn satisfaction_only_on_resolved() {
        assert!(can_mark_satisfied(TicketStatus::Resolved));
        assert!(!can_mark_satisfied(TicketStatus::Pending));
        assert!(!can_mark_satisfied(TicketStatus::InProgress));
    }

    #[test]
    fn known_issue_needs_transport_role_and_category() {
        assert!(can_set_known_issue(Role::Transport, TicketCategory::Transport));
        assert!(!can_set_known_issue(Role::Transport, TicketCategory::Other));
        assert!(!can_set_known_issue(Role::Teacher, TicketCategory::Transport));
        assert!(!can_set_known_issue(Role::Parent, TicketCategory::Transport));
    }

    #[test]
    fn only_transport_carries_a_footer() {
        for c in TicketCategory::ALL {
            match c {
                TicketCategory::Transport => {
                    assert_eq!(category_footer(*c), Some(TRANSPORT_FOOTER));
                }
                _ => assert_eq!(category_footer(*c), None),
            }
        }
    }
}
