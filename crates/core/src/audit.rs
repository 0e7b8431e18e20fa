//! Audit log action and resource name constants.
//!
//! Kept in `core` (zero internal deps) so both the API layer and any future
//! CLI tooling name actions consistently.

/// Known action names for audit log entries.
pub mod actions {
    pub const LOGIN: &str = "login";
    pub const TICKET_ABUSE_FLAGGED: &str = "ticket_abuse_flagged";
    pub const PARENT_RESTRICTED: &str = "parent_restricted";
    pub const PARENT_BLOCKED: &str = "parent_blocked";
}

/// Known resource type names.
pub mod resources {
    pub const TICKET: &str = "ticket";
    pub const USER: &str = "user";
}
