//! The closed role set and its capability table.
//!
//! Roles are stored as TEXT in the database and in JWT claims; this enum is
//! the single place they are parsed and the single place policy questions
//! about a role are answered. Handlers ask capability questions
//! (`can_set_ticket_status`, `can_publish_announcements`, ...) instead of
//! comparing role values inline.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Every role a user can hold. A user has exactly one role and one school.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Director,
    Principal,
    VicePrincipal,
    Teacher,
    Office,
    Transport,
    Parent,
}

impl Role {
    /// All roles, in seniority order.
    pub const ALL: &'static [Role] = &[
        Role::Director,
        Role::Principal,
        Role::VicePrincipal,
        Role::Teacher,
        Role::Office,
        Role::Transport,
        Role::Parent,
    ];

    /// The wire/storage name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Director => "director",
            Role::Principal => "principal",
            Role::VicePrincipal => "vice_principal",
            Role::Teacher => "teacher",
            Role::Office => "office",
            Role::Transport => "transport",
            Role::Parent => "parent",
        }
    }

    /// Parse a stored role name. Unknown names are a validation failure.
    pub fn parse(s: &str) -> Result<Role, CoreError> {
        match s {
            "director" => Ok(Role::Director),
            "principal" => Ok(Role::Principal),
            "vice_principal" => Ok(Role::VicePrincipal),
            "teacher" => Ok(Role::Teacher),
            "office" => Ok(Role::Office),
            "transport" => Ok(Role::Transport),
            "parent" => Ok(Role::Parent),
            other => Err(CoreError::Validation(format!("Unknown role '{other}'"))),
        }
    }

    // -----------------------------------------------------------------
    // Capability table
    // -----------------------------------------------------------------

    /// Any role other than Parent counts as school staff.
    pub fn is_staff(&self) -> bool {
        !matches!(self, Role::Parent)
    }

    /// Only parents file tickets in this flow.
    pub fn can_create_tickets(&self) -> bool {
        matches!(self, Role::Parent)
    }

    /// Explicit status updates are staff-only.
    pub fn can_set_ticket_status(&self) -> bool {
        self.is_staff()
    }

    /// Internal notes are authored by staff and never shown to parents.
    pub fn can_post_internal_notes(&self) -> bool {
        self.is_staff()
    }

    /// Any staff member may flag a ticket for the director.
    pub fn can_flag_abuse(&self) -> bool {
        self.is_staff()
    }

    /// The known-issue flag is owned by the transport desk.
    pub fn can_toggle_known_issue(&self) -> bool {
        matches!(self, Role::Transport)
    }

    /// Announcements are published by school leadership.
    pub fn can_publish_announcements(&self) -> bool {
        matches!(self, Role::Director | Role::Principal | Role::VicePrincipal)
    }

    /// Restricting or blocking a parent is a director decision.
    pub fn can_moderate_parents(&self) -> bool {
        matches!(self, Role::Director)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
