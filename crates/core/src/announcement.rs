//! Announcement audience targeting.
//!
//! Announcements are one-way broadcasts scoped to a school, targeted at
//! parents, staff, or both. No replies, no edits; read marks are tracked
//! separately and are idempotent.

use crate::error::CoreError;
use crate::roles::Role;

/// Who an announcement is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    Parents,
    Staff,
    Both,
}

impl Audience {
    pub fn as_str(&self) -> &'static str {
        match self {
            Audience::Parents => "parents",
            Audience::Staff => "staff",
            Audience::Both => "both",
        }
    }

    pub fn parse(s: &str) -> Result<Audience, CoreError> {
        match s {
            "parents" => Ok(Audience::Parents),
            "staff" => Ok(Audience::Staff),
            "both" => Ok(Audience::Both),
            other => Err(CoreError::Validation(format!(
                "Unknown target audience '{other}'. Must be one of: parents, staff, both"
            ))),
        }
    }

    /// Whether a viewer with the given role is part of this audience.
    pub fn visible_to(&self, role: Role) -> bool {
        match self {
            Audience::Both => true,
            Audience::Parents => role == Role::Parent,
            Audience::Staff => role.is_staff(),
        }
    }
}

impl std::fmt::Display for Audience {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
