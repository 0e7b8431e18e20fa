//! User entity model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use syncdesk_core::roles::Role;
use syncdesk_core::types::{DbId, Timestamp};

/// Full user row from the `users` table.
///
/// `role` is stored as TEXT; parse it with [`User::role`] at the boundary
/// rather than comparing the raw string.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub phone: String,
    pub role: String,
    pub school_id: DbId,
    pub name: Option<String>,
    pub email: Option<String>,
    pub restricted_to_admin_until: Option<Timestamp>,
    pub ticket_creation_blocked_until: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl User {
    /// The user's role as the closed domain enum.
    pub fn role(&self) -> Result<Role, syncdesk_core::error::CoreError> {
        Role::parse(&self.role)
    }
}

/// Safe user representation for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub phone: String,
    pub role: String,
    pub school_id: DbId,
}

impl From<&User> for UserResponse {
    fn from(u: &User) -> Self {
        UserResponse {
            id: u.id,
            phone: u.phone.clone(),
            role: u.role.clone(),
            school_id: u.school_id,
        }
    }
}

/// DTO for creating a new user.
#[derive(Debug)]
pub struct CreateUser {
    pub phone: String,
    pub role: Role,
    pub school_id: DbId,
    pub name: Option<String>,
    pub email: Option<String>,
}
